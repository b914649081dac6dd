//! OpenWeatherMap HTTP plumbing shared by the geocoder and the weather provider.

use std::sync::Arc;

use meteo_core::{NetworkError, ReqwestErrorExt, WeatherConfig};
use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::types::WeatherError;

const USER_AGENT: &str = concat!("meteo/", env!("CARGO_PKG_VERSION"));

#[derive(Clone)]
pub struct ApiClient {
    client: Arc<Client>,
    base_url: String,
    api_key: String,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl ApiClient {
    /// No request timeout is set; the transport default applies.
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(ReqwestErrorExt::into_network_error)?;

        Ok(Self {
            client: Arc::new(client),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// Build from configuration. Fails when no API key is configured.
    pub fn from_config(config: &WeatherConfig) -> Result<Self, WeatherError> {
        let api_key = config.api_key()?;
        Self::new(&config.base_url, api_key)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `{base}{path}?{params}&appid={key}` and decode the JSON body.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, WeatherError> {
        let url = format!("{}{}", self.base_url, path);

        let mut query: Vec<(&str, &str)> = params.iter().map(|(k, v)| (*k, v.as_str())).collect();
        query.push(("appid", self.api_key.as_str()));

        let response = self
            .client
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(ReqwestErrorExt::into_network_error)?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::debug!("{} returned status {}", path, status);
            return Err(NetworkError::ServerError {
                status: status.as_u16(),
                message,
            }
            .into());
        }

        let body = response
            .bytes()
            .await
            .map_err(ReqwestErrorExt::into_network_error)?;

        serde_json::from_slice(&body).map_err(|e| WeatherError::Parse(format!("{}: {}", path, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let client = ApiClient::new("http://localhost:1234/", "key").unwrap();
        assert_eq!(client.base_url(), "http://localhost:1234");
    }

    #[test]
    fn test_debug_hides_key() {
        let client = ApiClient::new("http://localhost", "secret-key").unwrap();
        let rendered = format!("{:?}", client);
        assert!(!rendered.contains("secret-key"));
    }

    #[test]
    fn test_from_config_requires_key() {
        let config = WeatherConfig::default();
        assert!(matches!(
            ApiClient::from_config(&config),
            Err(WeatherError::Config(_))
        ));
    }
}
