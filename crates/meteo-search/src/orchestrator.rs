//! Drives one search from submitted text to published weather.
//!
//! The orchestrator owns the [`SearchSession`] and is the only thing that
//! mutates it. Network work lives in [`SearchJob`], which holds no borrow of
//! the orchestrator, so it can run inline (`search`) or on a spawned task
//! (see [`crate::service`]). Results come back tagged with their
//! [`RequestId`]; anything but the latest id is dropped.

use std::sync::Arc;

use meteo_core::MessagesConfig;
use meteo_weather::{is_searchable, Coordinates, Geocoder, LocationCandidate, WeatherReport, WeatherSource};

use crate::error::SearchError;
use crate::session::{RequestId, SearchSession};
use crate::state::SearchState;

/// Outcome of a finished job, ready to hand back to the orchestrator.
#[derive(Debug, Clone)]
pub struct SearchCompletion {
    pub id: RequestId,
    pub query: String,
    pub result: Result<WeatherReport, SearchError>,
}

/// The network half of one validated search.
pub struct SearchJob<G, W> {
    id: RequestId,
    query: String,
    geocoder: Arc<G>,
    weather: Arc<W>,
}

impl<G: Geocoder, W: WeatherSource> SearchJob<G, W> {
    pub fn id(&self) -> RequestId {
        self.id
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Geocode the query. No candidate is `NotFound`.
    pub async fn resolve(&self) -> Result<LocationCandidate, SearchError> {
        self.geocoder
            .resolve(&self.query)
            .await
            .ok_or(SearchError::NotFound)
    }

    /// Fetch weather for resolved coordinates. Every failure is `General`.
    pub async fn fetch(&self, coordinates: Coordinates) -> Result<WeatherReport, SearchError> {
        self.weather
            .fetch_current_and_forecast(coordinates)
            .await
            .map_err(|e| {
                tracing::warn!("Weather fetch for {:?} failed: {}", self.query, e);
                SearchError::General(e.to_string())
            })
    }

    pub fn finish(self, result: Result<WeatherReport, SearchError>) -> SearchCompletion {
        SearchCompletion {
            id: self.id,
            query: self.query,
            result,
        }
    }

    /// Resolve then fetch, without reporting the intermediate step.
    pub async fn run(self) -> SearchCompletion {
        let result = match self.resolve().await {
            Ok(candidate) => self.fetch(candidate.coordinates()).await,
            Err(e) => Err(e),
        };
        self.finish(result)
    }
}

pub struct SearchOrchestrator<G, W> {
    geocoder: Arc<G>,
    weather: Arc<W>,
    messages: MessagesConfig,
    session: SearchSession,
}

impl<G: Geocoder, W: WeatherSource> SearchOrchestrator<G, W> {
    pub fn new(geocoder: Arc<G>, weather: Arc<W>, messages: MessagesConfig) -> Self {
        Self {
            geocoder,
            weather,
            messages,
            session: SearchSession::default(),
        }
    }

    pub fn session(&self) -> &SearchSession {
        &self.session
    }

    pub fn messages(&self) -> &MessagesConfig {
        &self.messages
    }

    pub fn geocoder(&self) -> Arc<G> {
        Arc::clone(&self.geocoder)
    }

    /// Record what the user is typing. An empty field shows the empty-query
    /// message right away; anything else clears the message.
    pub fn set_input(&mut self, text: &str) {
        self.session.input = text.to_string();
        self.session.error_message = if text.is_empty() {
            Some(self.messages.empty.clone())
        } else {
            None
        };
    }

    /// Submit `query`: validate it, stamp a new request id and move to
    /// `Geocoding`.
    ///
    /// Every submission supersedes whatever search was in flight, including
    /// one that fails validation.
    ///
    /// # Errors
    /// `EmptyQuery` or `TooShort`; the session is already `Failed` with the
    /// matching message and no network call is made.
    pub fn begin(&mut self, query: &str) -> Result<SearchJob<G, W>, SearchError> {
        let id = self.session.latest_request.next();
        self.session.latest_request = id;
        self.session.state = SearchState::Validating;

        let query = query.trim();
        if let Err(e) = Self::validate(query) {
            tracing::debug!("Search {} rejected: {}", id, e);
            self.fail(e.clone());
            return Err(e);
        }

        self.session.suggestions.clear();
        self.session.error_message = None;
        self.session.state = self.session.state.on_validated();
        tracing::info!("Search {} started for {:?}", id, query);

        Ok(SearchJob {
            id,
            query: query.to_string(),
            geocoder: Arc::clone(&self.geocoder),
            weather: Arc::clone(&self.weather),
        })
    }

    fn validate(query: &str) -> Result<(), SearchError> {
        if query.is_empty() {
            Err(SearchError::EmptyQuery)
        } else if !is_searchable(query) {
            Err(SearchError::TooShort)
        } else {
            Ok(())
        }
    }

    /// Search for a picked suggestion. The candidate is geocoded again by
    /// name, like a typed query.
    pub fn select_suggestion(
        &mut self,
        candidate: &LocationCandidate,
    ) -> Result<SearchJob<G, W>, SearchError> {
        self.begin(&candidate.name)
    }

    /// Search for a saved favorite.
    pub fn search_favorite(&mut self, city: &str) -> Result<SearchJob<G, W>, SearchError> {
        self.begin(city)
    }

    /// The geocoder resolved a location for `id`.
    pub fn advance(&mut self, id: RequestId) {
        if id == self.session.latest_request {
            self.session.state = self.session.state.on_geocoded();
        }
    }

    /// Apply a finished job. Returns false if it was superseded and dropped.
    pub fn complete(&mut self, completion: SearchCompletion) -> bool {
        if completion.id != self.session.latest_request {
            tracing::debug!(
                "Discarding stale result {} for {:?} (latest is {})",
                completion.id,
                completion.query,
                self.session.latest_request
            );
            return false;
        }

        match completion.result {
            Ok(report) => {
                tracing::info!(
                    "Search {} succeeded: {} at {}",
                    completion.id,
                    report.current.city,
                    report.coordinates
                );
                self.session.current = Some(report.current);
                self.session.forecast = report.forecast;
                self.session.coordinates = Some(report.coordinates);
                self.session.input.clear();
                self.session.suggestions.clear();
                self.session.error_message = None;
                self.session.state = SearchState::Success;
            }
            Err(e) => {
                tracing::info!("Search {} for {:?} failed: {}", completion.id, completion.query, e);
                self.session.suggestions.clear();
                self.fail(e);
            }
        }
        true
    }

    // Leaves weather, forecast and input untouched.
    fn fail(&mut self, error: SearchError) {
        self.session.error_message = Some(error.message(&self.messages).to_string());
        self.session.state = SearchState::Failed(error);
    }

    /// Run a whole search inline.
    pub async fn search(&mut self, query: &str) -> &SearchSession {
        let job = match self.begin(query) {
            Ok(job) => job,
            Err(_) => return &self.session,
        };

        let result = match job.resolve().await {
            Ok(candidate) => {
                self.advance(job.id());
                job.fetch(candidate.coordinates()).await
            }
            Err(e) => Err(e),
        };

        self.complete(job.finish(result));
        &self.session
    }

    /// Show suggestions computed for `text`. Dropped while a search is in
    /// flight or when the user has typed on since.
    pub fn apply_suggestions(&mut self, text: &str, suggestions: Vec<LocationCandidate>) -> bool {
        if self.session.state.is_in_flight() || self.session.input != text {
            return false;
        }
        self.session.suggestions = suggestions;
        true
    }

    /// Dismiss a settled result and return to `Idle`. The last weather stays
    /// on display.
    pub fn reset(&mut self) {
        let next = self.session.state.on_reset();
        if next == SearchState::Idle {
            self.session.error_message = None;
            self.session.suggestions.clear();
        }
        self.session.state = next;
    }
}
