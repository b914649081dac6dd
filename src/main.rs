use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use meteo_core::{App, AppError, Config, ConfigError};
use meteo_favorites::{AddOutcome, FavoritesError, FavoritesStore, FileStore};
use meteo_search::{SearchOrchestrator, SearchState};
use meteo_weather::{ApiClient, Geocoder, OpenWeatherGeocoder, WeatherProvider};

mod interactive;
mod render;

#[derive(Parser)]
#[command(name = "meteo", version, about = "City weather lookup with favorites")]
struct Cli {
    /// Log filter, overrides the configured level (RUST_LOG wins over both)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Show current weather and forecast for a city
    Search {
        /// City name, e.g. "Rome" or "New York"
        city: Vec<String>,
    },
    /// List up to five matching places
    Suggest { text: Vec<String> },
    /// Manage favorite cities
    Favorites {
        #[command(subcommand)]
        action: FavoritesCommand,
    },
    /// Line-based session with live suggestions (the default)
    Interactive,
}

#[derive(Subcommand)]
enum FavoritesCommand {
    List,
    Add { city: Vec<String> },
    Remove { city: Vec<String> },
}

type Clients = (Arc<OpenWeatherGeocoder>, Arc<WeatherProvider>);

fn build_clients(config: &Config) -> Result<Clients> {
    let api = ApiClient::from_config(&config.weather)
        .map_err(AppError::from)
        .context("Failed to create weather client")?;
    let geocoder =
        OpenWeatherGeocoder::new(api.clone()).with_suggestion_limit(config.weather.suggestion_limit);
    let provider = WeatherProvider::new(api).with_language(config.weather.language.clone());
    Ok((Arc::new(geocoder), Arc::new(provider)))
}

fn favorites_error(e: FavoritesError) -> anyhow::Error {
    match e {
        FavoritesError::Storage(e) => AppError::from(e).into(),
        other => anyhow::anyhow!(other.user_message()),
    }
}

fn open_favorites(app: &App) -> Result<FavoritesStore<FileStore>> {
    let store = FileStore::open(app.data_dir()).map_err(AppError::from)?;
    FavoritesStore::load(store).map_err(favorites_error)
}

/// True when startup failed only because no API key is configured
fn needs_api_key(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<AppError>(),
        Some(AppError::Config(ConfigError::MissingSetting(field))) if field == "weather.api_key"
    )
}

/// Text shown for a failed command
fn describe(err: anyhow::Error) -> String {
    match err.downcast::<AppError>() {
        Ok(app_error) => app_error.user_message().to_string(),
        Err(other) => {
            let app_error = AppError::Other(other);
            format!("{} ({})", app_error.user_message(), app_error)
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut app = match App::new() {
        Ok(app) => app,
        Err(e) => {
            eprintln!("meteo: {:#}", e);
            if needs_api_key(&e) {
                eprintln!(
                    "Set {} or add weather.api_key to the config file.",
                    meteo_core::config::API_KEY_ENV
                );
            }
            return ExitCode::FAILURE;
        }
    };

    let level = cli
        .log_level
        .unwrap_or_else(|| app.config().logging.level.clone());
    if let Err(e) = meteo_core::init(&level) {
        eprintln!("meteo: {:#}", e);
    }
    for warning in &app.warnings().warnings {
        tracing::warn!("Config warning: {}", warning);
    }

    let code = match run(&mut app, cli.command.unwrap_or(Command::Interactive)).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{:#}", e);
            eprintln!("meteo: {}", describe(e));
            ExitCode::FAILURE
        }
    };

    if let Err(e) = app.shutdown() {
        tracing::warn!("Shutdown failed: {}", e);
    }
    code
}

async fn run(app: &mut App, command: Command) -> Result<ExitCode> {
    app.initialize()?;
    let config = app.shared_config();

    match command {
        Command::Search { city } => {
            let (geocoder, provider) = build_clients(&config)?;
            let mut orch = SearchOrchestrator::new(geocoder, provider, config.messages.clone());

            let session = orch.search(&city.join(" ")).await;
            match &session.state {
                SearchState::Success => {
                    let is_favorite = match (&session.current, open_favorites(app)) {
                        (Some(current), Ok(favorites)) => favorites.contains(&current.city),
                        (_, Err(e)) => {
                            tracing::warn!("Favorites unavailable: {:#}", e);
                            false
                        }
                        (None, Ok(_)) => false,
                    };
                    print!("{}", render::session(session, is_favorite));
                    Ok(ExitCode::SUCCESS)
                }
                _ => {
                    if let Some(message) = &session.error_message {
                        eprintln!("{}", message);
                    }
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Command::Suggest { text } => {
            let (geocoder, _) = build_clients(&config)?;
            let suggestions = geocoder.suggest(&text.join(" ")).await;
            print!("{}", render::suggestions(&suggestions));
            Ok(ExitCode::SUCCESS)
        }
        Command::Favorites { action } => {
            let mut favorites = open_favorites(app)?;
            match action {
                FavoritesCommand::List => print!("{}", render::favorites(favorites.list())),
                FavoritesCommand::Add { city } => {
                    let city = city.join(" ");
                    match favorites.add(&city).map_err(favorites_error)? {
                        AddOutcome::Added => println!("Added {}", city.trim()),
                        AddOutcome::AlreadyFavorite => {
                            println!("{}", config.messages.already_favorite_for(city.trim()))
                        }
                    }
                }
                FavoritesCommand::Remove { city } => {
                    favorites.remove(&city.join(" ")).map_err(favorites_error)?;
                }
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Interactive => {
            let (geocoder, provider) = build_clients(&config)?;
            let favorites = open_favorites(app)?;
            interactive::run(&config, geocoder, provider, favorites).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
