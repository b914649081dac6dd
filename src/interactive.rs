//! Line-based front-end: typing feeds the debouncer, submitting runs a search
//! on a background task, and results are applied as they arrive.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use meteo_core::Config;
use meteo_favorites::{AddOutcome, FavoritesStore, FileStore};
use meteo_search::{
    request_search, Debouncer, SearchError, SearchJob, SearchOrchestrator, SearchServiceMessage,
};
use meteo_weather::{OpenWeatherGeocoder, WeatherProvider};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

const HELP: &str = "\
Commands:
  ?<text>     type text and show suggestions after a pause
  <city>      search for a city
  :<n>        search the n-th suggestion
  :fav        add the displayed city to favorites
  :rm <city>  remove a favorite
  :list       list favorites
  :go <n>     search the n-th favorite
  :reset      dismiss the last result
  :help       show this help
  :q          quit";

/// One parsed input line
#[derive(Debug, PartialEq, Eq)]
enum Line {
    Empty,
    Type(String),
    Search(String),
    Select(usize),
    AddFavorite,
    RemoveFavorite(String),
    ListFavorites,
    GoFavorite(usize),
    Reset,
    Help,
    Quit,
    Unknown(String),
}

impl Line {
    fn parse(raw: &str) -> Self {
        let line = raw.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            return Self::Empty;
        }
        if let Some(text) = line.strip_prefix('?') {
            return Self::Type(text.to_string());
        }
        let Some(command) = line.trim().strip_prefix(':') else {
            return Self::Search(line.trim().to_string());
        };

        let (name, arg) = match command.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (command, ""),
        };
        match name {
            "q" | "quit" => Self::Quit,
            "help" => Self::Help,
            "fav" => Self::AddFavorite,
            "rm" if !arg.is_empty() => Self::RemoveFavorite(arg.to_string()),
            "list" => Self::ListFavorites,
            "reset" => Self::Reset,
            "go" => match arg.parse() {
                Ok(n) if n > 0 => Self::GoFavorite(n),
                _ => Self::Unknown(line.to_string()),
            },
            _ => match name.parse() {
                Ok(n) if n > 0 => Self::Select(n),
                _ => Self::Unknown(line.to_string()),
            },
        }
    }
}

type Orchestrator = SearchOrchestrator<OpenWeatherGeocoder, WeatherProvider>;

pub async fn run(
    config: &Config,
    geocoder: Arc<OpenWeatherGeocoder>,
    provider: Arc<WeatherProvider>,
    mut favorites: FavoritesStore<FileStore>,
) -> Result<()> {
    let mut orch = SearchOrchestrator::new(geocoder, provider, config.messages.clone());
    let (suggestion_tx, mut suggestion_rx) = mpsc::unbounded_channel();
    let (search_tx, mut search_rx) = mpsc::unbounded_channel();
    let mut debouncer = Debouncer::new(
        orch.geocoder(),
        Duration::from_millis(config.weather.debounce_ms),
        suggestion_tx,
    );
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("{}", HELP);
    tracing::info!("Interactive session started");

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match Line::parse(&line) {
                    Line::Empty => {}
                    Line::Quit => break,
                    Line::Help => println!("{}", HELP),
                    Line::Type(text) => {
                        orch.set_input(&text);
                        if let Some(message) = &orch.session().error_message {
                            println!("{}", message);
                        }
                        debouncer.input(&text);
                    }
                    Line::Search(query) => {
                        debouncer.cancel();
                        orch.set_input(&query);
                        let job = orch.begin(&query);
                        start(&orch, &search_tx, job);
                    }
                    Line::Select(n) => match orch.session().suggestions.get(n - 1).cloned() {
                        Some(candidate) => {
                            debouncer.cancel();
                            let job = orch.select_suggestion(&candidate);
                            start(&orch, &search_tx, job);
                        }
                        None => println!("No suggestion {}", n),
                    },
                    Line::GoFavorite(n) => match favorites.list().get(n - 1).cloned() {
                        Some(city) => {
                            let job = orch.search_favorite(&city);
                            start(&orch, &search_tx, job);
                        }
                        None => println!("No favorite {}", n),
                    },
                    Line::AddFavorite => add_favorite(&orch, &mut favorites),
                    Line::RemoveFavorite(city) => match favorites.remove(&city) {
                        Ok(()) => print!("{}", crate::render::favorites(favorites.list())),
                        Err(e) => println!("{}", e.user_message()),
                    },
                    Line::ListFavorites => print!("{}", crate::render::favorites(favorites.list())),
                    Line::Reset => orch.reset(),
                    Line::Unknown(text) => println!("Unknown command {:?}, try :help", text),
                }
            }
            Some(update) = suggestion_rx.recv() => {
                if orch.apply_suggestions(&update.text, update.suggestions)
                    && !orch.session().suggestions.is_empty()
                {
                    print!("{}", crate::render::suggestions(&orch.session().suggestions));
                }
            }
            Some(message) = search_rx.recv() => {
                if orch.handle_message(message) {
                    match &orch.session().error_message {
                        Some(error) => println!("{}", error),
                        None => {
                            let is_favorite = orch
                                .session()
                                .current
                                .as_ref()
                                .is_some_and(|c| favorites.contains(&c.city));
                            print!("{}", crate::render::session(orch.session(), is_favorite));
                        }
                    }
                }
            }
        }
    }

    debouncer.cancel();
    tracing::info!("Interactive session ended");
    Ok(())
}

fn start(
    orch: &Orchestrator,
    tx: &mpsc::UnboundedSender<SearchServiceMessage>,
    job: Result<SearchJob<OpenWeatherGeocoder, WeatherProvider>, SearchError>,
) {
    match job {
        Ok(job) => {
            println!("Searching {}...", job.query());
            request_search(tx, job);
        }
        Err(e) => println!("{}", e.message(orch.messages())),
    }
}

fn add_favorite(orch: &Orchestrator, favorites: &mut FavoritesStore<FileStore>) {
    let Some(current) = &orch.session().current else {
        println!("Search for a city first");
        return;
    };

    match favorites.add(&current.city) {
        Ok(AddOutcome::Added) => println!("Added {} to favorites", current.city),
        Ok(AddOutcome::AlreadyFavorite) => {
            println!("{}", orch.messages().already_favorite_for(&current.city))
        }
        Err(e) => println!("{}", e.user_message()),
    }
}
