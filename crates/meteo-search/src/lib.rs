//! Search orchestration for Meteo
//!
//! Owns the explicit [`SearchSession`] and moves it through the search state
//! machine, debounces suggestion lookups, and runs searches in the background.

pub mod debounce;
pub mod error;
pub mod orchestrator;
pub mod service;
pub mod session;
pub mod state;

#[cfg(test)]
mod testing;

pub use debounce::{Debouncer, SuggestionUpdate, DEFAULT_QUIET_PERIOD};
pub use error::SearchError;
pub use orchestrator::{SearchCompletion, SearchJob, SearchOrchestrator};
pub use service::{request_search, SearchServiceMessage};
pub use session::{RequestId, SearchSession};
pub use state::SearchState;
