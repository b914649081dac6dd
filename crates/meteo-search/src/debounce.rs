//! Rate limiting for suggestion lookups while the user types.
//!
//! A restartable timer: every keystroke aborts the pending lookup and
//! schedules a fresh one after the quiet period. Only the trailing input of a
//! burst reaches the geocoder.

use std::sync::Arc;
use std::time::Duration;

use meteo_weather::{is_searchable, Geocoder, LocationCandidate};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Default quiet period before a lookup fires
pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(500);

/// Suggestions computed for a specific input text.
#[derive(Debug, Clone, PartialEq)]
pub struct SuggestionUpdate {
    pub text: String,
    pub suggestions: Vec<LocationCandidate>,
}

pub struct Debouncer<G> {
    geocoder: Arc<G>,
    quiet: Duration,
    tx: mpsc::UnboundedSender<SuggestionUpdate>,
    pending: Option<JoinHandle<()>>,
}

impl<G: Geocoder + 'static> Debouncer<G> {
    /// Must be created inside a tokio runtime.
    pub fn new(geocoder: Arc<G>, quiet: Duration, tx: mpsc::UnboundedSender<SuggestionUpdate>) -> Self {
        Self {
            geocoder,
            quiet,
            tx,
            pending: None,
        }
    }

    pub fn quiet_period(&self) -> Duration {
        self.quiet
    }

    /// Restart the timer for `text`.
    ///
    /// When the timer fires, text shorter than two characters yields an empty
    /// list without calling the geocoder.
    pub fn input(&mut self, text: &str) {
        self.cancel();

        let text = text.to_string();
        let geocoder = Arc::clone(&self.geocoder);
        let tx = self.tx.clone();
        let quiet = self.quiet;

        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(quiet).await;

            let suggestions = if is_searchable(&text) {
                geocoder.suggest(&text).await
            } else {
                Vec::new()
            };
            tracing::debug!("{} suggestions for {:?}", suggestions.len(), text);

            // Receiver gone means the front-end shut down
            let _ = tx.send(SuggestionUpdate { text, suggestions });
        }));
    }

    /// Drop the pending lookup, if any.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl<G> Drop for Debouncer<G> {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeGeocoder;
    use tokio::time::Instant;

    fn debouncer() -> (
        Debouncer<FakeGeocoder>,
        Arc<FakeGeocoder>,
        mpsc::UnboundedReceiver<SuggestionUpdate>,
    ) {
        let geocoder = Arc::new(FakeGeocoder::with_rome());
        let (tx, rx) = mpsc::unbounded_channel();
        (Debouncer::new(geocoder.clone(), DEFAULT_QUIET_PERIOD, tx), geocoder, rx)
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_issues_one_lookup() {
        let (mut debouncer, geocoder, mut rx) = debouncer();

        for text in ["R", "Ro", "Rom", "Rome"] {
            debouncer.input(text);
            tokio::time::sleep(Duration::from_millis(100)).await;
        }

        let update = rx.recv().await.unwrap();
        assert_eq!(update.text, "Rome");
        assert_eq!(update.suggestions.len(), 1);
        assert_eq!(update.suggestions[0].label(), "Rome, IT");
        assert_eq!(geocoder.suggest_calls(), 1);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_for_quiet_period() {
        let (mut debouncer, _, mut rx) = debouncer();
        let start = Instant::now();

        debouncer.input("Rome");
        assert!(debouncer.is_pending());
        rx.recv().await.unwrap();

        assert!(start.elapsed() >= DEFAULT_QUIET_PERIOD);
    }

    #[tokio::test(start_paused = true)]
    async fn test_short_text_skips_lookup() {
        let (mut debouncer, geocoder, mut rx) = debouncer();

        debouncer.input("R");
        let update = rx.recv().await.unwrap();
        assert_eq!(update.text, "R");
        assert!(update.suggestions.is_empty());

        debouncer.input("");
        assert!(rx.recv().await.unwrap().suggestions.is_empty());
        assert_eq!(geocoder.suggest_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_and_drop_suppress_lookup() {
        let (mut debouncer, geocoder, mut rx) = debouncer();

        debouncer.input("Rome");
        debouncer.cancel();
        assert!(!debouncer.is_pending());
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(rx.try_recv().is_err());

        debouncer.input("Rome");
        drop(debouncer);
        assert!(rx.recv().await.is_none());
        assert_eq!(geocoder.suggest_calls(), 0);
    }
}
