//! Background search execution.
//! Network work runs on a spawned task; progress comes back over mpsc.

use meteo_weather::{Geocoder, WeatherSource};
use tokio::sync::mpsc;

use crate::orchestrator::{SearchCompletion, SearchJob, SearchOrchestrator};
use crate::session::RequestId;

/// Messages sent from a running search back to the task that owns the
/// orchestrator
#[derive(Debug)]
pub enum SearchServiceMessage {
    /// The geocoder resolved a location; weather is being fetched
    Geocoded(RequestId),
    /// The search finished, successfully or not
    Done(SearchCompletion),
}

/// Run `job` on a new task. Sends `Geocoded` (if a location was found) and
/// then `Done` on the channel.
pub fn request_search<G, W>(tx: &mpsc::UnboundedSender<SearchServiceMessage>, job: SearchJob<G, W>)
where
    G: Geocoder + 'static,
    W: WeatherSource + 'static,
{
    let tx = tx.clone();

    tokio::spawn(async move {
        let id = job.id();
        let result = match job.resolve().await {
            Ok(candidate) => {
                let _ = tx.send(SearchServiceMessage::Geocoded(id));
                job.fetch(candidate.coordinates()).await
            }
            Err(e) => Err(e),
        };
        let _ = tx.send(SearchServiceMessage::Done(job.finish(result)));
    });
}

impl<G: Geocoder, W: WeatherSource> SearchOrchestrator<G, W> {
    /// Apply a service message. Returns true when it settled the latest search.
    pub fn handle_message(&mut self, message: SearchServiceMessage) -> bool {
        match message {
            SearchServiceMessage::Geocoded(id) => {
                self.advance(id);
                false
            }
            SearchServiceMessage::Done(completion) => self.complete(completion),
        }
    }
}
