//! Fixed-interval state polling.

use super::rest::SessionApi;
use super::view::{ClientView, ViewEvent};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::time::{Duration, sleep};
use tracing::{debug, info, instrument, warn};

/// Polls one session and forwards view events.
pub struct Poller {
    api: Arc<dyn SessionApi>,
    game_id: String,
    view: ClientView,
    interval: Duration,
    event_tx: mpsc::UnboundedSender<ViewEvent>,
    shutdown: watch::Receiver<bool>,
}

impl Poller {
    /// Creates a poller for `view`'s player in `game_id`.
    ///
    /// Sending `true` on the shutdown channel, or dropping its sender, stops
    /// the loop.
    pub fn new(
        api: Arc<dyn SessionApi>,
        game_id: String,
        view: ClientView,
        interval: Duration,
        event_tx: mpsc::UnboundedSender<ViewEvent>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            api,
            game_id,
            view,
            interval,
            event_tx,
            shutdown,
        }
    }

    /// Runs until shut down or until the event receiver goes away, then
    /// returns the last view.
    #[instrument(skip(self), fields(game_id = %self.game_id, user_id = %self.view.user_id()))]
    pub async fn run(mut self) -> ClientView {
        info!(interval_ms = self.interval.as_millis() as u64, "Starting state polling");

        loop {
            if *self.shutdown.borrow() {
                break;
            }

            let user_id = self.view.user_id().clone();
            match self.api.state(&self.game_id, Some(&user_id)).await {
                Ok(snapshot) => {
                    for event in self.view.apply(snapshot) {
                        debug!(?event, "Forwarding view event");
                        if self.event_tx.send(event).is_err() {
                            info!("Event receiver dropped, stopping");
                            return self.view;
                        }
                    }
                }
                Err(e) => {
                    warn!(error = %e, "Failed to poll server");
                }
            }

            tokio::select! {
                _ = sleep(self.interval) => {}
                changed = self.shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        info!("Polling stopped");
        self.view
    }
}
