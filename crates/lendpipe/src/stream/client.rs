//! Lifecycle of the live status feed.
//!
//! At most one feed is open at a time. Opening connects `GET /status`,
//! discards any prior feed along with its unread events, clears the log, and
//! pumps decoded events into the [`StatusLog`] and a broadcast channel until
//! the server closes the stream or a transport error ends it. The feed is
//! advisory: nothing here can fail a pipeline run.

use std::sync::{Arc, Mutex};

use futures_util::{Stream, StreamExt};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::debug;

use super::event::StatusEvent;
use super::log::{StatusEntry, StatusLog};
use super::sse;
use crate::config::ServiceConfig;
use crate::error::StreamError;

enum StreamSource {
    /// Live server feed.
    Http { http: reqwest::Client, endpoint: String },
    /// Canned feed for rehearsal and tests; replayed on every `open`.
    Scripted(Vec<StatusEvent>),
}

/// Owns the single live status stream.
pub struct StatusStreamClient {
    source: StreamSource,
    log: Arc<Mutex<StatusLog>>,
    broadcaster: broadcast::Sender<StatusEvent>,
    pump: Mutex<Option<JoinHandle<()>>>,
}

impl StatusStreamClient {
    /// Live client. `http` must not carry a total request timeout: the feed
    /// stays open for the whole underwrite phase.
    pub fn new(http: reqwest::Client, config: &ServiceConfig) -> Self {
        Self::with_source(
            StreamSource::Http {
                http,
                endpoint: config.status_url(),
            },
            config,
        )
    }

    /// Client fed from a canned event list instead of the network.
    pub fn scripted(events: Vec<StatusEvent>, config: &ServiceConfig) -> Self {
        Self::with_source(StreamSource::Scripted(events), config)
    }

    fn with_source(source: StreamSource, config: &ServiceConfig) -> Self {
        let (broadcaster, _) = broadcast::channel(config.status_channel_capacity);
        Self {
            source,
            log: Arc::new(Mutex::new(StatusLog::new(config.status_log_capacity))),
            broadcaster,
            pump: Mutex::new(None),
        }
    }

    /// Opens the feed, implicitly closing and discarding any prior one.
    ///
    /// The connection itself can fail; once open, per-message decode errors
    /// are dropped inside the pump and a transport error silently ends it.
    pub async fn open(&self) -> Result<(), StreamError> {
        self.close();
        if let Ok(mut log) = self.log.lock() {
            log.clear();
        }

        match &self.source {
            StreamSource::Http { http, endpoint } => {
                let response = http.get(endpoint).send().await?;
                let status = response.status();
                if !status.is_success() {
                    return Err(StreamError::Rejected {
                        status: status.as_u16(),
                    });
                }
                debug!("Status feed connected: {endpoint}");
                self.spawn_pump(sse::event_stream(response.bytes_stream()));
            }
            StreamSource::Scripted(events) => {
                self.spawn_pump(futures_util::stream::iter(events.clone()));
            }
        }

        Ok(())
    }

    fn spawn_pump<S>(&self, events: S)
    where
        S: Stream<Item = StatusEvent> + Send + 'static,
    {
        let log = Arc::clone(&self.log);
        let broadcaster = self.broadcaster.clone();

        let pump = tokio::spawn(async move {
            let mut events = Box::pin(events);
            while let Some(event) = events.next().await {
                if let Ok(mut log) = log.lock() {
                    log.apply(event.clone());
                }
                // No active receivers is fine.
                let _ = broadcaster.send(event);
            }
            debug!("Status feed ended");
        });

        if let Ok(mut slot) = self.pump.lock() {
            if let Some(previous) = slot.replace(pump) {
                previous.abort();
            }
        }
    }

    /// Closes the feed. Idempotent; safe when nothing is open.
    pub fn close(&self) {
        if let Ok(mut slot) = self.pump.lock() {
            if let Some(pump) = slot.take() {
                pump.abort();
            }
        }
    }

    /// True while the pump is still following a feed.
    pub fn is_open(&self) -> bool {
        self.pump
            .lock()
            .map(|slot| slot.as_ref().map(|p| !p.is_finished()).unwrap_or(false))
            .unwrap_or(false)
    }

    /// Subscribes to events as they arrive.
    pub fn subscribe(&self) -> broadcast::Receiver<StatusEvent> {
        self.broadcaster.subscribe()
    }

    /// Current rendering of the log, newest step first.
    pub fn snapshot(&self) -> Vec<StatusEntry> {
        self.log
            .lock()
            .map(|log| log.entries())
            .unwrap_or_default()
    }
}

impl Drop for StatusStreamClient {
    fn drop(&mut self) {
        self.close();
    }
}
