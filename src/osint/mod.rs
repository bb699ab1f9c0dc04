// src/osint/mod.rs
//! Provider contract for leak and breach-data sources.
//!
//! Every provider implements [`LeakSource`]. The engine never calls
//! [`LeakSource::search`] directly; it goes through [`run_source`], which
//! spawns the search on its own task and hands back a [`FindingStream`]
//! immediately. Provider failures travel on the same stream as an error
//! [`Finding`] and the stream then closes.

mod credentials;
mod registry;
pub mod sources;

use std::sync::Arc;
use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::core::{Finding, Target};
use crate::error::{LeakerError, LeakerResult};
use crate::utils::Session;

pub use credentials::Credentials;
pub use registry::{SourceRegistry, ALL_SOURCES};

/// Trait for leak data sources
#[async_trait]
pub trait LeakSource: Send + Sync {
    /// Stable lower-case identifier used for selection, credentials and tagging
    fn name(&self) -> &'static str;

    /// Whether the source is part of the default execution
    fn is_default(&self) -> bool {
        false
    }

    /// Whether the source requires at least one credential
    fn needs_key(&self) -> bool {
        true
    }

    /// Replace the credentials held by this source
    fn add_credentials(&mut self, credentials: Vec<String>);

    /// Maximum sustained requests per second the upstream tolerates
    fn rate_limit(&self) -> u32;

    /// Query the upstream for one target and push every hit into `results`.
    ///
    /// Returning `Ok(())` without emitting anything is how an unconfigured
    /// source skips.
    async fn search(&self, target: &Target, session: &Session, results: &FindingSender) -> LeakerResult<()>;
}

/// Producer half of a provider's finding stream
pub struct FindingSender {
    source_name: &'static str,
    tx: mpsc::Sender<Finding>,
}

impl FindingSender {
    pub fn new(source_name: &'static str, tx: mpsc::Sender<Finding>) -> Self {
        Self { source_name, tx }
    }

    /// Emit one value. Fails with [`LeakerError::ChannelClosed`] once the consumer is gone.
    pub async fn emit(&self, value: impl Into<String>) -> LeakerResult<()> {
        self.tx
            .send(Finding::value(self.source_name, value))
            .await
            .map_err(|_| LeakerError::ChannelClosed)
    }

    /// Emit every value in order
    pub async fn emit_all(&self, values: impl IntoIterator<Item = String>) -> LeakerResult<()> {
        for value in values {
            self.emit(value).await?;
        }
        Ok(())
    }

    async fn fail(&self, error: LeakerError) {
        // Nobody is listening any more; nothing to report to.
        let _ = self.tx.send(Finding::error(self.source_name, error)).await;
    }
}

/// Consumer half of a provider's finding stream. Finite and not restartable.
pub struct FindingStream {
    rx: mpsc::Receiver<Finding>,
}

impl FindingStream {
    pub fn new(rx: mpsc::Receiver<Finding>) -> Self {
        Self { rx }
    }

    /// Next finding, or `None` once the provider has finished
    pub async fn next(&mut self) -> Option<Finding> {
        self.rx.recv().await
    }
}

/// Start a source on a target and return its stream without waiting.
///
/// The search is dropped as soon as `cancel` fires, abandoning any request in flight.
pub fn run_source(
    source: Arc<dyn LeakSource>,
    target: Target,
    session: Session,
    cancel: CancellationToken,
) -> FindingStream {
    let (tx, rx) = mpsc::channel(1);

    tokio::spawn(async move {
        let sender = FindingSender::new(source.name(), tx);

        let outcome = tokio::select! {
            _ = cancel.cancelled() => {
                debug!("Source {} cancelled for {}", source.name(), target);
                return;
            }
            outcome = source.search(&target, &session, &sender) => outcome,
        };

        match outcome {
            Ok(()) => {}
            Err(e) if e.is_channel_closed() => {}
            Err(e) => sender.fail(e).await,
        }
    });

    FindingStream::new(rx)
}

/// Collect `field:value` pairs for every non-empty string field of a JSON object
pub(crate) fn flatten_fields(entry: &serde_json::Map<String, serde_json::Value>, fields: &[&str]) -> Vec<String> {
    fields
        .iter()
        .filter_map(|field| {
            entry
                .get(*field)
                .and_then(|v| v.as_str())
                .filter(|v| !v.is_empty())
                .map(|v| format!("{}:{}", field, v))
        })
        .collect()
}
