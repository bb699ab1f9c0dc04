// src/runner.rs
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::{load_provider_config, RunOptions};
use crate::engine::{run_batch, BatchSummary, Enumerator};
use crate::error::LeakerResult;
use crate::osint::SourceRegistry;
use crate::reporting::ResultSink;
use crate::utils::fs::open_targets;
use crate::utils::http::validate_proxy;
use crate::utils::TargetReader;

/// A fully configured run: sources selected, targets and sinks open
pub struct Runner {
    options: RunOptions,
    enumerator: Enumerator,
    targets: TargetReader,
    sinks: Vec<ResultSink>,
}

impl Runner {
    /// Configure a run that writes to stdout, plus the output file if one was given
    pub fn new(options: RunOptions, registry: SourceRegistry) -> LeakerResult<Self> {
        Self::with_sinks(options, registry, vec![ResultSink::stdout()])
    }

    /// Configure a run writing to `sinks`, plus the output file if one was given.
    ///
    /// Everything that can fail before the first request fails here: proxy,
    /// source selection, target input and output file. The output file is
    /// created last so a failed setup never leaves one behind.
    pub fn with_sinks(options: RunOptions, mut registry: SourceRegistry, mut sinks: Vec<ResultSink>) -> LeakerResult<Self> {
        if let Some(proxy) = options.proxy.as_deref().filter(|p| !p.is_empty()) {
            validate_proxy(proxy)?;
        }

        let credentials = load_provider_config(&options.provider_config);
        let configured = registry.load_credentials(&credentials);
        debug!("Credentials loaded for {} source(s)", configured);

        let sources = registry.select(&options.sources)?;
        let targets = open_targets(options.targets.as_deref(), options.stdin)?;

        if let Some(path) = options.output.as_deref() {
            sinks.push(ResultSink::file(path, options.existing_output)?);
        }

        let enumerator = Enumerator::new(&options, sources);
        Ok(Self { options, enumerator, targets, sinks })
    }

    /// Enumerate every target in turn
    pub async fn run(mut self, cancel: &CancellationToken) -> LeakerResult<BatchSummary> {
        run_batch(&self.enumerator, self.options.kind, self.targets, &mut self.sinks, cancel).await
    }
}
