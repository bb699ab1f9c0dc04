// src/engine/enumerate.rs
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::config::RunOptions;
use crate::core::{Finding, Target};
use crate::error::LeakerResult;
use crate::osint::{run_source, FindingStream, LeakSource};
use crate::reporting::{LineFormatter, ResultSink};
use crate::utils::{Session, SessionConfig};

/// Result of one target's enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnumerationOutcome {
    pub found: usize,
    pub elapsed: Duration,
    pub interrupted: bool,
}

/// Runs one target at a time through every selected source
pub struct Enumerator {
    sources: Vec<Arc<dyn LeakSource>>,
    session_config: SessionConfig,
    formatter: LineFormatter,
    rate_limit: bool,
    filter: bool,
    dedup: bool,
}

impl Enumerator {
    pub fn new(options: &RunOptions, sources: Vec<Arc<dyn LeakSource>>) -> Self {
        Self {
            sources,
            session_config: options.session_config(),
            formatter: options.formatter(),
            rate_limit: options.rate_limit,
            filter: options.filter,
            dedup: options.dedup,
        }
    }

    pub fn filter_enabled(&self) -> bool {
        self.filter
    }

    /// Fan `target` out to every source and write what comes back to `sinks`.
    ///
    /// Returns once every source has finished (or abandoned its work after
    /// `cancel` fired) and every finding has been handled. Cancellation is
    /// reported through [`EnumerationOutcome::interrupted`], not as an error.
    pub async fn enumerate_target(
        &self,
        cancel: &CancellationToken,
        target: &Target,
        sinks: &mut [ResultSink],
    ) -> LeakerResult<EnumerationOutcome> {
        info!("Enumerating leaks for {}", target);
        let started = Instant::now();

        let session = Session::new(&self.session_config)?;
        let (tx, mut rx) = mpsc::channel::<Finding>(1);
        let mut dispatchers = JoinSet::new();

        for source in &self.sources {
            let stream = run_source(source.clone(), target.clone(), session.clone(), cancel.clone());
            let throttle = self.rate_limit.then(|| throttle_delay(source.rate_limit()));
            dispatchers.spawn(forward(stream, tx.clone(), cancel.clone(), throttle));
        }
        drop(tx);

        let mut aggregator = Aggregator::new(target, self.formatter, self.filter, self.dedup);
        while let Some(finding) = rx.recv().await {
            aggregator.process(finding, sinks).await;
        }

        while let Some(joined) = dispatchers.join_next().await {
            if let Err(e) = joined {
                error!("Source dispatcher for {} failed: {}", target, e);
            }
        }
        session.close();

        let elapsed = started.elapsed();
        let found = aggregator.found();

        if cancel.is_cancelled() {
            info!("Interrupted");
            return Ok(EnumerationOutcome { found, elapsed, interrupted: true });
        }

        info!(
            "Found {} leaks for {} in {:?}",
            found,
            target,
            Duration::from_millis(elapsed.as_millis() as u64)
        );
        Ok(EnumerationOutcome { found, elapsed, interrupted: false })
    }
}

/// Pause after one source's results so the next target waits at least `1/rate` seconds
fn throttle_delay(rate_limit: u32) -> Duration {
    Duration::from_secs(1) / rate_limit.max(1)
}

/// Move one source's findings into the shared channel, then hold the slot for `throttle`
async fn forward(
    mut stream: FindingStream,
    tx: mpsc::Sender<Finding>,
    cancel: CancellationToken,
    throttle: Option<Duration>,
) {
    loop {
        let finding = tokio::select! {
            _ = cancel.cancelled() => return,
            finding = stream.next() => finding,
        };
        let Some(finding) = finding else {
            break;
        };

        tokio::select! {
            _ = cancel.cancelled() => return,
            sent = tx.send(finding) => {
                if sent.is_err() {
                    return;
                }
            }
        }
    }
    drop(tx);

    if let Some(delay) = throttle {
        tokio::select! {
            _ = cancel.cancelled() => {}
            _ = tokio::time::sleep(delay) => {}
        }
    }
}

/// Single consumer of the fan-in channel.
///
/// Owns the per-target seen-set and found-count; nothing else touches them.
pub struct Aggregator<'a> {
    target: &'a Target,
    needle: String,
    formatter: LineFormatter,
    filter: bool,
    dedup: bool,
    seen: HashSet<String>,
    found: usize,
}

impl<'a> Aggregator<'a> {
    pub fn new(target: &'a Target, formatter: LineFormatter, filter: bool, dedup: bool) -> Self {
        Self {
            target,
            needle: target.value().to_lowercase(),
            formatter,
            filter,
            dedup,
            seen: HashSet::new(),
            found: 0,
        }
    }

    pub fn found(&self) -> usize {
        self.found
    }

    /// Handle one finding. Returns whether it counted as a new result.
    pub async fn process(&mut self, finding: Finding, sinks: &mut [ResultSink]) -> bool {
        let value = match finding.outcome {
            Ok(value) => value,
            Err(e) => {
                error!(source = %finding.source, "error on enumerating target {}: {}", self.target, e);
                return false;
            }
        };

        if self.filter && !value.to_lowercase().contains(&self.needle) {
            debug!("Filtered out result from {} source", finding.source);
            return false;
        }

        if self.dedup && !self.seen.insert(value.clone()) {
            return false;
        }

        self.found += 1;

        let line = match self.formatter.format(&finding.source, &value, self.target.value()) {
            Ok(line) => line,
            Err(e) => {
                error!("could not format result for {}: {}", self.target, e);
                return true;
            }
        };

        for sink in sinks.iter_mut() {
            if let Err(e) = sink.write_line(&line).await {
                error!("could not write results for {} to {}: {}", self.target, sink.label(), e);
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TargetKind;
    use crate::error::LeakerError;
    use crate::reporting::OutputFormat;
    use std::io;
    use std::pin::Pin;
    use std::sync::Mutex;
    use std::task::{Context, Poll};
    use tokio::io::AsyncWrite;

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl SharedBuffer {
        fn lines(&self) -> Vec<String> {
            String::from_utf8(self.0.lock().unwrap().clone())
                .unwrap()
                .lines()
                .map(str::to_string)
                .collect()
        }
    }

    impl AsyncWrite for SharedBuffer {
        fn poll_write(self: Pin<&mut Self>, _cx: &mut Context<'_>, buf: &[u8]) -> Poll<io::Result<usize>> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Poll::Ready(Ok(buf.len()))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    struct BrokenWriter;

    impl AsyncWrite for BrokenWriter {
        fn poll_write(self: Pin<&mut Self>, _cx: &mut Context<'_>, _buf: &[u8]) -> Poll<io::Result<usize>> {
            Poll::Ready(Err(io::Error::new(io::ErrorKind::Other, "disk full")))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    fn target() -> Target {
        Target::new("a@test.com", TargetKind::Email)
    }

    #[tokio::test]
    async fn test_error_findings_are_not_counted() {
        let target = target();
        let buffer = SharedBuffer::default();
        let mut sinks = vec![ResultSink::from_writer("mem", buffer.clone())];
        let mut aggregator = Aggregator::new(&target, LineFormatter::default(), true, true);

        let finding = Finding::error("leakcheck", LeakerError::source_error("leakcheck", "boom"));
        assert!(!aggregator.process(finding, &mut sinks).await);
        assert_eq!(aggregator.found(), 0);
        assert!(buffer.lines().is_empty());
    }

    #[tokio::test]
    async fn test_filter_is_case_insensitive() {
        let target = target();
        let mut aggregator = Aggregator::new(&target, LineFormatter::default(), true, true);

        assert!(aggregator.process(Finding::value("x", "EMAIL:A@TEST.COM"), &mut []).await);
        assert!(!aggregator.process(Finding::value("x", "b@test.com:pass"), &mut []).await);
        assert_eq!(aggregator.found(), 1);
    }

    #[tokio::test]
    async fn test_dedup_uses_exact_value() {
        let target = target();
        let mut aggregator = Aggregator::new(&target, LineFormatter::default(), true, true);

        assert!(aggregator.process(Finding::value("a", "a@test.com:x"), &mut []).await);
        assert!(!aggregator.process(Finding::value("b", "a@test.com:x"), &mut []).await);
        assert!(aggregator.process(Finding::value("b", "A@test.com:x"), &mut []).await);
        assert_eq!(aggregator.found(), 2);
    }

    #[tokio::test]
    async fn test_failing_sink_does_not_block_others() {
        let target = target();
        let buffer = SharedBuffer::default();
        let mut sinks = vec![
            ResultSink::from_writer("broken", BrokenWriter),
            ResultSink::from_writer("mem", buffer.clone()),
        ];
        let formatter = LineFormatter::new(OutputFormat::Plain, true);
        let mut aggregator = Aggregator::new(&target, formatter, true, true);

        assert!(aggregator.process(Finding::value("proxynova", "a@test.com:x"), &mut sinks).await);
        assert!(aggregator.process(Finding::value("proxynova", "a@test.com:y"), &mut sinks).await);
        assert_eq!(buffer.lines(), vec!["[proxynova] a@test.com:x", "[proxynova] a@test.com:y"]);
    }

    #[test]
    fn test_throttle_delay() {
        assert_eq!(throttle_delay(1), Duration::from_secs(1));
        assert_eq!(throttle_delay(4), Duration::from_millis(250));
        assert_eq!(throttle_delay(0), Duration::from_secs(1));
    }
}
