// src/engine/batch.rs
use tokio::io::AsyncBufReadExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use super::enumerate::Enumerator;
use crate::core::{Target, TargetKind};
use crate::error::{LeakerError, LeakerResult};
use crate::reporting::ResultSink;
use crate::utils::TargetReader;

/// Totals across a whole batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub targets: usize,
    pub skipped: usize,
    pub found: usize,
}

/// Enumerate every valid line of `reader`, one target after another.
///
/// Lines that do not look like `kind` are skipped. A failing target does not
/// stop the batch; all failures are returned together at the end. Once
/// `cancel` fires no further target is started.
pub async fn run_batch(
    enumerator: &Enumerator,
    kind: TargetKind,
    reader: TargetReader,
    sinks: &mut [ResultSink],
    cancel: &CancellationToken,
) -> LeakerResult<BatchSummary> {
    if enumerator.filter_enabled() {
        debug!("Results filtering is enabled, leaker will filter results by matching every result to inputted target.");
    } else {
        debug!("Results filtering is disabled, leaker will not filter any result.");
    }

    let mut lines = reader.lines();
    let mut summary = BatchSummary::default();
    let mut errors = Vec::new();

    loop {
        if cancel.is_cancelled() {
            debug!("Cancelled, not starting further targets");
            break;
        }

        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                error!("could not read targets: {}", e);
                errors.push(LeakerError::IoError(e));
                break;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        let Some(target) = Target::parse_line(&line, kind) else {
            info!("Can't parse input as target, skipping: {}", line.trim().to_lowercase());
            summary.skipped += 1;
            continue;
        };

        summary.targets += 1;
        match enumerator.enumerate_target(cancel, &target, sinks).await {
            Ok(outcome) => summary.found += outcome.found,
            Err(e) => {
                error!("error enumerating {}: {}", target, e);
                errors.push(e);
            }
        }
    }

    if errors.is_empty() {
        Ok(summary)
    } else {
        Err(LeakerError::Batch(errors))
    }
}
