mod batch;
mod enumerate;

pub use batch::{run_batch, BatchSummary};
pub use enumerate::{Aggregator, EnumerationOutcome, Enumerator};
