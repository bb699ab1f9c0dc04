pub mod cli;
pub mod config;
pub mod config_path;
pub mod core;
pub mod engine;
pub mod error;
pub mod logging;
pub mod osint;
pub mod reporting;
pub mod runner;
pub mod utils;

// Re-export main types for easier access
pub use config::RunOptions;
pub use core::{Finding, Target, TargetKind};
pub use engine::{run_batch, BatchSummary, EnumerationOutcome, Enumerator};
pub use error::{LeakerError, LeakerResult};
pub use osint::{LeakSource, SourceRegistry};
pub use reporting::{OutputFormat, ResultSink};
pub use runner::Runner;
