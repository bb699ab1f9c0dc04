mod format;
mod sink;

pub use format::{JsonRecord, LineFormatter, OutputFormat};
pub use sink::ResultSink;
