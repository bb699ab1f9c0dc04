pub mod fs;
pub mod http;

pub use fs::{ExistingFile, TargetReader};
pub use http::{Session, SessionConfig, SessionResponse};
