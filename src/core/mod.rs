mod finding;
mod target;

pub use finding::Finding;
pub use target::{Target, TargetKind};
