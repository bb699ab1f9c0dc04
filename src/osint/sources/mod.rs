// src/osint/sources/mod.rs
mod breachdirectory;
mod dehashed;
mod intelx;
mod leakcheck;
mod leaklookup;
mod leaksight;
mod osintleak;
mod proxynova;
mod snusbase;

pub use breachdirectory::BreachDirectory;
pub use dehashed::DeHashed;
pub use intelx::IntelX;
pub use leakcheck::LeakCheck;
pub use leaklookup::LeakLookup;
pub use leaksight::LeakSight;
pub use osintleak::OsintLeak;
pub use proxynova::ProxyNova;
pub use snusbase::Snusbase;
