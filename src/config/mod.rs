// src/config/mod.rs
mod loader;
mod options;
mod providers;
mod schema;

pub use loader::load_settings;
pub use options::RunOptions;
pub use providers::{
    create_provider_config, ensure_default_provider_config, load_provider_config,
    resolve_provider_config, ProviderCredentials,
};
pub use schema::Settings;
pub(crate) use schema::split_list;
