use clap::CommandFactory;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::{self, ensure_default_provider_config, resolve_provider_config};
use crate::config_path;
use crate::error::LeakerResult;
use crate::osint::SourceRegistry;
use crate::runner::Runner;
use crate::utils::fs::has_stdin;

use super::commands::Args;

/// The command-line application
pub struct App {
    args: Args,
}

impl App {
    pub fn new(args: Args) -> Self {
        Self { args }
    }

    /// Run the application until all targets are done or `cancel` fires
    pub async fn run(&self, cancel: CancellationToken) -> LeakerResult<()> {
        let settings = config::load_settings(self.args.config.as_deref())?;
        let registry = SourceRegistry::new();

        let default_provider_config = settings
            .provider_config
            .clone()
            .unwrap_or_else(config_path::provider_config_path);
        ensure_default_provider_config(&default_provider_config, &key_sources(&registry));
        let provider_config = resolve_provider_config(self.args.provider_config.as_deref(), &default_provider_config);

        if self.args.list_sources {
            list_sources(&registry, &provider_config);
            return Ok(());
        }

        let Some(command) = &self.args.command else {
            Args::command().print_help()?;
            return Ok(());
        };

        let mut options = self.args.run_options(command, &settings, provider_config);
        options.stdin = has_stdin();
        debug!("Run options: {:?}", options);

        let runner = Runner::new(options, registry)?;
        runner.run(&cancel).await?;

        Ok(())
    }
}

fn key_sources(registry: &SourceRegistry) -> Vec<&'static str> {
    registry.sources().filter(|s| s.needs_key()).map(|s| s.name()).collect()
}

fn list_sources(registry: &SourceRegistry, provider_config: &std::path::Path) {
    let names = registry.names();
    info!("Current list of available sources. [{}]", names.len());
    info!("Sources marked with an * require key(s) or token(s) to work.");
    info!("You can modify {} to configure your keys/tokens.", provider_config.display());

    for source in registry.sources() {
        if source.needs_key() {
            println!("{} *", source.name());
        } else {
            println!("{}", source.name());
        }
    }
}
