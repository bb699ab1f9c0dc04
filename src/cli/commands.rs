use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use crate::config::{split_list, RunOptions, Settings};
use crate::core::TargetKind;
use crate::reporting::OutputFormat;
use crate::utils::http::default_user_agent;
use crate::utils::ExistingFile;

#[derive(Parser, Debug)]
#[command(name = "leaker")]
#[command(version)]
#[command(about = "Passive leak enumeration across breach-data providers")]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[arg(short = 's', long, global = true, value_delimiter = ',', help = "Sources to use, comma-separated (default: all)")]
    pub sources: Vec<String>,

    #[arg(long, global = true, help = "Timeout for each request in seconds (default: 30)")]
    pub timeout: Option<u64>,

    #[arg(short = 'N', long, global = true, help = "Disable per-source rate limiting")]
    pub no_rate_limit: bool,

    #[arg(short = 'j', long, global = true, help = "Write results as JSON lines")]
    pub json: bool,

    #[arg(long, global = true, help = "Show duplicate results")]
    pub show_duplicates: bool,

    #[arg(long, global = true, help = "Do not drop results that don't contain the target")]
    pub no_filter: bool,

    #[arg(short = 'o', long, global = true, help = "Also write results to this file")]
    pub output: Option<PathBuf>,

    #[arg(long, global = true, conflicts_with = "append", help = "Truncate the output file if it exists")]
    pub overwrite: bool,

    #[arg(long, global = true, help = "Append to the output file if it exists")]
    pub append: bool,

    #[arg(short = 'p', long, global = true, help = "Provider credentials file")]
    pub provider_config: Option<PathBuf>,

    #[arg(long, global = true, help = "HTTP proxy URL")]
    pub proxy: Option<String>,

    #[arg(short = 'A', long, global = true, help = "Custom User-Agent")]
    pub user_agent: Option<String>,

    #[arg(long, global = true, help = "Accept invalid TLS certificates")]
    pub insecure: bool,

    #[arg(short = 'q', long, global = true, help = "Only print errors and results")]
    pub quiet: bool,

    #[arg(short = 'v', long, global = true, help = "Prefix results with their source")]
    pub verbose: bool,

    #[arg(short = 'D', long, global = true, help = "Enable debug logging")]
    pub debug: bool,

    #[arg(short = 'L', long, global = true, help = "List available sources and exit")]
    pub list_sources: bool,

    #[arg(short = 'c', long, global = true, help = "Settings file")]
    pub config: Option<PathBuf>,
}

#[derive(ClapArgs, Debug, Clone, Default)]
pub struct TargetArgs {
    #[arg(help = "A single target, or a file with one target per line (stdin when piped)")]
    pub targets: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search leaks by email address
    Email(TargetArgs),

    /// Search leaks by username
    Username(TargetArgs),

    /// Search leaks by domain
    Domain(TargetArgs),

    /// Search leaks by keyword
    Keyword(TargetArgs),

    /// Search leaks by phone number
    Phone(TargetArgs),
}

impl Commands {
    pub fn kind(&self) -> TargetKind {
        match self {
            Commands::Email(_) => TargetKind::Email,
            Commands::Username(_) => TargetKind::Username,
            Commands::Domain(_) => TargetKind::Domain,
            Commands::Keyword(_) => TargetKind::Keyword,
            Commands::Phone(_) => TargetKind::Phone,
        }
    }

    pub fn targets(&self) -> Option<&str> {
        match self {
            Commands::Email(args)
            | Commands::Username(args)
            | Commands::Domain(args)
            | Commands::Keyword(args)
            | Commands::Phone(args) => args.targets.as_deref(),
        }
    }
}

impl Args {
    /// Layer the command line over `settings`
    pub fn run_options(&self, command: &Commands, settings: &Settings, provider_config: PathBuf) -> RunOptions {
        let mut options = RunOptions::new(command.kind());

        options.targets = command.targets().map(str::to_string);
        options.sources = if self.sources.is_empty() {
            settings.source_list()
        } else {
            self.sources.iter().flat_map(|s| split_list(s)).collect()
        };
        options.timeout = self.timeout.map(Duration::from_secs).unwrap_or_else(|| settings.timeout());
        options.rate_limit = settings.rate_limit && !self.no_rate_limit;
        options.filter = !self.no_filter;
        options.dedup = !self.show_duplicates;
        options.format = if self.json { OutputFormat::Json } else { OutputFormat::Plain };
        options.verbose = self.verbose;
        options.output = self.output.clone();
        options.existing_output = match (self.overwrite, self.append) {
            (true, _) => ExistingFile::Truncate,
            (false, true) => ExistingFile::Append,
            (false, false) => ExistingFile::Refuse,
        };
        options.provider_config = provider_config;
        options.proxy = self.proxy.clone().or_else(|| settings.proxy.clone()).filter(|p| !p.is_empty());
        options.user_agent = self
            .user_agent
            .clone()
            .or_else(|| settings.user_agent.clone())
            .filter(|ua| !ua.is_empty())
            .unwrap_or_else(default_user_agent);
        options.insecure = self.insecure || settings.insecure;

        options
    }
}
