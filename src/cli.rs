use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use crate::config::HarnessConfig;
use crate::scanner::RunMode;

#[derive(Parser)]
#[command(name = "apiprobe")]
#[command(version, about = "Resilience and security assessment for HTTP task APIs")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Clone, Default)]
pub struct TargetArgs {
    /// Base URL of the API under test
    #[arg(short, long)]
    pub url: Option<String>,

    /// JSON configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Per-request timeout in seconds
    #[arg(short, long)]
    pub timeout: Option<u64>,

    /// Write the report to a .json or .html file
    #[arg(short, long)]
    pub output: Option<String>,

    #[arg(short, long)]
    pub verbose: bool,
}

impl TargetArgs {
    /// File values first, then CLI overrides.
    pub fn resolve(&self) -> Result<HarnessConfig> {
        let mut config = match &self.config {
            Some(path) => HarnessConfig::from_file(path)?,
            None => HarnessConfig::default(),
        };

        if let Some(url) = &self.url {
            config = config.with_base_url(url.as_str());
        }
        if let Some(timeout) = self.timeout {
            config.timeout_ms = timeout * 1000;
        }

        Ok(config)
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Connectivity and basic protection checks
    Quick {
        #[command(flatten)]
        target: TargetArgs,
    },

    /// Rate limiting, concurrency, throughput and packet loss
    Stress {
        #[command(flatten)]
        target: TargetArgs,
    },

    /// Injection, bypass and brute-force campaigns
    Security {
        #[command(flatten)]
        target: TargetArgs,
    },

    /// Authentication flow checks only
    Auth {
        #[command(flatten)]
        target: TargetArgs,
    },

    /// Every phase
    Full {
        #[command(flatten)]
        target: TargetArgs,

        #[arg(long)]
        skip_auth: bool,

        #[arg(long)]
        skip_stress: bool,

        #[arg(long)]
        skip_security: bool,
    },

    /// Print the resolved configuration
    Config {
        #[command(flatten)]
        target: TargetArgs,
    },

    /// Render a saved JSON report
    Report {
        #[arg(short, long)]
        input: String,

        #[arg(short, long, default_value = "html")]
        format: String,

        #[arg(short, long)]
        output: Option<String>,
    },
}

impl Commands {
    /// The run mode and target for commands that probe the API.
    pub fn run_mode(&self) -> Option<(RunMode, &TargetArgs)> {
        match self {
            Commands::Quick { target } => Some((RunMode::Quick, target)),
            Commands::Stress { target } => Some((RunMode::Stress, target)),
            Commands::Security { target } => Some((RunMode::Security, target)),
            Commands::Auth { target } => Some((RunMode::Auth, target)),
            Commands::Full {
                target,
                skip_auth,
                skip_stress,
                skip_security,
            } => Some((
                RunMode::Full {
                    skip_auth: *skip_auth,
                    skip_stress: *skip_stress,
                    skip_security: *skip_security,
                },
                target,
            )),
            Commands::Config { .. } | Commands::Report { .. } => None,
        }
    }

    pub fn verbose(&self) -> bool {
        match self {
            Commands::Quick { target }
            | Commands::Stress { target }
            | Commands::Security { target }
            | Commands::Auth { target }
            | Commands::Full { target, .. }
            | Commands::Config { target } => target.verbose,
            Commands::Report { .. } => false,
        }
    }
}
