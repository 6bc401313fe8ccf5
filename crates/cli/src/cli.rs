//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use observability::ObservabilityConfig;
use std::path::PathBuf;

/// demo-rx - satellite API transmit emulator
#[derive(Parser, Debug)]
#[command(
    name = "demo-rx",
    author,
    version,
    about = "Demo receiver for the satellite API",
    long_about = "Subscribes to the satellite API transmission feed, fetches every \n\
                  announced message, fragments it into link packets and sends them \n\
                  to the configured outputs at a fixed bit rate."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "DEMO_RX_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "DEMO_RX_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Logging setup from the global flags; metrics are started by `run`
    pub fn observability_config(&self) -> ObservabilityConfig {
        let level = if self.quiet {
            "warn"
        } else {
            match self.verbose {
                0 => "info",
                1 => "debug",
                _ => "trace",
            }
        };
        ObservabilityConfig {
            log_format: self.log_format.into(),
            metrics_port: None,
            default_log_level: level.to_string(),
            force_level: self.quiet,
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Subscribe to the feed and transmit
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(short, long, default_value = "demo-rx.toml", env = "DEMO_RX_CONFIG")]
    pub config: PathBuf,

    /// Override API server address
    #[arg(long, env = "DEMO_RX_SERVER")]
    pub server: Option<String>,

    /// Override transmission bit rate in kbps
    #[arg(long, env = "DEMO_RX_BITRATE")]
    pub bitrate: Option<f64>,

    /// Override logical channel
    #[arg(long, env = "DEMO_RX_CHANNEL")]
    pub channel: Option<u8>,

    /// Override the order status that triggers a transmission
    #[arg(long, env = "DEMO_RX_EVENT")]
    pub event: Option<String>,

    /// Print the effective configuration and exit without subscribing
    #[arg(long)]
    pub dry_run: bool,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "DEMO_RX_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "demo-rx.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "demo-rx.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Show sink parameters
    #[arg(long)]
    pub sinks: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}
