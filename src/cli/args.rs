use crate::strategy::BatchConfig;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Replay ledger commands from a CSV file
#[derive(Parser, Debug)]
#[command(name = "account-ledger")]
#[command(about = "Replay account commands against a concurrency-safe ledger", long_about = None)]
pub struct CliArgs {
    /// Input CSV file path containing ledger commands
    #[arg(value_name = "INPUT", help = "Path to the input CSV file")]
    pub input_file: PathBuf,

    /// Replay strategy
    #[arg(
        long = "strategy",
        value_name = "STRATEGY",
        default_value = "sync",
        help = "Replay strategy: 'sync' replays in file order, 'async' replays independent commands concurrently"
    )]
    pub strategy: StrategyType,

    /// Number of commands per batch (async mode only)
    #[arg(
        long = "batch-size",
        value_name = "SIZE",
        help = "Number of commands per batch (default: 1000)"
    )]
    pub batch_size: Option<usize>,

    /// Maximum number of commands in flight (async mode only)
    #[arg(
        long = "max-concurrent",
        value_name = "COUNT",
        help = "Maximum commands in flight at once (default: CPU cores)"
    )]
    pub max_concurrent: Option<usize>,

    /// Optional path for the transaction log export
    #[arg(
        long = "transactions",
        value_name = "PATH",
        help = "Also write every recorded transaction to this CSV file"
    )]
    pub transactions: Option<PathBuf>,

    /// Log level used when RUST_LOG is not set
    #[arg(
        long = "log-level",
        value_name = "LEVEL",
        default_value = "warn",
        help = "Log level: error, warn, info, debug or trace (RUST_LOG takes precedence)"
    )]
    pub log_level: String,
}

/// Available replay strategies
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum StrategyType {
    Sync,
    Async,
}

impl CliArgs {
    /// Create a BatchConfig from CLI arguments
    ///
    /// Missing values take the defaults; zero values are replaced with the
    /// defaults by `BatchConfig::new`, which logs a warning.
    pub fn to_batch_config(&self) -> BatchConfig {
        if self.batch_size.is_some() || self.max_concurrent.is_some() {
            let default = BatchConfig::default();
            BatchConfig::new(
                self.batch_size.unwrap_or(default.batch_size),
                self.max_concurrent
                    .unwrap_or(default.max_concurrent),
            )
        } else {
            BatchConfig::default()
        }
    }
}
