//! Processing strategy module for command replay
//!
//! A strategy owns the whole pipeline from an input CSV of commands to a
//! populated `Ledger`: reading, dispatching each command through the ledger
//! core, and logging commands the ledger rejects. Strategies are selected at
//! runtime from the CLI.

use crate::cli::StrategyType;
use crate::core::Ledger;
use crate::io::csv_format::write_accounts_csv;
use crate::types::{LedgerCommand, LedgerError};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, warn};

pub mod r#async;
pub mod batch_processor;
pub mod sync;

pub use self::r#async::{AsyncProcessingStrategy, BatchConfig};
pub use batch_processor::{BatchProcessor, ProcessingResult};
pub use sync::SyncProcessingStrategy;

/// Processing strategy trait for command replay pipelines
pub trait ProcessingStrategy: Send + Sync {
    /// Replay every command in `input_path` against a fresh ledger
    ///
    /// # Returns
    ///
    /// * `Ok(ledger)` once the whole input has been consumed. Malformed rows
    ///   and rejected commands are logged and do not fail the replay.
    /// * `Err(LedgerError)` if the input cannot be read or the runtime cannot
    ///   be built
    fn replay(&self, input_path: &Path) -> Result<Arc<Ledger>, LedgerError>;

    /// Replay `input_path` and write the resulting accounts CSV to `output`
    ///
    /// The replayed ledger is returned so the caller can run further queries
    /// against it, such as exporting the transaction log.
    fn process(
        &self,
        input_path: &Path,
        output: &mut dyn Write,
    ) -> Result<Arc<Ledger>, LedgerError> {
        let ledger = self.replay(input_path)?;
        write_accounts_csv(&ledger.accounts()?, output)?;
        Ok(ledger)
    }
}

/// Create a processing strategy based on the specified strategy type
///
/// # Arguments
///
/// * `strategy_type` - The type of processing strategy to create (Sync or Async)
/// * `config` - Optional configuration for async batch processing (ignored for sync)
pub fn create_strategy(
    strategy_type: StrategyType,
    config: Option<BatchConfig>,
) -> Box<dyn ProcessingStrategy> {
    match strategy_type {
        StrategyType::Sync => Box::new(SyncProcessingStrategy),
        StrategyType::Async => {
            let config = config.unwrap_or_default();
            Box::new(AsyncProcessingStrategy::new(config))
        }
    }
}

/// Run one command through the ledger, logging a rejection
pub(crate) fn apply_command(ledger: &Ledger, command: LedgerCommand) -> Result<(), LedgerError> {
    let description = command.to_string();
    match ledger.execute(command) {
        Ok(_) => Ok(()),
        Err(e) => {
            if e.is_infrastructure() {
                error!(command = %description, error = %e, "command failed");
            } else {
                warn!(command = %description, error = %e, "command rejected");
            }
            Err(e)
        }
    }
}
