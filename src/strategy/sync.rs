//! Synchronous processing strategy
//!
//! Replays commands one at a time, in file order, on the calling thread.
//!
//! # Design
//!
//! The SyncProcessingStrategy focuses on orchestration, delegating:
//! - CSV parsing to `SyncReader` (iterator interface)
//! - Command execution to `Ledger` (business rules and locking)
//!
//! Because nothing runs concurrently, the result of a sync replay is fully
//! determined by the input file. It is the reference the async strategy is
//! compared against.

use crate::core::Ledger;
use crate::io::sync_reader::SyncReader;
use crate::strategy::{apply_command, ProcessingStrategy};
use crate::types::LedgerError;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Synchronous processing strategy
///
/// # Examples
///
/// ```no_run
/// use account_ledger::strategy::{ProcessingStrategy, SyncProcessingStrategy};
/// use std::path::Path;
/// use std::io;
///
/// let strategy = SyncProcessingStrategy;
/// let mut output = io::stdout();
///
/// strategy.process(Path::new("commands.csv"), &mut output)
///     .expect("Processing failed");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SyncProcessingStrategy;

impl ProcessingStrategy for SyncProcessingStrategy {
    fn replay(&self, input_path: &Path) -> Result<Arc<Ledger>, LedgerError> {
        let ledger = Ledger::new();
        let reader = SyncReader::new(input_path).map_err(|message| LedgerError::Io { message })?;

        let mut applied = 0usize;
        let mut rejected = 0usize;
        for result in reader {
            match result {
                Ok(command) => match apply_command(&ledger, command) {
                    Ok(()) => applied += 1,
                    Err(_) => rejected += 1,
                },
                Err(e) => {
                    warn!(error = %e, "skipping malformed row");
                    rejected += 1;
                }
            }
        }

        info!(applied, rejected, "sync replay finished");
        Ok(Arc::new(ledger))
    }
}
