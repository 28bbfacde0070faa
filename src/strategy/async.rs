//! Asynchronous batch processing strategy
//!
//! # Architecture
//!
//! ```text
//! AsyncProcessingStrategy
//!     ├── BatchConfig (batch_size, max_concurrent)
//!     ├── AsyncReader (batch CSV reading)
//!     └── BatchProcessor (creation barriers + bounded fan-out)
//!         └── Arc<Ledger> (per-account locking)
//! ```
//!
//! Batches are processed one after another, so a command never overtakes a
//! command from an earlier batch. Within a batch, account creations run in
//! file order and everything between two creations runs concurrently on the
//! multi-threaded runtime.

use crate::core::Ledger;
use crate::io::async_reader::AsyncReader;
use crate::strategy::{BatchProcessor, ProcessingStrategy};
use crate::types::LedgerError;
use std::path::Path;
use std::sync::Arc;
use tokio_util::compat::TokioAsyncReadCompatExt;
use tracing::{debug, info, warn};

/// Configuration for batch processing
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchConfig {
    /// Number of commands read per batch
    pub batch_size: usize,
    /// Upper bound on commands in flight within a segment
    pub max_concurrent: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            max_concurrent: num_cpus::get(),
        }
    }
}

impl BatchConfig {
    /// Create a new BatchConfig, replacing zero values with the defaults
    pub fn new(batch_size: usize, max_concurrent: usize) -> Self {
        let default = Self::default();

        let batch_size = if batch_size == 0 {
            warn!(
                requested = batch_size,
                fallback = default.batch_size,
                "invalid batch_size, using default"
            );
            default.batch_size
        } else {
            batch_size
        };

        let max_concurrent = if max_concurrent == 0 {
            warn!(
                requested = max_concurrent,
                fallback = default.max_concurrent,
                "invalid max_concurrent, using default"
            );
            default.max_concurrent
        } else {
            max_concurrent
        };

        Self {
            batch_size,
            max_concurrent,
        }
    }
}

/// Asynchronous batch processing strategy
///
/// # Configuration
///
/// - `batch_size`: Number of commands per batch (default: 1000)
/// - `max_concurrent`: Commands in flight at once (default: CPU cores)
#[derive(Debug, Clone)]
pub struct AsyncProcessingStrategy {
    config: BatchConfig,
}

impl AsyncProcessingStrategy {
    pub fn new(config: BatchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }
}

impl ProcessingStrategy for AsyncProcessingStrategy {
    fn replay(&self, input_path: &Path) -> Result<Arc<Ledger>, LedgerError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .build()
            .map_err(|e| LedgerError::Io {
                message: format!("Failed to create tokio runtime: {}", e),
            })?;

        runtime.block_on(async {
            let ledger = Arc::new(Ledger::new());
            let processor = BatchProcessor::new(Arc::clone(&ledger), self.config.max_concurrent);

            let file = tokio::fs::File::open(input_path)
                .await
                .map_err(|e| LedgerError::Io {
                    message: format!("Failed to open file '{}': {}", input_path.display(), e),
                })?;
            let mut reader = AsyncReader::new(file.compat());

            let mut batches = 0usize;
            let mut applied = 0usize;
            let mut rejected = 0usize;
            loop {
                let batch = reader.read_batch(self.config.batch_size).await;
                if batch.is_empty() {
                    break;
                }

                batches += 1;
                debug!(batch = batches, size = batch.len(), "processing batch");
                for outcome in processor.process_batch(batch).await {
                    match outcome.result {
                        Ok(()) => applied += 1,
                        Err(_) => rejected += 1,
                    }
                }
            }

            info!(batches, applied, rejected, "async replay finished");
            Ok(ledger)
        })
    }
}
