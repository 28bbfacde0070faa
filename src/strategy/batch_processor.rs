//! Concurrent execution of one batch of ledger commands
//!
//! # Design
//!
//! A batch is split into segments at every `CreateAccount` command. Each
//! account creation runs alone, so account ids are handed out in file order.
//! The commands between two creations are independent from the processor's
//! point of view: they are fanned out as blocking tasks, at most
//! `max_concurrent` at a time, and the per-account locks inside the ledger
//! serialize the ones that touch the same account.
//!
//! ```text
//! [deposit, deposit, create, transfer, withdraw]
//!   └── concurrent ──┘  alone  └──── concurrent ───┘
//! ```
//!
//! # Thread Safety
//!
//! The processor is cloneable and shares the ledger through an `Arc`.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tracing::error;

use super::apply_command;
use crate::core::Ledger;
use crate::types::{LedgerCommand, LedgerError};

/// Outcome of one command
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessingResult {
    pub command: LedgerCommand,
    pub result: Result<(), LedgerError>,
}

/// Runs batches of commands against a shared ledger
#[derive(Debug, Clone)]
pub struct BatchProcessor {
    ledger: Arc<Ledger>,
    max_concurrent: usize,
}

impl BatchProcessor {
    /// # Arguments
    ///
    /// * `ledger` - Ledger every command is applied to
    /// * `max_concurrent` - Upper bound on commands in flight; zero is treated as one
    pub fn new(ledger: Arc<Ledger>, max_concurrent: usize) -> Self {
        Self {
            ledger,
            max_concurrent: max_concurrent.max(1),
        }
    }

    /// Split a batch into runs separated by account creations
    ///
    /// Every `CreateAccount` becomes a segment of its own. Order is preserved
    /// and empty segments are never produced.
    pub fn split_at_creations(batch: Vec<LedgerCommand>) -> Vec<Vec<LedgerCommand>> {
        let mut segments = Vec::new();
        let mut current = Vec::new();

        for command in batch {
            if command.is_create() {
                if !current.is_empty() {
                    segments.push(std::mem::take(&mut current));
                }
                segments.push(vec![command]);
            } else {
                current.push(command);
            }
        }

        if !current.is_empty() {
            segments.push(current);
        }
        segments
    }

    /// Process a batch and wait for every command in it
    ///
    /// # Returns
    ///
    /// One result per command. Results of a segment are in completion order,
    /// segments are in file order.
    pub async fn process_batch(&self, batch: Vec<LedgerCommand>) -> Vec<ProcessingResult> {
        let mut results = Vec::with_capacity(batch.len());

        for segment in Self::split_at_creations(batch) {
            let segment_results = stream::iter(segment)
                .map(|command| {
                    let ledger = Arc::clone(&self.ledger);
                    // Ledger operations block on account mutexes.
                    tokio::task::spawn_blocking(move || {
                        let result = apply_command(&ledger, command.clone());
                        ProcessingResult { command, result }
                    })
                })
                .buffer_unordered(self.max_concurrent)
                .collect::<Vec<_>>()
                .await;

            for joined in segment_results {
                match joined {
                    Ok(result) => results.push(result),
                    Err(e) => error!(error = %e, "command task panicked"),
                }
            }
        }

        results
    }
}
