//! Asynchronous CSV reader with batch interface
//!
//! # Design
//!
//! The AsyncReader uses:
//! - csv-async for streaming CSV parsing
//! - the `futures` I/O traits so any async byte source can feed it
//! - batch reading so the caller can bound how many commands are in flight
//!
//! ```text
//! CSV bytes → AsyncReader → Vec<LedgerCommand> per batch
//!                  ↓
//!           csv_format module
//!           (CsvCommand, convert_csv_command)
//! ```
//!
//! Rows that fail to parse or convert are logged at `warn` and skipped, so a
//! batch only ever contains well-formed commands.

use crate::io::csv_format::{convert_csv_command, CsvCommand};
use crate::types::LedgerCommand;
use csv_async::AsyncReaderBuilder;
use futures::io::AsyncRead;
use futures::stream::StreamExt;
use tracing::warn;

/// Asynchronous CSV command reader
pub struct AsyncReader<R: AsyncRead + Unpin> {
    csv_reader: csv_async::AsyncDeserializer<R>,
}

impl<R: AsyncRead + Unpin + Send + 'static> AsyncReader<R> {
    pub fn new(reader: R) -> Self {
        let csv_reader = AsyncReaderBuilder::new()
            .flexible(true)
            .trim(csv_async::Trim::All)
            .create_deserializer(reader);

        Self { csv_reader }
    }

    /// Read up to `batch_size` commands
    ///
    /// Skipped rows are logged with the file line they start on.
    ///
    /// # Returns
    ///
    /// The well-formed commands read, in file order. An empty vector means the
    /// input is exhausted.
    pub async fn read_batch(&mut self, batch_size: usize) -> Vec<LedgerCommand> {
        let mut batch = Vec::with_capacity(batch_size);
        let mut records = self.csv_reader.deserialize_with_pos::<CsvCommand>();

        while batch.len() < batch_size {
            let Some((next, position)) = records.next().await else {
                break;
            };

            match next {
                Ok(record) => match convert_csv_command(record) {
                    Ok(command) => batch.push(command),
                    Err(e) => {
                        warn!(line = position.line(), error = %e, "skipping invalid command")
                    }
                },
                Err(e) => warn!(line = position.line(), error = %e, "skipping unparsable row"),
            }
        }

        batch
    }
}
