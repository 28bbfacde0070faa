//! Synchronous CSV reader with iterator interface
//!
//! Streams ledger commands out of a CSV file one row at a time. Format
//! concerns live in `csv_format`; this module only owns the file handle and
//! line bookkeeping.
//!
//! # Iterator Interface
//!
//! `SyncReader` yields `Result<LedgerCommand, String>` per data row:
//!
//! ```no_run
//! use account_ledger::io::sync_reader::SyncReader;
//! use std::path::Path;
//!
//! let reader = SyncReader::new(Path::new("commands.csv")).unwrap();
//! for result in reader {
//!     match result {
//!         Ok(command) => println!("{}", command),
//!         Err(e) => eprintln!("Error: {}", e),
//!     }
//! }
//! ```
//!
//! # Error Handling
//!
//! - Failing to open the file is returned from `new()`
//! - Row-level parse and conversion failures are yielded as `Err` items and
//!   iteration continues with the next row
//! - Error messages carry the 1-based file line (the header is line 1)

use crate::io::csv_format::{convert_csv_command, CsvCommand};
use crate::types::LedgerCommand;
use csv::{ReaderBuilder, StringRecord, Trim};
use std::fs::File;
use std::path::Path;

/// Synchronous CSV command reader
#[derive(Debug)]
pub struct SyncReader {
    reader: csv::Reader<File>,
    headers: StringRecord,
    record: StringRecord,
}

impl SyncReader {
    /// Open `path` for streaming
    ///
    /// The CSV reader trims every field, tolerates short rows (unused columns
    /// may be omitted) and reads through an 8KB buffer.
    ///
    /// # Returns
    ///
    /// * `Ok(SyncReader)` if the file opened and its header row was readable
    /// * `Err(String)` describing the path and the failure otherwise
    pub fn new(path: &Path) -> Result<Self, String> {
        let file = File::open(path)
            .map_err(|e| format!("Failed to open file '{}': {}", path.display(), e))?;

        let mut reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .buffer_capacity(8 * 1024)
            .from_reader(file);
        let headers = reader
            .headers()
            .map_err(|e| format!("Failed to read header of '{}': {}", path.display(), e))?
            .clone();

        Ok(Self {
            reader,
            headers,
            record: StringRecord::new(),
        })
    }
}

impl Iterator for SyncReader {
    type Item = Result<LedgerCommand, String>;

    /// Yields the next row, tagged with the file line it starts on
    fn next(&mut self) -> Option<Self::Item> {
        match self.reader.read_record(&mut self.record) {
            Ok(false) => None,
            Ok(true) => {
                let line = self.record.position().map_or(0, |pos| pos.line());
                Some(
                    self.record
                        .deserialize::<CsvCommand>(Some(&self.headers))
                        .map_err(|e| format!("Line {}: CSV parse error: {}", line, e))
                        .and_then(|command| {
                            convert_csv_command(command)
                                .map_err(|e| format!("Line {}: {}", line, e))
                        }),
                )
            }
            Err(e) => {
                let line = e.position().map_or(0, |pos| pos.line());
                Some(Err(format!("Line {}: CSV parse error: {}", line, e)))
            }
        }
    }
}
