//! I/O module
//!
//! Handles CSV command parsing and ledger output.
//!
//! # Components
//!
//! - `csv_format` - CSV format handling (command conversion, output serialization)
//! - `sync_reader` - Synchronous CSV reader with iterator interface
//! - `async_reader` - Asynchronous CSV reader with batch reading interface

pub mod async_reader;
pub mod csv_format;
pub mod sync_reader;

pub use async_reader::AsyncReader;
pub use csv_format::{
    convert_csv_command, write_accounts_csv, write_transactions_csv, CsvCommand,
};
pub use sync_reader::SyncReader;
