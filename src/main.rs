//! Account Ledger CLI
//!
//! Replays a CSV file of account commands and prints the resulting accounts.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- commands.csv > accounts.csv
//! cargo run -- --strategy async --batch-size 2000 --max-concurrent 8 commands.csv > accounts.csv
//! cargo run -- --transactions transactions.csv --log-level info commands.csv
//! ```
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (missing arguments, file not found, output not writable, etc.)

use account_ledger::cli::{self, CliArgs, StrategyType};
use account_ledger::core::LedgerQueries;
use account_ledger::types::LedgerError;
use account_ledger::{logging, strategy, write_transactions_csv};
use std::fs::File;
use std::io::BufWriter;
use std::process;

fn main() {
    let args = cli::parse_args();
    logging::init(&args.log_level);

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(args: &CliArgs) -> Result<(), LedgerError> {
    let config = match args.strategy {
        StrategyType::Async => Some(args.to_batch_config()),
        StrategyType::Sync => None,
    };
    let strategy = strategy::create_strategy(args.strategy, config);

    let mut output = std::io::stdout();
    let ledger = strategy.process(&args.input_file, &mut output)?;

    if let Some(path) = &args.transactions {
        let transactions = LedgerQueries::new(ledger).all_transactions()?;
        let mut file = BufWriter::new(File::create(path)?);
        write_transactions_csv(&transactions, &mut file)?;
    }

    Ok(())
}
