// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

use cash_ledger_rs::{
    CashError, CashMachine, Denomination, MachineConfig, NoteBundle, PlannerKind, PolicyKind,
};
use clap::Parser;
use csv::{ReaderBuilder, Trim, WriterBuilder};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::PathBuf;
use std::process;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

/// Cash Machine - Replay withdrawals and deposits against a note ledger
///
/// Builds a machine from the given stock, applies the operations from a CSV
/// file (or a short demonstration sequence) and writes the final stock to
/// stdout. Set RUST_LOG to control log output on stderr.
#[derive(Parser, Debug)]
#[command(name = "cash-ledger-rs")]
#[command(about = "A cash machine that dispenses notes from a shared ledger", long_about = None)]
struct Args {
    /// Path to CSV file with operations
    ///
    /// Expected format: type,amount,notes
    /// Example: cargo run -- operations.csv > inventory.csv
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Initial stock as denomination:count pairs
    #[arg(long, default_value = "50:2,20:3,10:5,5:10")]
    stock: NoteBundle,

    /// Note selection algorithm
    #[arg(long, value_enum, default_value = "greedy")]
    planner: PlannerKind,

    /// Require every denomination to be a multiple of this unit
    #[arg(long)]
    base_unit: Option<u32>,
}

/// Journal entries accumulated before they are flushed to the log.
const JOURNAL_BATCH: usize = 256;

/// Withdraws 130, then deposits 10x2 and 5x1.
const DEMO_OPERATIONS: &str = "type,amount,notes\n\
                               withdrawal,130,\n\
                               deposit,,\"10:2,5:1\"\n";

fn main() {
    init_tracing();
    let args = Args::parse();

    let config = MachineConfig {
        stock: args.stock,
        planner: args.planner,
        policy: args
            .base_unit
            .map_or(PolicyKind::SmallestDenomination, |base_unit| {
                PolicyKind::BaseUnit { base_unit }
            }),
    };
    let machine = match config.build() {
        Ok(machine) => machine,
        Err(e) => {
            error!("Error building machine: {}", e);
            process::exit(1);
        }
    };
    info!(balance = machine.balance(), "initial balance");

    let summary = match &args.input {
        Some(path) => {
            let file = match File::open(path) {
                Ok(f) => f,
                Err(e) => {
                    error!("Error opening file '{}': {}", path.display(), e);
                    process::exit(1);
                }
            };
            process_operations(&machine, BufReader::new(file))
        }
        None => process_operations(&machine, DEMO_OPERATIONS.as_bytes()),
    };
    let summary = match summary {
        Ok(summary) => summary,
        Err(e) => {
            error!("Error processing operations: {}", e);
            process::exit(1);
        }
    };
    info!(
        committed = summary.committed,
        rejected = summary.rejected,
        skipped = summary.skipped,
        journaled = summary.journaled,
        balance = machine.balance(),
        "final balance"
    );

    if let Err(e) = write_inventory(&machine, std::io::stdout()) {
        error!("Error writing output: {}", e);
        process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Raw CSV record matching the input format.
///
/// Fields: `type, amount, notes`
#[derive(Debug, Deserialize)]
struct CsvRecord {
    #[serde(rename = "type")]
    op_type: String,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    amount: Option<i64>,
    #[serde(default)]
    notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Operation {
    Withdrawal(i64),
    Deposit(NoteBundle),
}

impl CsvRecord {
    /// Converts CSV record to an operation.
    ///
    /// Deposit notes are parsed here, so malformed bundles surface as
    /// [`CashError::InvalidArgument`].
    fn into_operation(self) -> Result<Operation, CashError> {
        match self.op_type.to_lowercase().as_str() {
            "withdrawal" => self
                .amount
                .map(Operation::Withdrawal)
                .ok_or_else(|| CashError::InvalidArgument("missing amount".into())),
            "deposit" => {
                let notes = self.notes.unwrap_or_default();
                Ok(Operation::Deposit(notes.parse()?))
            }
            other => Err(CashError::InvalidArgument(format!(
                "unknown operation '{other}'"
            ))),
        }
    }
}

/// Counts of what happened to each row.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Summary {
    committed: usize,
    rejected: usize,
    skipped: usize,
    journaled: usize,
}

/// Applies operations from a CSV reader in order.
///
/// Rows that cannot be read or converted are skipped; operations the machine
/// rejects are logged and counted. Neither stops processing. Committed
/// operations are drained from the journal into the log whenever
/// [`JOURNAL_BATCH`] entries have accumulated, and once more at the end.
///
/// # CSV Format
///
/// Expected columns: `type, amount, notes`
/// - `type`: `withdrawal` or `deposit`
/// - `amount`: Integer amount (withdrawals only)
/// - `notes`: Note bundle such as `"10:2,5:1"` (deposits only)
///
/// # Errors
///
/// Returns a CSV error if the header cannot be read.
fn process_operations<R: Read>(machine: &CashMachine, reader: R) -> Result<Summary, csv::Error> {
    let mut rdr = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .has_headers(true)
        .from_reader(reader);
    rdr.headers()?;

    let mut summary = Summary::default();
    for (row, result) in rdr.deserialize::<CsvRecord>().enumerate() {
        let operation = match result
            .map_err(|e| e.to_string())
            .and_then(|record| record.into_operation().map_err(|e| e.to_string()))
        {
            Ok(operation) => operation,
            Err(e) => {
                warn!(row, "skipping malformed row: {}", e);
                summary.skipped += 1;
                continue;
            }
        };

        let outcome = match &operation {
            Operation::Withdrawal(amount) => machine.withdraw(*amount).map(|_| ()),
            Operation::Deposit(notes) => machine.deposit(notes),
        };
        match outcome {
            Ok(()) => summary.committed += 1,
            Err(e) => {
                warn!(row, retryable = e.is_retryable(), "rejected {:?}: {}", operation, e);
                summary.rejected += 1;
            }
        }
        if machine.journal().len() >= JOURNAL_BATCH {
            summary.journaled += flush_journal(machine);
        }
    }

    summary.journaled += flush_journal(machine);
    Ok(summary)
}

/// Drains the machine's journal into the log and returns the entry count.
fn flush_journal(machine: &CashMachine) -> usize {
    let entries = machine.journal().drain();
    for entry in &entries {
        debug!(
            sequence = entry.sequence,
            kind = ?entry.kind,
            delta = entry.delta(),
            notes = %entry.notes,
            "journal"
        );
    }
    entries.len()
}

#[derive(Debug, Serialize)]
struct InventoryRow {
    denomination: Denomination,
    count: u32,
}

/// Writes the current stock as CSV, largest denomination first.
///
/// # CSV Format
///
/// Columns: `denomination, count`
///
/// # Errors
///
/// Returns a CSV error if writing fails.
fn write_inventory<W: Write>(machine: &CashMachine, writer: W) -> Result<(), csv::Error> {
    let mut wtr = WriterBuilder::new().has_headers(false).from_writer(writer);
    wtr.write_record(["denomination", "count"])?;
    for (denomination, count) in machine.inventory_snapshot().iter() {
        wtr.serialize(InventoryRow {
            denomination,
            count,
        })?;
    }
    wtr.flush()?;
    Ok(())
}
