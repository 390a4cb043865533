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

//! # Cash Ledger
//!
//! This library models a cash-dispensing ledger: a bounded stock of notes
//! that can be deposited into, withdrawn from and queried for balance from
//! many threads at once.
//!
//! ## Core Components
//!
//! - [`Ledger`]: Thread-safe note inventory keyed by denomination
//! - [`AmountPolicy`]: Rejects amounts that can never be dispensed
//! - [`DispensePlanner`]: Chooses the notes for an amount ([`GreedyPlanner`], [`MinNotesPlanner`])
//! - [`CashMachine`]: Validates, plans and atomically commits withdrawals
//! - [`CashError`]: Error types for rejected operations
//!
//! ## Example
//!
//! ```
//! use cash_ledger_rs::{CashMachine, GreedyPlanner, Ledger, NoteBundle, SmallestDenominationPolicy};
//!
//! let ledger = Ledger::new("50:2,20:3,10:5,5:10".parse().unwrap());
//! let policy = SmallestDenominationPolicy::new(ledger.denominations()).unwrap();
//! let machine = CashMachine::new(ledger, Box::new(GreedyPlanner::new()), Box::new(policy));
//!
//! // Withdraw
//! let notes = machine.withdraw(130).unwrap();
//! assert_eq!(notes.total(), 130);
//! assert_eq!(machine.balance(), 130);
//!
//! // Deposit
//! machine.deposit(&"10:2,5:1".parse::<NoteBundle>().unwrap()).unwrap();
//! assert_eq!(machine.balance(), 155);
//! ```
//!
//! ## Thread Safety
//!
//! Every ledger operation runs under a single lock. A withdrawal plans
//! against a snapshot and commits with an all-or-nothing removal; if the
//! stock moved in between, the withdrawal fails with a retryable error and
//! nothing is taken.

mod base;
pub mod config;
pub mod error;
pub mod journal;
pub mod ledger;
mod machine;
mod notes;
pub mod planner;
pub mod policy;

pub use base::Denomination;
pub use config::{MachineConfig, PlannerKind, PolicyKind};
pub use error::{CashError, Unavailable};
pub use journal::{EntryKind, Journal, JournalEntry};
pub use ledger::Ledger;
pub use machine::{CashMachine, PlannerBox, PolicyBox};
pub use notes::NoteBundle;
pub use planner::{DispensePlan, DispensePlanner, GreedyPlanner, MinNotesPlanner};
pub use policy::{AmountPolicy, BaseUnitPolicy, SmallestDenominationPolicy};
