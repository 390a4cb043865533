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

//! Withdrawal and deposit orchestration.
//!
//! The [`CashMachine`] composes a [`Ledger`], an [`AmountPolicy`] and a
//! [`DispensePlanner`]. A withdrawal runs through four steps:
//!
//! 1. **Validate** the amount against the policy.
//! 2. **Check** the aggregate balance covers it.
//! 3. **Plan** the notes against a snapshot of the stock.
//! 4. **Commit** the plan with an all-or-nothing [`Ledger::remove`].
//!
//! Steps 3 and 4 are separate critical sections. Another thread may change
//! the stock in between; the commit then fails as a whole and the caller
//! receives a retryable [`Unavailable::Stale`] error instead of a partial
//! withdrawal.

use crate::error::Unavailable;
use crate::journal::{EntryKind, Journal};
use crate::ledger::Ledger;
use crate::notes::NoteBundle;
use crate::planner::DispensePlanner;
use crate::policy::AmountPolicy;
use crate::{CashError, Denomination};
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

pub type PlannerBox = Box<dyn DispensePlanner>;
pub type PolicyBox = Box<dyn AmountPolicy>;

/// Public entry point for dispensing and accepting notes.
///
/// # Invariants
///
/// - The ledger never holds a negative count of any denomination.
/// - Balance always equals initial balance + deposits − committed withdrawals.
/// - A failed withdrawal leaves the ledger untouched.
/// - Ledger-level [`CashError::InsufficientStock`] is never returned.
pub struct CashMachine {
    ledger: Ledger,
    planner: PlannerBox,
    policy: PolicyBox,
    journal: Journal,
}

/// True if `plan` uses no more notes of any denomination than `stock` holds.
fn fits(plan: &NoteBundle, stock: &NoteBundle) -> bool {
    plan.iter().all(|(denomination, count)| count <= stock.get(denomination))
}

impl CashMachine {
    pub fn new(ledger: Ledger, planner: PlannerBox, policy: PolicyBox) -> Self {
        CashMachine {
            ledger,
            planner,
            policy,
            journal: Journal::new(),
        }
    }

    /// Dispenses exactly `amount`, returning the notes handed out.
    ///
    /// # Errors
    ///
    /// - [`CashError::InvalidAmount`] - Rejected by the amount policy.
    /// - [`CashError::InsufficientFunds`] - Balance is below `amount`.
    /// - [`CashError::UnavailableDenominations`] - No plan could be formed,
    ///   or the stock changed before the plan was committed (retryable).
    pub fn withdraw(&self, amount: i64) -> Result<NoteBundle, CashError> {
        self.policy.validate(amount)?;
        let requested = u64::try_from(amount)
            .ok()
            .filter(|requested| *requested > 0)
            .ok_or_else(|| CashError::InvalidAmount("amount must be positive".into()))?;

        let balance = self.ledger.balance();
        if balance < requested {
            return Err(CashError::InsufficientFunds { requested, balance });
        }

        let snapshot = self.ledger.snapshot();
        let plan = self
            .planner
            .plan(amount, &snapshot)
            .filter(|plan| plan.amount() == requested && fits(plan.notes(), &snapshot))
            .ok_or(CashError::UnavailableDenominations(
                Unavailable::NoCombination { amount: requested },
            ))?;
        debug!(amount = requested, plan = %plan.notes(), "planned withdrawal");

        match self.ledger.remove(plan.notes()) {
            Ok(()) => {}
            Err(CashError::InsufficientStock {
                denomination,
                requested: wanted,
                available,
            }) => {
                warn!(
                    amount = requested,
                    %denomination,
                    wanted,
                    available,
                    "stock changed before commit"
                );
                return Err(CashError::UnavailableDenominations(Unavailable::Stale));
            }
            Err(e) => return Err(e),
        }

        let notes = plan.into_notes();
        let sequence = self.journal.record(EntryKind::Withdrawal, notes.clone());
        info!(sequence, amount = requested, notes = %notes, "dispensed");
        Ok(notes)
    }

    /// Accepts `notes` into stock.
    ///
    /// # Errors
    ///
    /// [`CashError::InvalidArgument`] if the deposit would overflow a count
    /// or the balance.
    pub fn deposit(&self, notes: &NoteBundle) -> Result<(), CashError> {
        if notes.is_empty() {
            return Ok(());
        }
        self.ledger.add(notes)?;
        let sequence = self.journal.record(EntryKind::Deposit, notes.clone());
        info!(sequence, amount = notes.total(), notes = %notes, "deposited");
        Ok(())
    }

    pub fn balance(&self) -> u64 {
        self.ledger.balance()
    }

    /// Independent copy of the current stock.
    pub fn inventory_snapshot(&self) -> NoteBundle {
        self.ledger.snapshot()
    }

    pub fn denominations(&self) -> BTreeSet<Denomination> {
        self.ledger.denominations()
    }

    /// Committed operations so far.
    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    /// Read-only access to the stock, e.g. for reporting.
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }
}
