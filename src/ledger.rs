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

//! Note inventory.
//!
//! The [`Ledger`] holds the stock of notes available for dispensing. Every
//! operation takes the same lock for its whole duration, so each call is
//! atomic and linearizable with respect to every other call on the same
//! ledger. Sequences of calls are not: a snapshot can be outdated by the
//! time a removal planned from it is applied, and [`Ledger::remove`] is the
//! place where that is detected.
//!
//! # Example
//!
//! ```
//! use cash_ledger_rs::{Ledger, NoteBundle};
//!
//! let ledger = Ledger::new("50:2,20:1".parse().unwrap());
//! assert_eq!(ledger.balance(), 120);
//!
//! ledger.add(&"10:3".parse().unwrap()).unwrap();
//! ledger.remove(&"50:1,10:1".parse().unwrap()).unwrap();
//! assert_eq!(ledger.balance(), 90);
//! ```

use crate::CashError;
use crate::base::Denomination;
use crate::notes::NoteBundle;
use parking_lot::Mutex;
use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug)]
struct LedgerData {
    /// Stocked notes; denominations whose count reaches zero are dropped.
    notes: BTreeMap<Denomination, u32>,
    /// Cached `Σ(denomination × count)`.
    balance: u64,
}

impl LedgerData {
    fn new(initial: NoteBundle) -> Self {
        let balance = initial.total();
        Self {
            notes: initial.into_map(),
            balance,
        }
    }

    fn assert_invariants(&self) {
        debug_assert!(
            self.notes.values().all(|count| *count > 0),
            "Invariant violated: zero-count denomination retained"
        );
        debug_assert_eq!(
            self.balance,
            self.notes.iter().map(|(d, c)| d.times(*c)).sum::<u64>(),
            "Invariant violated: cached balance diverged from stock"
        );
    }

    fn available(&self, denomination: Denomination) -> u32 {
        self.notes.get(&denomination).copied().unwrap_or(0)
    }

    /// Merges `deposit` into stock. Nothing is applied if any count would
    /// overflow.
    fn add(&mut self, deposit: &NoteBundle) -> Result<(), CashError> {
        for (denomination, count) in deposit.iter() {
            if self.available(denomination).checked_add(count).is_none() {
                return Err(CashError::InvalidArgument(format!(
                    "deposit overflows stock of {denomination} notes"
                )));
            }
        }
        let added = deposit.total();
        let balance = self.balance.checked_add(added).ok_or_else(|| {
            CashError::InvalidArgument("deposit overflows ledger balance".into())
        })?;

        for (denomination, count) in deposit.iter() {
            *self.notes.entry(denomination).or_default() += count;
        }
        self.balance = balance;
        self.assert_invariants();
        Ok(())
    }

    /// Removes `take` from stock, all or nothing.
    fn remove(&mut self, take: &NoteBundle) -> Result<(), CashError> {
        for (denomination, requested) in take.iter() {
            let available = self.available(denomination);
            if requested > available {
                return Err(CashError::InsufficientStock {
                    denomination,
                    requested,
                    available,
                });
            }
        }

        for (denomination, requested) in take.iter() {
            if let Some(count) = self.notes.get_mut(&denomination) {
                *count -= requested;
                if *count == 0 {
                    self.notes.remove(&denomination);
                }
            }
        }
        self.balance -= take.total();
        self.assert_invariants();
        Ok(())
    }
}

/// Thread-safe stock of notes keyed by denomination.
#[derive(Debug)]
pub struct Ledger {
    inner: Mutex<LedgerData>,
}

impl Ledger {
    /// Creates a ledger holding `initial`.
    ///
    /// The bundle type already guarantees positive denominations and
    /// non-negative counts.
    pub fn new(initial: NoteBundle) -> Self {
        Self {
            inner: Mutex::new(LedgerData::new(initial)),
        }
    }

    /// Returns an independent copy of the current stock.
    pub fn snapshot(&self) -> NoteBundle {
        NoteBundle::from(self.inner.lock().notes.clone())
    }

    /// Adds every note in `deposit` to stock in one step.
    ///
    /// # Errors
    ///
    /// Returns [`CashError::InvalidArgument`] if a count or the balance would
    /// overflow; the ledger is left unchanged.
    pub fn add(&self, deposit: &NoteBundle) -> Result<(), CashError> {
        self.inner.lock().add(deposit)
    }

    /// Removes every note in `take` in one step, or nothing at all.
    ///
    /// # Errors
    ///
    /// Returns [`CashError::InsufficientStock`] naming the first denomination
    /// (largest first) whose stock is below the requested count.
    pub fn remove(&self, take: &NoteBundle) -> Result<(), CashError> {
        self.inner.lock().remove(take)
    }

    /// Currently stocked denominations.
    pub fn denominations(&self) -> BTreeSet<Denomination> {
        self.inner.lock().notes.keys().copied().collect()
    }

    pub fn balance(&self) -> u64 {
        self.inner.lock().balance
    }
}

impl Serialize for Ledger {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // Copy out first so serialization happens without the lock held.
        let (balance, notes) = {
            let data = self.inner.lock();
            (data.balance, NoteBundle::from(data.notes.clone()))
        };
        let mut state = serializer.serialize_struct("Ledger", 2)?;
        state.serialize_field("balance", &balance)?;
        state.serialize_field("notes", &notes)?;
        state.end()
    }
}
