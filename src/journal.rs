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

//! Record of committed ledger operations.
//!
//! Provides a bounded journal of the most recent deposits and
//! withdrawals the machine has committed, plus running totals over every
//! operation ever recorded. When the journal is full the oldest entry is
//! evicted; the totals are unaffected.

use crate::notes::NoteBundle;
use crossbeam::queue::ArrayQueue;
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Entries kept before the oldest are evicted.
pub const DEFAULT_CAPACITY: usize = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Deposit,
    Withdrawal,
}

/// A committed operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JournalEntry {
    pub sequence: u64,
    pub kind: EntryKind,
    pub notes: NoteBundle,
}

impl JournalEntry {
    /// Signed effect on the ledger balance.
    pub fn delta(&self) -> i128 {
        let total = i128::from(self.notes.total());
        match self.kind {
            EntryKind::Deposit => total,
            EntryKind::Withdrawal => -total,
        }
    }
}

#[derive(Debug, Default)]
struct Totals {
    deposited: u128,
    withdrawn: u128,
}

/// Bounded journal safe for concurrent writers.
///
/// Sequence numbers are unique and increasing in append order. Appends from
/// different threads may land in the queue in a different order than their
/// ledger commits.
#[derive(Debug)]
pub struct Journal {
    entries: ArrayQueue<JournalEntry>,
    next_sequence: AtomicU64,
    evicted: AtomicU64,
    /// Running totals; unaffected by draining or eviction.
    totals: Mutex<Totals>,
}

impl Default for Journal {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl Journal {
    /// Creates an empty journal holding up to [`DEFAULT_CAPACITY`] entries.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty journal holding up to `capacity` entries (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: ArrayQueue::new(capacity.max(1)),
            next_sequence: AtomicU64::new(0),
            evicted: AtomicU64::new(0),
            totals: Mutex::new(Totals::default()),
        }
    }

    /// Appends a committed operation and returns its sequence number.
    ///
    /// Evicts the oldest entry if the journal is full.
    pub fn record(&self, kind: EntryKind, notes: NoteBundle) -> u64 {
        let sequence = self.next_sequence.fetch_add(1, Ordering::Relaxed);
        {
            let mut totals = self.totals.lock();
            let amount = u128::from(notes.total());
            match kind {
                EntryKind::Deposit => totals.deposited += amount,
                EntryKind::Withdrawal => totals.withdrawn += amount,
            }
        }
        let entry = JournalEntry {
            sequence,
            kind,
            notes,
        };
        if self.entries.force_push(entry).is_some() {
            self.evicted.fetch_add(1, Ordering::Relaxed);
        }
        sequence
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.entries.capacity()
    }

    /// Entries dropped because the journal was full.
    pub fn evicted(&self) -> u64 {
        self.evicted.load(Ordering::Relaxed)
    }

    /// Drains the journal, returning entries sorted by sequence number.
    pub fn drain(&self) -> Vec<JournalEntry> {
        let mut entries = Vec::with_capacity(self.entries.len());
        while let Some(entry) = self.entries.pop() {
            entries.push(entry);
        }
        entries.sort_by_key(|entry| entry.sequence);
        entries
    }

    /// Total value of all deposits ever recorded.
    pub fn deposited(&self) -> u128 {
        self.totals.lock().deposited
    }

    /// Total value of all withdrawals ever recorded.
    pub fn withdrawn(&self) -> u128 {
        self.totals.lock().withdrawn
    }

    /// Net balance change of everything recorded so far.
    pub fn net_delta(&self) -> i128 {
        let totals = self.totals.lock();
        let signed = |value: u128| i128::try_from(value).unwrap_or(i128::MAX);
        signed(totals.deposited) - signed(totals.withdrawn)
    }
}
