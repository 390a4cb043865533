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

//! Dispense planning.
//!
//! A [`DispensePlanner`] maps a requested amount and a read-only view of the
//! stock to the notes that should be handed out. Planners are pure: they
//! never touch the ledger, and the same inputs always give the same plan.
//!
//! Every returned plan totals exactly the requested amount and never uses
//! more notes of a denomination than the view holds. When no such selection
//! is found the planner returns `None`.
//!
//! - [`GreedyPlanner`] walks denominations largest first and takes as many
//!   notes of each as fit. It does not backtrack, so it can miss amounts a
//!   different mix would form.
//! - [`MinNotesPlanner`] searches for the selection with the fewest notes
//!   and finds those amounts too.

use crate::base::Denomination;
use crate::notes::NoteBundle;
use std::collections::{BTreeMap, VecDeque};

/// Notes proposed for a withdrawal, not yet committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispensePlan {
    notes: NoteBundle,
}

impl DispensePlan {
    pub fn new(notes: NoteBundle) -> Self {
        Self { notes }
    }

    pub fn notes(&self) -> &NoteBundle {
        &self.notes
    }

    pub fn into_notes(self) -> NoteBundle {
        self.notes
    }

    /// Amount the plan dispenses.
    pub fn amount(&self) -> u64 {
        self.notes.total()
    }
}

/// Algorithm producing a plan for an amount from limited stock.
pub trait DispensePlanner: Send + Sync {
    /// Returns `None` for a non-positive amount or when no plan is found.
    fn plan(&self, amount: i64, available: &NoteBundle) -> Option<DispensePlan>;
}

/// Largest-denomination-first walk, taking
/// `min(remaining / denomination, available)` notes at each step.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyPlanner;

impl GreedyPlanner {
    pub fn new() -> Self {
        Self
    }
}

impl DispensePlanner for GreedyPlanner {
    fn plan(&self, amount: i64, available: &NoteBundle) -> Option<DispensePlan> {
        let amount = u64::try_from(amount).ok().filter(|a| *a > 0)?;
        greedy(amount, available).map(DispensePlan::new)
    }
}

fn greedy(amount: u64, available: &NoteBundle) -> Option<NoteBundle> {
    let mut remaining = amount;
    let mut used = BTreeMap::new();

    for (denomination, count) in available.iter() {
        if remaining == 0 {
            break;
        }
        let value = u64::from(denomination.value());
        let take = (remaining / value).min(u64::from(count));
        if take > 0 {
            // Bounded by `count`, so it fits.
            used.insert(denomination, take as u32);
            remaining -= take * value;
        }
    }

    (remaining == 0).then(|| NoteBundle::from(used))
}

const UNREACHABLE: u32 = u32::MAX;

/// Exact search for the selection with the fewest notes.
///
/// Runs a bounded-knapsack dynamic program over remainders, measured in
/// units of the gcd of the usable denominations. Among selections with the
/// same note count, the one using more of the larger denominations wins.
///
/// The table has one row per denomination and one column per unit. When the
/// amount needs more than `max_units` columns the planner falls back to the
/// greedy walk.
#[derive(Debug, Clone, Copy)]
pub struct MinNotesPlanner {
    max_units: usize,
}

impl MinNotesPlanner {
    pub const DEFAULT_MAX_UNITS: usize = 100_000;

    pub fn new() -> Self {
        Self::with_max_units(Self::DEFAULT_MAX_UNITS)
    }

    pub fn with_max_units(max_units: usize) -> Self {
        Self { max_units }
    }

    pub fn max_units(&self) -> usize {
        self.max_units
    }
}

impl Default for MinNotesPlanner {
    fn default() -> Self {
        Self::new()
    }
}

impl DispensePlanner for MinNotesPlanner {
    fn plan(&self, amount: i64, available: &NoteBundle) -> Option<DispensePlan> {
        let amount = u64::try_from(amount).ok().filter(|a| *a > 0)?;

        // Ascending, and only denominations that can take part at all.
        let stock: Vec<(Denomination, u64)> = available
            .as_map()
            .iter()
            .map(|(d, c)| (*d, u64::from(*c)))
            .filter(|(d, _)| u64::from(d.value()) <= amount)
            .collect();
        let unit = stock
            .iter()
            .map(|(d, _)| u64::from(d.value()))
            .reduce(gcd)?;
        if amount % unit != 0 {
            return None;
        }

        let units = match usize::try_from(amount / unit) {
            Ok(units) if units <= self.max_units => units,
            _ => return greedy(amount, available).map(DispensePlan::new),
        };

        let items: Vec<(Denomination, usize, usize)> = stock
            .iter()
            .map(|(d, c)| {
                // Both bounded by `units` once scaled.
                let value = (u64::from(d.value()) / unit) as usize;
                let count = (*c).min((units / value) as u64) as usize;
                (*d, value, count)
            })
            .collect();

        min_notes(units, &items).map(|notes| DispensePlan::new(NoteBundle::from(notes)))
    }
}

fn gcd(a: u64, b: u64) -> u64 {
    if b == 0 { a } else { gcd(b, a % b) }
}

/// `items` holds `(denomination, scaled value, usable count)` in ascending
/// order.
fn min_notes(
    units: usize,
    items: &[(Denomination, usize, usize)],
) -> Option<BTreeMap<Denomination, u32>> {
    let mut base = vec![UNREACHABLE; units + 1];
    base[0] = 0;
    let mut layers = Vec::with_capacity(items.len() + 1);
    layers.push(base);
    for &(_, value, count) in items {
        let next = relax(&layers[layers.len() - 1], value, count);
        layers.push(next);
    }
    if layers[items.len()][units] == UNREACHABLE {
        return None;
    }

    // Walk back from the largest denomination, taking as many as still
    // reaches the optimum.
    let mut remaining = units;
    let mut used = BTreeMap::new();
    for (i, &(denomination, value, count)) in items.iter().enumerate().rev() {
        let target = layers[i + 1][remaining] as usize;
        let prev = &layers[i];
        let take = (0..=count.min(remaining / value)).rev().find(|&k| {
            let before = prev[remaining - k * value];
            before != UNREACHABLE && before as usize + k == target
        })?;
        if take > 0 {
            used.insert(denomination, take as u32);
        }
        remaining -= take * value;
    }
    debug_assert_eq!(remaining, 0);
    Some(used)
}

/// One bounded-knapsack layer: `cur[v] = min over k ≤ count of
/// prev[v - k·value] + k`, computed per residue class with a monotone
/// window.
fn relax(prev: &[u32], value: usize, count: usize) -> Vec<u32> {
    let units = prev.len() - 1;
    let mut cur = vec![UNREACHABLE; prev.len()];
    let mut window: VecDeque<(usize, i64)> = VecDeque::new();

    for residue in 0..value.min(prev.len()) {
        window.clear();
        for (step, v) in (residue..=units).step_by(value).enumerate() {
            if prev[v] != UNREACHABLE {
                let key = i64::from(prev[v]) - step as i64;
                while window.back().is_some_and(|&(_, k)| k >= key) {
                    window.pop_back();
                }
                window.push_back((step, key));
            }
            while window.front().is_some_and(|&(s, _)| s + count < step) {
                window.pop_front();
            }
            if let Some(&(_, key)) = window.front() {
                cur[v] = (key + step as i64) as u32;
            }
        }
    }
    cur
}
