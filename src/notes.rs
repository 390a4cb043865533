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

//! Note bundles.
//!
//! A [`NoteBundle`] is an immutable mapping from [`Denomination`] to note
//! count. Zero counts are dropped on construction, so two bundles holding
//! the same notes always compare equal.
//!
//! # Example
//!
//! ```
//! use cash_ledger_rs::NoteBundle;
//!
//! let notes: NoteBundle = "50:2,20:3,5:1".parse().unwrap();
//! assert_eq!(notes.total(), 165);
//! assert_eq!(notes.to_string(), "50x2 20x3 5x1");
//! ```

use crate::CashError;
use crate::base::Denomination;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteBundle {
    notes: BTreeMap<Denomination, u32>,
}

impl NoteBundle {
    /// Creates an empty bundle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a bundle from raw `(denomination, count)` pairs.
    ///
    /// Repeated denominations are summed.
    ///
    /// # Errors
    ///
    /// Returns [`CashError::InvalidArgument`] for a zero denomination or if
    /// a summed count overflows.
    pub fn from_counts<I>(counts: I) -> Result<Self, CashError>
    where
        I: IntoIterator<Item = (u32, u32)>,
    {
        let mut notes = BTreeMap::new();
        for (value, count) in counts {
            let denomination = Denomination::new(value)?;
            let entry: &mut u32 = notes.entry(denomination).or_default();
            *entry = entry.checked_add(count).ok_or_else(|| {
                CashError::InvalidArgument(format!("count overflow for denomination {value}"))
            })?;
        }
        Ok(Self::from(notes))
    }

    /// Number of notes held for `denomination` (zero if absent).
    pub fn get(&self, denomination: Denomination) -> u32 {
        self.notes.get(&denomination).copied().unwrap_or(0)
    }

    /// Returns `Σ(denomination × count)`.
    pub fn total(&self) -> u64 {
        self.notes.iter().map(|(d, c)| d.times(*c)).sum()
    }

    /// Number of physical notes in the bundle.
    pub fn note_count(&self) -> u64 {
        self.notes.values().map(|c| u64::from(*c)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Entries in descending denomination order.
    pub fn iter(&self) -> impl Iterator<Item = (Denomination, u32)> + '_ {
        self.notes.iter().rev().map(|(d, c)| (*d, *c))
    }

    /// Denominations present, largest first.
    pub fn denominations(&self) -> impl Iterator<Item = Denomination> + '_ {
        self.notes.keys().rev().copied()
    }

    pub fn as_map(&self) -> &BTreeMap<Denomination, u32> {
        &self.notes
    }

    /// Consumes the bundle, yielding an independently owned map.
    pub fn into_map(self) -> BTreeMap<Denomination, u32> {
        self.notes
    }
}

impl From<BTreeMap<Denomination, u32>> for NoteBundle {
    fn from(mut notes: BTreeMap<Denomination, u32>) -> Self {
        notes.retain(|_, count| *count > 0);
        Self { notes }
    }
}

/// Parses `"50:2,20:3"`. Entries may be separated by commas, semicolons or
/// whitespace.
impl FromStr for NoteBundle {
    type Err = CashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut counts = Vec::new();
        for entry in s
            .split(|c: char| c == ',' || c == ';' || c.is_whitespace())
            .filter(|entry| !entry.is_empty())
        {
            let (value, count) = entry.split_once(':').ok_or_else(|| {
                CashError::InvalidArgument(format!("malformed note entry '{entry}'"))
            })?;
            let value: i64 = value.trim().parse().map_err(|_| {
                CashError::InvalidArgument(format!("malformed denomination in '{entry}'"))
            })?;
            let count: i64 = count.trim().parse().map_err(|_| {
                CashError::InvalidArgument(format!("malformed count in '{entry}'"))
            })?;
            if value <= 0 {
                return Err(CashError::InvalidArgument(format!(
                    "invalid denomination: {value}"
                )));
            }
            if count < 0 {
                return Err(CashError::InvalidArgument(format!(
                    "negative count for denomination {value}"
                )));
            }
            let value = u32::try_from(value).map_err(|_| {
                CashError::InvalidArgument(format!("denomination out of range: {value}"))
            })?;
            let count = u32::try_from(count).map_err(|_| {
                CashError::InvalidArgument(format!("count out of range for denomination {value}"))
            })?;
            counts.push((value, count));
        }
        Self::from_counts(counts)
    }
}

impl fmt::Display for NoteBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "(none)");
        }
        for (i, (denomination, count)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{denomination}x{count}")?;
        }
        Ok(())
    }
}

impl Serialize for NoteBundle {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.notes.len()))?;
        for (denomination, count) in self.iter() {
            map.serialize_entry(&denomination, &count)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(value: u32) -> Denomination {
        Denomination::new(value).unwrap()
    }

    #[test]
    fn total_sums_denomination_times_count() {
        let notes = NoteBundle::from_counts([(50, 2), (20, 3), (5, 1)]).unwrap();
        assert_eq!(notes.total(), 165);
        assert_eq!(notes.note_count(), 6);
    }

    #[test]
    fn zero_counts_are_equivalent_to_absent() {
        let with_zero = NoteBundle::from_counts([(10, 1), (5, 0)]).unwrap();
        let without = NoteBundle::from_counts([(10, 1)]).unwrap();
        assert_eq!(with_zero, without);
        assert_eq!(with_zero.get(d(5)), 0);
        assert_eq!(with_zero.total(), without.total());
    }

    #[test]
    fn zero_denomination_is_rejected() {
        assert!(matches!(
            NoteBundle::from_counts([(0, 1)]),
            Err(CashError::InvalidArgument(_))
        ));
    }

    #[test]
    fn repeated_denominations_are_summed() {
        let notes = NoteBundle::from_counts([(10, 1), (10, 2)]).unwrap();
        assert_eq!(notes.get(d(10)), 3);
    }

    #[test]
    fn count_overflow_is_rejected() {
        assert!(matches!(
            NoteBundle::from_counts([(10, u32::MAX), (10, 1)]),
            Err(CashError::InvalidArgument(_))
        ));
    }

    #[test]
    fn iterates_largest_first() {
        let notes = NoteBundle::from_counts([(5, 1), (50, 1), (20, 1)]).unwrap();
        let order: Vec<u32> = notes.denominations().map(Denomination::value).collect();
        assert_eq!(order, vec![50, 20, 5]);
    }

    #[test]
    fn parse_accepts_mixed_separators() {
        let notes: NoteBundle = "50:2; 20:3 10:5,5:10".parse().unwrap();
        assert_eq!(notes.total(), 260);
        assert_eq!(notes.get(d(10)), 5);
    }

    #[test]
    fn parse_empty_is_empty_bundle() {
        let notes: NoteBundle = "".parse().unwrap();
        assert!(notes.is_empty());
        assert_eq!(notes.to_string(), "(none)");
    }

    #[test]
    fn parse_rejects_negative_count() {
        let result: Result<NoteBundle, _> = "10:-1".parse();
        assert_eq!(
            result,
            Err(CashError::InvalidArgument(
                "negative count for denomination 10".into()
            ))
        );
    }

    #[test]
    fn parse_rejects_non_positive_denomination() {
        let result: Result<NoteBundle, _> = "-10:1".parse();
        assert_eq!(
            result,
            Err(CashError::InvalidArgument("invalid denomination: -10".into()))
        );
        let result: Result<NoteBundle, _> = "0:1".parse();
        assert!(matches!(result, Err(CashError::InvalidArgument(_))));
    }

    #[test]
    fn parse_rejects_garbage() {
        for input in ["10", "ten:1", "10:x", "10:99999999999"] {
            let result: Result<NoteBundle, _> = input.parse();
            assert!(
                matches!(result, Err(CashError::InvalidArgument(_))),
                "{input} should be rejected"
            );
        }
    }

    #[test]
    fn serializes_as_descending_map() {
        let notes = NoteBundle::from_counts([(10, 2), (50, 1)]).unwrap();
        let json = serde_json::to_string(&notes).unwrap();
        assert_eq!(json, r#"{"50":1,"10":2}"#);
    }

    #[test]
    fn into_map_is_independent() {
        let notes = NoteBundle::from_counts([(10, 2)]).unwrap();
        let mut map = notes.clone().into_map();
        map.insert(d(10), 999);
        assert_eq!(notes.get(d(10)), 2);
    }
}
