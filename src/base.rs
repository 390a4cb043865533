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

//! Core value types for note denominations.

use crate::CashError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Face value of a note.
///
/// Always strictly positive; use [`Denomination::new`] to construct one from
/// untrusted input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Denomination(u32);

impl Denomination {
    /// Creates a denomination, rejecting zero.
    ///
    /// # Errors
    ///
    /// Returns [`CashError::InvalidArgument`] if `value` is zero.
    pub fn new(value: u32) -> Result<Self, CashError> {
        if value == 0 {
            return Err(CashError::InvalidArgument(format!(
                "invalid denomination: {value}"
            )));
        }
        Ok(Self(value))
    }

    pub fn value(self) -> u32 {
        self.0
    }

    /// Value of `count` notes of this denomination.
    pub fn times(self, count: u32) -> u64 {
        u64::from(self.0) * u64::from(count)
    }
}

impl TryFrom<u32> for Denomination {
    type Error = CashError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Denomination> for u32 {
    fn from(denomination: Denomination) -> Self {
        denomination.0
    }
}

impl fmt::Display for Denomination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
