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

//! Error types for cash ledger operations.

use crate::base::Denomination;
use std::fmt;
use thiserror::Error;

/// Why no notes could be dispensed although aggregate funds were sufficient.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unavailable {
    /// No combination of stocked notes forms the amount.
    NoCombination { amount: u64 },
    /// Stock changed between planning and commit; a fresh attempt may succeed.
    Stale,
}

impl fmt::Display for Unavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCombination { amount } => {
                write!(f, "cannot form {amount} with available notes")
            }
            Self::Stale => write!(f, "inventory changed; please try again"),
        }
    }
}

/// Cash ledger errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CashError {
    /// Malformed construction input (denomination, count, empty set)
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Requested amount is not positive or not dispensable in whole notes
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// Aggregate stock is below the requested amount
    #[error("insufficient funds: requested {requested}, balance {balance}")]
    InsufficientFunds { requested: u64, balance: u64 },

    /// Funds are sufficient but the note mix is not
    #[error("unavailable denominations: {0}")]
    UnavailableDenominations(Unavailable),

    /// Ledger holds fewer notes of one denomination than requested
    #[error("not enough {denomination} notes: requested {requested}, available {available}")]
    InsufficientStock {
        denomination: Denomination,
        requested: u32,
        available: u32,
    },
}

impl CashError {
    /// True when repeating the same request may succeed without any change
    /// on the caller's side.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::UnavailableDenominations(Unavailable::Stale))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        assert_eq!(
            CashError::InvalidArgument("invalid denomination: 0".into()).to_string(),
            "invalid argument: invalid denomination: 0"
        );
        assert_eq!(
            CashError::InvalidAmount("amount must be positive".into()).to_string(),
            "invalid amount: amount must be positive"
        );
        assert_eq!(
            CashError::InsufficientFunds {
                requested: 1000,
                balance: 260
            }
            .to_string(),
            "insufficient funds: requested 1000, balance 260"
        );
        assert_eq!(
            CashError::UnavailableDenominations(Unavailable::NoCombination { amount: 40 })
                .to_string(),
            "unavailable denominations: cannot form 40 with available notes"
        );
        assert_eq!(
            CashError::UnavailableDenominations(Unavailable::Stale).to_string(),
            "unavailable denominations: inventory changed; please try again"
        );
        assert_eq!(
            CashError::InsufficientStock {
                denomination: Denomination::new(20).unwrap(),
                requested: 2,
                available: 1,
            }
            .to_string(),
            "not enough 20 notes: requested 2, available 1"
        );
    }

    #[test]
    fn only_stale_plans_are_retryable() {
        assert!(CashError::UnavailableDenominations(Unavailable::Stale).is_retryable());
        assert!(
            !CashError::UnavailableDenominations(Unavailable::NoCombination { amount: 40 })
                .is_retryable()
        );
        assert!(
            !CashError::InsufficientFunds {
                requested: 1,
                balance: 0
            }
            .is_retryable()
        );
        assert!(!CashError::InvalidAmount("x".into()).is_retryable());
    }

    #[test]
    fn errors_are_cloneable() {
        let error = CashError::UnavailableDenominations(Unavailable::Stale);
        let cloned = error.clone();
        assert_eq!(error, cloned);
    }
}
