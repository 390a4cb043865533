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

//! Amount validation policies.
//!
//! An [`AmountPolicy`] rejects withdrawal amounts that can never be
//! dispensed, before any planning work happens.

use crate::CashError;
use crate::base::Denomination;

/// Rule set for validating requested withdrawal amounts.
pub trait AmountPolicy: Send + Sync {
    /// # Errors
    ///
    /// Returns [`CashError::InvalidAmount`] if `amount` is rejected.
    fn validate(&self, amount: i64) -> Result<(), CashError>;
}

fn smallest(denominations: &[Denomination]) -> Result<Denomination, CashError> {
    denominations
        .iter()
        .copied()
        .min()
        .ok_or_else(|| CashError::InvalidArgument("no denominations".into()))
}

fn check_multiple(amount: i64, smallest: Denomination) -> Result<(), CashError> {
    if amount <= 0 {
        return Err(CashError::InvalidAmount("amount must be positive".into()));
    }
    if amount % i64::from(smallest.value()) != 0 {
        return Err(CashError::InvalidAmount(format!(
            "amount must be multiple of {smallest}"
        )));
    }
    Ok(())
}

/// Accepts positive multiples of the smallest denomination known at setup.
#[derive(Debug, Clone, Copy)]
pub struct SmallestDenominationPolicy {
    smallest: Denomination,
}

impl SmallestDenominationPolicy {
    /// # Errors
    ///
    /// Returns [`CashError::InvalidArgument`] if `denominations` is empty.
    pub fn new<I>(denominations: I) -> Result<Self, CashError>
    where
        I: IntoIterator<Item = Denomination>,
    {
        let denominations: Vec<_> = denominations.into_iter().collect();
        Ok(Self {
            smallest: smallest(&denominations)?,
        })
    }

    pub fn smallest(&self) -> Denomination {
        self.smallest
    }
}

impl AmountPolicy for SmallestDenominationPolicy {
    fn validate(&self, amount: i64) -> Result<(), CashError> {
        check_multiple(amount, self.smallest)
    }
}

/// Like [`SmallestDenominationPolicy`], but setup also requires every
/// denomination to be a multiple of a fixed base unit (e.g. 10).
#[derive(Debug, Clone, Copy)]
pub struct BaseUnitPolicy {
    base_unit: u32,
    smallest: Denomination,
}

impl BaseUnitPolicy {
    /// # Errors
    ///
    /// Returns [`CashError::InvalidArgument`] if `denominations` is empty,
    /// `base_unit` is zero, or a denomination is not a multiple of
    /// `base_unit`.
    pub fn new<I>(denominations: I, base_unit: u32) -> Result<Self, CashError>
    where
        I: IntoIterator<Item = Denomination>,
    {
        if base_unit == 0 {
            return Err(CashError::InvalidArgument(
                "base unit must be positive".into(),
            ));
        }
        let denominations: Vec<_> = denominations.into_iter().collect();
        if let Some(bad) = denominations
            .iter()
            .find(|d| d.value() % base_unit != 0)
        {
            return Err(CashError::InvalidArgument(format!(
                "denomination {bad} is not a multiple of {base_unit}"
            )));
        }
        Ok(Self {
            base_unit,
            smallest: smallest(&denominations)?,
        })
    }

    pub fn base_unit(&self) -> u32 {
        self.base_unit
    }
}

impl AmountPolicy for BaseUnitPolicy {
    fn validate(&self, amount: i64) -> Result<(), CashError> {
        check_multiple(amount, self.smallest)
    }
}
