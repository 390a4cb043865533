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

//! Machine setup.
//!
//! [`MachineConfig`] selects the initial stock, the planner and the amount
//! policy, and builds a ready [`CashMachine`] from them.
//!
//! # Example
//!
//! ```
//! use cash_ledger_rs::{MachineConfig, PlannerKind, PolicyKind};
//!
//! let machine = MachineConfig {
//!     stock: "50:2,20:3,10:5,5:10".parse().unwrap(),
//!     planner: PlannerKind::Greedy,
//!     policy: PolicyKind::SmallestDenomination,
//! }
//! .build()
//! .unwrap();
//! assert_eq!(machine.balance(), 260);
//! ```

use crate::CashError;
use crate::ledger::Ledger;
use crate::machine::{CashMachine, PlannerBox, PolicyBox};
use crate::notes::NoteBundle;
use crate::planner::{GreedyPlanner, MinNotesPlanner};
use crate::policy::{BaseUnitPolicy, SmallestDenominationPolicy};
use serde::{Deserialize, Serialize};

/// Which [`DispensePlanner`](crate::DispensePlanner) to install.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum PlannerKind {
    /// Largest denomination first, no backtracking
    #[default]
    Greedy,
    /// Exact search for the fewest notes
    MinNotes,
}

impl PlannerKind {
    pub fn build(self) -> PlannerBox {
        match self {
            Self::Greedy => Box::new(GreedyPlanner::new()),
            Self::MinNotes => Box::new(MinNotesPlanner::new()),
        }
    }
}

/// Which [`AmountPolicy`](crate::AmountPolicy) to install.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PolicyKind {
    #[default]
    SmallestDenomination,
    BaseUnit { base_unit: u32 },
}

#[derive(Debug, Clone, Deserialize)]
pub struct MachineConfig {
    #[serde(deserialize_with = "deserialize_stock")]
    pub stock: NoteBundle,
    #[serde(default)]
    pub planner: PlannerKind,
    #[serde(default)]
    pub policy: PolicyKind,
}

fn deserialize_stock<'de, D>(deserializer: D) -> Result<NoteBundle, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    raw.parse().map_err(serde::de::Error::custom)
}

impl MachineConfig {
    /// Builds the machine. The policy is derived from the denominations of
    /// the initial stock.
    ///
    /// # Errors
    ///
    /// [`CashError::InvalidArgument`] if the stock is empty or the policy
    /// rejects its denominations.
    pub fn build(self) -> Result<CashMachine, CashError> {
        let ledger = Ledger::new(self.stock);
        let denominations = ledger.denominations();
        let policy: PolicyBox = match self.policy {
            PolicyKind::SmallestDenomination => {
                Box::new(SmallestDenominationPolicy::new(denominations)?)
            }
            PolicyKind::BaseUnit { base_unit } => {
                Box::new(BaseUnitPolicy::new(denominations, base_unit)?)
            }
        };
        Ok(CashMachine::new(ledger, self.planner.build(), policy))
    }
}
