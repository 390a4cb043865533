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

//! Property-based tests for the cash ledger.
//!
//! These tests verify invariants that should hold for any stock and any
//! sequence of operations.

use cash_ledger_rs::{
    CashError, CashMachine, Denomination, DispensePlanner, GreedyPlanner, Ledger, MinNotesPlanner,
    NoteBundle, SmallestDenominationPolicy,
};
use proptest::prelude::*;
use std::collections::BTreeMap;

// =============================================================================
// Arbitrary Strategies
// =============================================================================

const DENOMINATIONS: [u32; 6] = [5, 10, 20, 50, 100, 200];

/// Generate a stock drawn from common note values.
fn arb_stock() -> impl Strategy<Value = NoteBundle> {
    prop::collection::vec(0u32..20, DENOMINATIONS.len()).prop_map(|counts| {
        NoteBundle::from_counts(DENOMINATIONS.iter().copied().zip(counts)).unwrap()
    })
}

/// Generate a stock over arbitrary small denominations.
fn arb_odd_stock() -> impl Strategy<Value = NoteBundle> {
    prop::collection::btree_map(1u32..40, 0u32..6, 1..5)
        .prop_map(|map| NoteBundle::from_counts(map).unwrap())
}

#[derive(Debug, Clone)]
enum Op {
    Deposit(NoteBundle),
    Withdraw(i64),
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        arb_stock().prop_map(Op::Deposit),
        (-50i64..600).prop_map(Op::Withdraw),
    ]
}

fn machine_for(stock: NoteBundle) -> CashMachine {
    let ledger = Ledger::new(stock);
    let policy = SmallestDenominationPolicy::new(
        DENOMINATIONS.iter().map(|v| Denomination::new(*v).unwrap()),
    )
    .unwrap();
    CashMachine::new(ledger, Box::new(GreedyPlanner::new()), Box::new(policy))
}

/// Exhaustive search for the fewest notes, for cross-checking.
fn brute_force_min_notes(amount: u64, stock: &[(u32, u32)]) -> Option<u64> {
    match stock.split_first() {
        None => (amount == 0).then_some(0),
        Some((&(value, count), rest)) => (0..=count)
            .take_while(|k| u64::from(*k) * u64::from(value) <= amount)
            .filter_map(|k| {
                brute_force_min_notes(amount - u64::from(k) * u64::from(value), rest)
                    .map(|notes| notes + u64::from(k))
            })
            .min(),
    }
}

fn within_stock(plan: &NoteBundle, available: &NoteBundle) -> bool {
    plan.iter().all(|(d, c)| c <= available.get(d))
}

// =============================================================================
// Conservation
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Balance equals initial + deposits - successful withdrawals.
    #[test]
    fn balance_is_conserved(
        stock in arb_stock(),
        ops in prop::collection::vec(arb_op(), 0..30),
    ) {
        let initial = stock.total();
        let machine = machine_for(stock);
        let mut expected = initial;

        for op in ops {
            match op {
                Op::Deposit(notes) => {
                    machine.deposit(&notes).unwrap();
                    expected += notes.total();
                }
                Op::Withdraw(amount) => {
                    if let Ok(notes) = machine.withdraw(amount) {
                        prop_assert_eq!(i64::try_from(notes.total()).unwrap(), amount);
                        expected -= notes.total();
                    }
                }
            }
            prop_assert_eq!(machine.balance(), expected);
            prop_assert_eq!(machine.inventory_snapshot().total(), expected);
        }
    }

    /// Ledger-level stock errors never escape the machine.
    #[test]
    fn machine_never_surfaces_insufficient_stock(
        stock in arb_stock(),
        amounts in prop::collection::vec(-50i64..2000, 1..20),
    ) {
        let machine = machine_for(stock);
        for amount in amounts {
            let result = machine.withdraw(amount);
            let is_stock_error = matches!(result, Err(CashError::InsufficientStock { .. }));
            prop_assert!(!is_stock_error);
        }
    }
}

// =============================================================================
// Ledger Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// A failed remove leaves the ledger exactly as it was.
    #[test]
    fn failed_remove_changes_nothing(
        stock in arb_stock(),
        take in arb_stock(),
    ) {
        let ledger = Ledger::new(stock);
        let before = ledger.snapshot();
        let balance = ledger.balance();

        match ledger.remove(&take) {
            Ok(()) => {
                prop_assert!(within_stock(&take, &before));
                prop_assert_eq!(ledger.balance(), balance - take.total());
            }
            Err(_) => {
                prop_assert!(!within_stock(&take, &before));
                prop_assert_eq!(ledger.snapshot(), before);
                prop_assert_eq!(ledger.balance(), balance);
            }
        }
    }

    /// Mutating a snapshot never reaches the ledger.
    #[test]
    fn snapshot_is_independent(stock in arb_stock(), bump in 1u32..100) {
        let ledger = Ledger::new(stock);
        let balance = ledger.balance();
        let mut copy: BTreeMap<Denomination, u32> = ledger.snapshot().into_map();
        for count in copy.values_mut() {
            *count += bump;
        }
        copy.insert(Denomination::new(7).unwrap(), bump);
        prop_assert_eq!(ledger.balance(), balance);
    }
}

// =============================================================================
// Planner Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    /// Plans are exact and stay within the stock they were computed from.
    #[test]
    fn plans_are_exact_and_within_stock(
        stock in arb_odd_stock(),
        amount in 1i64..300,
    ) {
        let greedy = GreedyPlanner::new();
        let min_notes = MinNotesPlanner::new();
        let planners: [&dyn DispensePlanner; 2] = [&greedy, &min_notes];
        for planner in planners {
            if let Some(plan) = planner.plan(amount, &stock) {
                prop_assert_eq!(i64::try_from(plan.amount()).unwrap(), amount);
                prop_assert!(within_stock(plan.notes(), &stock));
            }
        }
    }

    /// Greedy returns a plan exactly when its own walk leaves no remainder.
    #[test]
    fn greedy_no_plan_matches_walk(
        stock in arb_odd_stock(),
        amount in 1u64..300,
    ) {
        let mut remaining = amount;
        for (denomination, count) in stock.iter() {
            let value = u64::from(denomination.value());
            remaining -= (remaining / value).min(u64::from(count)) * value;
        }
        let plan = GreedyPlanner::new().plan(amount as i64, &stock);
        prop_assert_eq!(plan.is_some(), remaining == 0);
    }

    /// The minimal-note search agrees with exhaustive search.
    #[test]
    fn min_notes_is_optimal(
        stock in arb_odd_stock(),
        amount in 1u64..150,
    ) {
        let pairs: Vec<(u32, u32)> = stock.iter().map(|(d, c)| (d.value(), c)).collect();
        let expected = brute_force_min_notes(amount, &pairs);
        let plan = MinNotesPlanner::new().plan(amount as i64, &stock);
        prop_assert_eq!(plan.map(|p| p.notes().note_count()), expected);
    }

    /// Whenever greedy finds a plan, the minimal-note search does too and
    /// never uses more notes.
    #[test]
    fn min_notes_never_worse_than_greedy(
        stock in arb_stock(),
        amount in 1i64..1000,
    ) {
        if let Some(greedy) = GreedyPlanner::new().plan(amount, &stock) {
            let best = MinNotesPlanner::new().plan(amount, &stock);
            prop_assert!(best.is_some());
            prop_assert!(best.unwrap().notes().note_count() <= greedy.notes().note_count());
        }
    }

    /// Same inputs, same plan.
    #[test]
    fn planning_is_deterministic(stock in arb_odd_stock(), amount in 1i64..300) {
        prop_assert_eq!(
            GreedyPlanner::new().plan(amount, &stock),
            GreedyPlanner::new().plan(amount, &stock)
        );
        prop_assert_eq!(
            MinNotesPlanner::new().plan(amount, &stock),
            MinNotesPlanner::new().plan(amount, &stock)
        );
    }
}

// =============================================================================
// Validator Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    /// Non-positive amounts are always rejected.
    #[test]
    fn non_positive_amounts_rejected(stock in arb_stock(), amount in i64::MIN..=0) {
        let machine = machine_for(stock);
        prop_assert!(matches!(machine.withdraw(amount), Err(CashError::InvalidAmount(_))));
    }

    /// Off-grid amounts are always rejected; on-grid amounts get past the
    /// policy.
    #[test]
    fn multiples_of_smallest_pass_validation(stock in arb_stock(), amount in 1i64..5000) {
        let machine = machine_for(stock);
        let result = machine.withdraw(amount);
        if amount % 5 == 0 {
            let is_invalid = matches!(result, Err(CashError::InvalidAmount(_)));
            prop_assert!(!is_invalid);
        } else {
            let is_invalid = matches!(result, Err(CashError::InvalidAmount(_)));
            prop_assert!(is_invalid);
        }
    }
}
