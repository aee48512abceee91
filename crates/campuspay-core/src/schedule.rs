//! # Term Schedule & Due/Status Calculators
//!
//! The fee-schedule strategy and the pure arithmetic the reconciliation
//! engine runs on every payment.
//!
//! ## Schedule Shapes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  STANDARD (4 terms, equal weight, abacus add-on on TERM_2)          │
//! │                                                                     │
//! │   TERM_1      TERM_2          TERM_3      TERM_4                    │
//! │   termFees    termFees        termFees    termFees                  │
//! │               + abacusFees                                          │
//! │                                                                     │
//! │  PRE_KG (2 terms, total split evenly, no add-on)                    │
//! │                                                                     │
//! │   TERM_1      TERM_2                                                │
//! │   total/2     total/2                                               │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The shape is data, not control flow: a new grade tier means a new
//! [`TermSchedule`] constructor, never another branch in the calculators.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{FeeStructure, GradeTier, Term};

// =============================================================================
// Term Schedule
// =============================================================================

/// One slot of a schedule: a term and its weight in the year's total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermSlot {
    pub term: Term,
    /// Relative weight; the effective fraction is weight / sum-of-weights.
    pub weight: u32,
}

/// Per-grade-tier fee schedule: ordered term slots plus the slot (if any)
/// that carries the abacus add-on fee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermSchedule {
    slots: Vec<TermSlot>,
    addon_slot: Option<usize>,
    total_weight: u32,
}

impl TermSchedule {
    fn new(slots: Vec<TermSlot>, addon_slot: Option<usize>) -> Self {
        let total_weight = slots.iter().map(|s| s.weight).sum();
        TermSchedule {
            slots,
            addon_slot,
            total_weight,
        }
    }

    /// The standard four-term schedule. Equal shares; the abacus add-on
    /// fee, when present in the catalog entry, is charged on TERM_2.
    pub fn standard() -> Self {
        TermSchedule::new(
            Term::ALL.iter().map(|&term| TermSlot { term, weight: 1 }).collect(),
            Some(Term::Term2.index()),
        )
    }

    /// The preKG two-term schedule: the total fee splits evenly across
    /// TERM_1 and TERM_2, with no abacus component.
    pub fn pre_kg() -> Self {
        TermSchedule::new(
            vec![
                TermSlot { term: Term::Term1, weight: 1 },
                TermSlot { term: Term::Term2, weight: 1 },
            ],
            None,
        )
    }

    /// Schedule for a grade tier.
    pub fn for_tier(tier: GradeTier) -> Self {
        match tier {
            GradeTier::Standard => TermSchedule::standard(),
            GradeTier::PreKg => TermSchedule::pre_kg(),
        }
    }

    /// Number of terms in the schedule.
    pub fn term_count(&self) -> usize {
        self.slots.len()
    }

    /// Terms in schedule order.
    pub fn terms(&self) -> impl Iterator<Item = Term> + '_ {
        self.slots.iter().map(|s| s.term)
    }

    /// Whether the given term is part of this schedule.
    pub fn includes(&self, term: Term) -> bool {
        self.slots.iter().any(|s| s.term == term)
    }

    /// Whether the given term carries the abacus add-on fee.
    pub fn carries_addon(&self, term: Term) -> bool {
        self.addon_slot
            .map(|i| self.slots[i].term == term)
            .unwrap_or(false)
    }

    /// Cumulative expected amount through slot `upto` (inclusive), as an
    /// exact integer fraction of `total`.
    ///
    /// Accumulating cumulative fractions (1/4, 2/4, ...) instead of summing
    /// per-term shares keeps the final threshold exactly equal to `total`.
    fn cumulative_expected(&self, total: Money, upto: usize) -> Money {
        let cum_weight: u32 = self.slots[..=upto].iter().map(|s| s.weight).sum();
        total.mul_frac(cum_weight, self.total_weight)
    }
}

// =============================================================================
// Term Status
// =============================================================================

/// Human-facing payment progress across a grade's full schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "termsPaid", rename_all = "camelCase")]
pub enum TermStatus {
    NotPaid,
    TermsPaid(u8),
    FullyPaid,
}

impl TermStatus {
    /// Number of term shares covered.
    pub fn terms_paid(&self, schedule: &TermSchedule) -> u8 {
        match self {
            TermStatus::NotPaid => 0,
            TermStatus::TermsPaid(n) => *n,
            TermStatus::FullyPaid => schedule.term_count() as u8,
        }
    }
}

impl std::fmt::Display for TermStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TermStatus::NotPaid => f.write_str("Not Paid"),
            TermStatus::TermsPaid(n) => write!(f, "{} Term(s) Paid", n),
            TermStatus::FullyPaid => f.write_str("Fully Paid"),
        }
    }
}

// =============================================================================
// Calculators
// =============================================================================

/// Expected fee for a catalog entry's term: the base term fee, plus the
/// abacus add-on only when the schedule designates this term as the
/// add-on slot.
pub fn expected_for_term(structure: &FeeStructure, schedule: &TermSchedule) -> CoreResult<Money> {
    if !schedule.includes(structure.term) {
        return Err(CoreError::TermOutsideSchedule {
            term: structure.term,
            schedule_len: schedule.term_count(),
        });
    }

    let base = Money::from_paise(structure.term_fees_paise);
    if schedule.carries_addon(structure.term) {
        Ok(base + Money::from_paise(structure.abacus_fees_paise))
    } else {
        Ok(base)
    }
}

/// Outstanding balance for a ledger row.
///
/// Fines increase what is still owed; discounts and payments decrease it.
/// The raw (possibly negative) value is returned; callers that display the
/// balance floor it at zero themselves.
pub fn due_amount(expected: Money, paid: Money, discount: Money, fine: Money) -> Money {
    expected - paid - discount + fine
}

/// The overpayment guard: fails when the combined incoming amount
/// (payment + discount + fine deltas) exceeds the outstanding due.
///
/// Never clamps - both figures travel in the error so the caller can
/// correct the request.
pub fn check_overpayment(term: Term, due: Money, incoming: Money) -> CoreResult<()> {
    if incoming > due {
        return Err(CoreError::Overpayment {
            term,
            due,
            attempted: incoming,
        });
    }
    Ok(())
}

/// Classifies payment progress across the grade's full schedule.
///
/// Accumulates each term's cumulative expected share of `total_fee` and
/// counts how many shares the combined paid + abacus amount covers.
///
/// Edge case: `due == 0` forces `FullyPaid` regardless of the accumulation
/// result, guarding against rounding mismatch between the share thresholds
/// and the actual per-term catalog amounts.
pub fn term_status(
    paid: Money,
    abacus: Money,
    total_fee: Money,
    due: Money,
    schedule: &TermSchedule,
) -> TermStatus {
    if due.is_zero() {
        return TermStatus::FullyPaid;
    }

    let covered = paid + abacus;
    let mut terms_paid: u8 = 0;
    for i in 0..schedule.term_count() {
        let threshold = schedule.cumulative_expected(total_fee, i);
        if threshold.is_positive() && covered >= threshold {
            terms_paid += 1;
        }
    }

    if terms_paid == 0 {
        TermStatus::NotPaid
    } else if terms_paid as usize >= schedule.term_count() {
        TermStatus::FullyPaid
    } else {
        TermStatus::TermsPaid(terms_paid)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
