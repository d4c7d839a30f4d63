//! Landed-cost allocation
//!
//! Shared order-level charges (freight, insurance, other expenses) are
//! distributed across the lines of a draft in proportion to each line's gross
//! amount. The allocation basis is the sum over *all* lines, so a change to
//! any line or charge moves every line's share: [`allocate`] always
//! recomputes the whole collection.
//!
//! All arithmetic is carried out at full decimal precision. Rounding to cents
//! happens only in [`crate::snapshot`].

use serde::{Deserialize, Serialize};

use core_kernel::{Money, MoneyError};

use crate::error::DraftField;
use crate::line::LineItem;

/// The three shared charges of a draft
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChargeKind {
    Freight,
    Insurance,
    OtherExpenses,
}

impl ChargeKind {
    pub const ALL: [ChargeKind; 3] = [
        ChargeKind::Freight,
        ChargeKind::Insurance,
        ChargeKind::OtherExpenses,
    ];

    /// Draft field holding this charge
    pub fn field(&self) -> DraftField {
        match self {
            ChargeKind::Freight => DraftField::FreightAmount,
            ChargeKind::Insurance => DraftField::InsuranceAmount,
            ChargeKind::OtherExpenses => DraftField::OtherExpensesAmount,
        }
    }
}

/// Draft-level charge amounts; all default to zero
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargeSet {
    pub freight: Money,
    pub insurance: Money,
    pub other_expenses: Money,
}

impl ChargeSet {
    pub fn new(freight: Money, insurance: Money, other_expenses: Money) -> Self {
        Self {
            freight,
            insurance,
            other_expenses,
        }
    }

    /// Returns the amount of one charge
    pub fn get(&self, kind: ChargeKind) -> Money {
        match kind {
            ChargeKind::Freight => self.freight,
            ChargeKind::Insurance => self.insurance,
            ChargeKind::OtherExpenses => self.other_expenses,
        }
    }

    /// Returns a copy with one charge replaced
    pub fn with(mut self, kind: ChargeKind, amount: Money) -> Self {
        match kind {
            ChargeKind::Freight => self.freight = amount,
            ChargeKind::Insurance => self.insurance = amount,
            ChargeKind::OtherExpenses => self.other_expenses = amount,
        }
        self
    }

    /// Sum of all three charges
    ///
    /// # Errors
    ///
    /// `MoneyError::Overflow` if the sum leaves the decimal range.
    pub fn total(&self) -> Result<Money, MoneyError> {
        Money::checked_sum([self.freight, self.insurance, self.other_expenses])
    }
}

/// Derived per-line result of an allocation run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineAllocation {
    pub freight: Money,
    pub insurance: Money,
    pub other_expenses: Money,
    pub landed_total: Money,
    pub landed_unit_cost: Money,
}

impl LineAllocation {
    /// Sum of the three allocated shares; bounded by [`ChargeSet::total`]
    pub fn allocated_total(&self) -> Money {
        self.freight + self.insurance + self.other_expenses
    }

    /// Share of one charge
    pub fn share(&self, kind: ChargeKind) -> Money {
        match kind {
            ChargeKind::Freight => self.freight,
            ChargeKind::Insurance => self.insurance,
            ChargeKind::OtherExpenses => self.other_expenses,
        }
    }
}

/// Sum of the gross amounts of all lines
///
/// # Errors
///
/// `MoneyError::Overflow` if the sum leaves the decimal range.
pub fn allocation_basis(lines: &[LineItem]) -> Result<Money, MoneyError> {
    Money::checked_sum(lines.iter().map(LineItem::gross_amount))
}

/// Allocates `charges` over `lines`, returning one result per line in order
///
/// When the basis is zero (no lines, or every line fully discounted) no
/// proportion exists: every share is zero and landed totals equal gross
/// amounts.
///
/// # Errors
///
/// Returns `MoneyError::Overflow` if the basis, a share or a landed total
/// leaves the decimal range. Quantities are positive by construction, so the
/// unit-cost division cannot divide by zero.
pub fn allocate(lines: &[LineItem], charges: &ChargeSet) -> Result<Vec<LineAllocation>, MoneyError> {
    let basis = allocation_basis(lines)?;

    lines
        .iter()
        .map(|line| {
            let gross = line.gross_amount();
            let (freight, insurance, other_expenses) = if basis.is_zero() {
                (Money::zero(), Money::zero(), Money::zero())
            } else {
                (
                    proportional_share(charges.freight, gross, basis)?,
                    proportional_share(charges.insurance, gross, basis)?,
                    proportional_share(charges.other_expenses, gross, basis)?,
                )
            };

            let landed_total = Money::checked_sum([gross, freight, insurance, other_expenses])?;
            let landed_unit_cost = landed_total.divide(line.quantity())?;

            Ok(LineAllocation {
                freight,
                insurance,
                other_expenses,
                landed_total,
                landed_unit_cost,
            })
        })
        .collect()
}

/// `charge * gross / basis`
///
/// Multiplies first to keep precision; when the product does not fit, the
/// line's proportion is taken first instead.
fn proportional_share(charge: Money, gross: Money, basis: Money) -> Result<Money, MoneyError> {
    match charge.checked_mul(gross.amount()) {
        Ok(weighted) => weighted.divide(basis.amount()),
        Err(_) => {
            let proportion = gross.divide(basis.amount())?.amount();
            charge.checked_mul(proportion)
        }
    }
}
