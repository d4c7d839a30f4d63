//! Invoice totals
//!
//! Aggregates the lines and charges of a draft into invoice-level totals.
//! Values are kept at full precision; see [`crate::snapshot`] for the
//! cent-exact displayed figures.

use serde::{Deserialize, Serialize};

use core_kernel::{Money, MoneyError};

use crate::allocation::{allocation_basis, ChargeSet};
use crate::line::LineItem;

/// Invoice-level totals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceTotals {
    /// Sum of line gross amounts
    pub items_subtotal: Money,
    /// Freight + insurance + other expenses
    pub charges_total: Money,
    /// Charges that could not be spread because the allocation basis is zero
    pub unallocated_charges: Money,
    /// `items_subtotal + charges_total`
    pub grand_total: Money,
}

impl InvoiceTotals {
    /// Part of the grand total carried by the lines
    pub fn allocated_total(&self) -> Money {
        self.grand_total - self.unallocated_charges
    }
}

/// Computes the totals of `lines` under `charges`
///
/// With no lines every total other than the charges is zero. The grand total
/// equals the sum of landed totals plus any unallocated charges.
///
/// # Errors
///
/// `MoneyError::Overflow` if a sum leaves the decimal range.
pub fn compute_totals(lines: &[LineItem], charges: &ChargeSet) -> Result<InvoiceTotals, MoneyError> {
    let items_subtotal = allocation_basis(lines)?;
    let charges_total = charges.total()?;
    let unallocated_charges = if items_subtotal.is_zero() {
        charges_total
    } else {
        Money::zero()
    };

    Ok(InvoiceTotals {
        items_subtotal,
        charges_total,
        unallocated_charges,
        grand_total: items_subtotal.checked_add(&charges_total)?,
    })
}

/// Sum of the landed totals of `lines`
pub fn landed_sum(lines: &[LineItem]) -> Result<Money, MoneyError> {
    Money::checked_sum(lines.iter().map(LineItem::landed_total))
}
