//! Draft snapshots
//!
//! A [`DraftSnapshot`] is the serializable view of a draft handed to the
//! presentation layer after every edit and to the persistence collaborator on
//! submit. All monetary figures in it are rounded to cents and reconcile
//! exactly:
//!
//! - each charge is rounded, then apportioned across the lines by largest
//!   remainder, so the displayed shares of a charge sum to the charge;
//! - each displayed landed total is the displayed gross plus the displayed
//!   shares;
//! - the displayed grand total is the sum of displayed landed totals plus
//!   any unallocated charges.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{DraftId, Money, MoneyError, PaymentConditionId, ProductId};

use crate::allocation::{ChargeKind, ChargeSet};
use crate::draft::{DocumentDirection, DraftOrigin, DraftStatus, FreightType, InvoiceDraft};
use crate::error::DraftError;
use crate::gate::{GateStage, SectionAccess};
use crate::line::{LineCandidate, LineItem};
use crate::references::{CarrierRef, CounterpartyRef, ProductRef};

/// One line of a snapshot, with its derived allocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineSnapshot {
    pub sequence: u32,
    pub product_id: ProductId,
    pub display_name: String,
    pub display_code: String,
    pub quantity: Decimal,
    pub unit_price: Money,
    pub line_discount: Money,
    pub gross_amount: Money,
    pub allocated_freight: Money,
    pub allocated_insurance: Money,
    pub allocated_other_expenses: Money,
    pub landed_total: Money,
    pub landed_unit_cost: Money,
}

impl LineSnapshot {
    /// Entered values of the line, as a candidate priced explicitly
    pub(crate) fn to_candidate(&self) -> LineCandidate {
        LineCandidate {
            product: Some(ProductRef {
                id: self.product_id,
                display_name: self.display_name.clone(),
                display_code: self.display_code.clone(),
                default_unit_price: self.unit_price,
            }),
            quantity: self.quantity,
            unit_price: Some(self.unit_price),
            discount: self.line_discount,
        }
    }

    /// Sum of the three displayed shares
    ///
    /// Never exceeds the displayed charges total of the snapshot it was
    /// captured in.
    pub fn allocated_total(&self) -> Money {
        self.allocated_freight + self.allocated_insurance + self.allocated_other_expenses
    }
}

/// Displayed invoice totals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TotalsSnapshot {
    pub items_subtotal: Money,
    pub freight: Money,
    pub insurance: Money,
    pub other_expenses: Money,
    pub charges_total: Money,
    pub unallocated_charges: Money,
    pub grand_total: Money,
}

/// Serializable view of a draft
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftSnapshot {
    pub id: DraftId,
    pub direction: DocumentDirection,
    pub origin: DraftOrigin,
    pub status: DraftStatus,
    pub document_number: String,
    pub document_model: String,
    pub document_series: String,
    pub counterparty: Option<CounterpartyRef>,
    pub issue_date: Option<NaiveDate>,
    pub arrival_or_departure_date: Option<NaiveDate>,
    pub freight_type: FreightType,
    pub freight_amount: Money,
    pub insurance_amount: Money,
    pub other_expenses_amount: Money,
    pub payment_condition_id: Option<PaymentConditionId>,
    pub carrier: Option<CarrierRef>,
    pub vehicle_plate: Option<String>,
    pub notes: String,
    pub lines: Vec<LineSnapshot>,
    pub totals: TotalsSnapshot,
    pub stage: GateStage,
    pub access: SectionAccess,
}

impl DraftSnapshot {
    /// Captures the current state of `draft`
    ///
    /// # Errors
    ///
    /// Fails only if a displayed amount or one of the displayed sums leaves the
    /// representable range.
    pub fn capture(draft: &InvoiceDraft, today: NaiveDate) -> Result<DraftSnapshot, DraftError> {
        let header = draft.header();
        let charges = displayed_charges(draft.charges());
        let lines = draft.lines();

        let weights: Vec<Decimal> = lines.iter().map(|l| l.gross_amount().amount()).collect();
        let allocatable = weights.iter().any(|w| !w.is_zero());

        let mut shares: Vec<[Money; 3]> = vec![[Money::zero(); 3]; lines.len()];
        if allocatable {
            for (slot, kind) in ChargeKind::ALL.into_iter().enumerate() {
                let parts = charges.get(kind).apportion(&weights)?;
                for (share, part) in shares.iter_mut().zip(parts) {
                    share[slot] = part;
                }
            }
        }

        let line_snapshots = lines
            .iter()
            .zip(shares)
            .map(|(line, [freight, insurance, other])| line_snapshot(line, freight, insurance, other))
            .collect::<Result<Vec<LineSnapshot>, MoneyError>>()?;

        let items_subtotal = Money::checked_sum(line_snapshots.iter().map(|l| l.gross_amount))?;
        let charges_total = charges.total()?;
        let grand_total = items_subtotal.checked_add(&charges_total)?;
        let unallocated_charges = if allocatable {
            Money::zero()
        } else {
            charges_total
        };

        Ok(DraftSnapshot {
            id: draft.id(),
            direction: draft.direction(),
            origin: draft.origin(),
            status: draft.status(),
            document_number: header.document_number().to_string(),
            document_model: header.document_model().to_string(),
            document_series: header.document_series().to_string(),
            counterparty: header.counterparty().cloned(),
            issue_date: header.issue_date(),
            arrival_or_departure_date: header.arrival_or_departure_date(),
            freight_type: draft.freight_type(),
            freight_amount: charges.freight,
            insurance_amount: charges.insurance,
            other_expenses_amount: charges.other_expenses,
            payment_condition_id: draft.payment_condition_id(),
            carrier: draft.carrier().cloned(),
            vehicle_plate: draft.vehicle_plate().map(str::to_string),
            notes: draft.notes().to_string(),
            lines: line_snapshots,
            totals: TotalsSnapshot {
                items_subtotal,
                freight: charges.freight,
                insurance: charges.insurance,
                other_expenses: charges.other_expenses,
                charges_total,
                unallocated_charges,
                grand_total,
            },
            stage: draft.stage(today),
            access: draft.access(today),
        })
    }

    /// Sum of the displayed landed totals
    pub fn landed_sum(&self) -> Result<Money, MoneyError> {
        Money::checked_sum(self.lines.iter().map(|l| l.landed_total))
    }
}

fn displayed_charges(charges: &ChargeSet) -> ChargeSet {
    ChargeSet::new(
        charges.freight.round_for_display(),
        charges.insurance.round_for_display(),
        charges.other_expenses.round_for_display(),
    )
}

fn line_snapshot(
    line: &LineItem,
    freight: Money,
    insurance: Money,
    other: Money,
) -> Result<LineSnapshot, MoneyError> {
    let gross_amount = line.gross_amount().round_for_display();
    Ok(LineSnapshot {
        sequence: line.sequence(),
        product_id: line.product_id(),
        display_name: line.display_name().to_string(),
        display_code: line.display_code().to_string(),
        quantity: line.quantity(),
        unit_price: line.unit_price(),
        line_discount: line.line_discount(),
        gross_amount,
        allocated_freight: freight,
        allocated_insurance: insurance,
        allocated_other_expenses: other,
        landed_total: Money::checked_sum([gross_amount, freight, insurance, other])?,
        landed_unit_cost: line.landed_unit_cost().round_for_display(),
    })
}
