//! Invoice Draft Aggregate Root
//!
//! An [`InvoiceDraft`] is an in-memory, not-yet-persisted goods-received
//! (inbound) or goods-shipped (outbound) document. It is the consistency
//! boundary for the line items, the shared charges and everything derived
//! from them.
//!
//! # Invariants
//!
//! - `arrival_or_departure_date >= issue_date` and `issue_date <= today`
//! - every line has a positive quantity and a discount no larger than its value
//! - allocated shares, landed totals and unit costs are always the result of a
//!   full recomputation over the current lines and charges
//! - sequence numbers are append-only and never reused
//!
//! Drafts are treated as immutable values: edits go through
//! [`InvoiceDraft::apply`], which returns a new draft or an error and never
//! touches `self`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use core_kernel::{DraftId, Money, PartyId, PaymentConditionId};

use crate::allocation::{allocate, ChargeKind, ChargeSet};
use crate::edit::{apply_edit, DraftEdit};
use crate::error::{DraftError, DraftField};
use crate::gate::{self, GateStage, SectionAccess};
use crate::line::LineItem;
use crate::references::{CarrierRef, CounterpartyRef};
use crate::snapshot::DraftSnapshot;
use crate::store::LineItemStore;
use crate::totals::{compute_totals, InvoiceTotals};

/// Which way the goods move; selects the counterparty role and date meaning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentDirection {
    /// Purchase document: goods received from a supplier
    Inbound,
    /// Sales document: goods shipped to a customer
    Outbound,
}

impl DocumentDirection {
    /// Role the counterparty plays for this direction
    pub fn counterparty_role(&self) -> &'static str {
        match self {
            DocumentDirection::Inbound => "supplier",
            DocumentDirection::Outbound => "customer",
        }
    }

    /// Meaning of the second header date for this direction
    pub fn movement_date_label(&self) -> &'static str {
        match self {
            DocumentDirection::Inbound => "arrival date",
            DocumentDirection::Outbound => "departure date",
        }
    }
}

/// Where the draft came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftOrigin {
    /// Created empty in this session
    New,
    /// Hydrated from a persisted document for editing
    Persisted,
}

/// Lifecycle of the draft within this core
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftStatus {
    /// Accepting edits
    Open,
    /// Serialized for persistence; no further edits
    Submitted,
}

/// Freight terms of the document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FreightType {
    /// Cost, insurance and freight paid by the sender
    Cif,
    /// Free on board; freight paid by the receiver
    Fob,
    #[default]
    None,
}

/// Natural key of a document
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentKey {
    pub number: String,
    pub model: String,
    pub series: String,
    pub counterparty_id: PartyId,
}

/// Header fields of a draft
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftHeader {
    pub(crate) document_number: String,
    pub(crate) document_model: String,
    pub(crate) document_series: String,
    pub(crate) counterparty: Option<CounterpartyRef>,
    pub(crate) issue_date: Option<NaiveDate>,
    pub(crate) arrival_or_departure_date: Option<NaiveDate>,
}

impl DraftHeader {
    pub fn document_number(&self) -> &str {
        &self.document_number
    }

    pub fn document_model(&self) -> &str {
        &self.document_model
    }

    pub fn document_series(&self) -> &str {
        &self.document_series
    }

    pub fn counterparty(&self) -> Option<&CounterpartyRef> {
        self.counterparty.as_ref()
    }

    pub fn issue_date(&self) -> Option<NaiveDate> {
        self.issue_date
    }

    pub fn arrival_or_departure_date(&self) -> Option<NaiveDate> {
        self.arrival_or_departure_date
    }

    /// Returns the natural key once number, model, series and counterparty are set
    pub fn document_key(&self) -> Option<DocumentKey> {
        let counterparty = self.counterparty.as_ref()?;
        if self.identity_missing().is_empty() {
            Some(DocumentKey {
                number: self.document_number.clone(),
                model: self.document_model.clone(),
                series: self.document_series.clone(),
                counterparty_id: counterparty.id,
            })
        } else {
            None
        }
    }

    /// Fields a line item cannot be added without
    pub fn missing_for_line_entry(&self) -> Vec<DraftField> {
        let mut missing = Vec::new();
        if self.counterparty.is_none() {
            missing.push(DraftField::Counterparty);
        }
        if self.issue_date.is_none() {
            missing.push(DraftField::IssueDate);
        }
        if self.arrival_or_departure_date.is_none() {
            missing.push(DraftField::ArrivalOrDepartureDate);
        }
        missing
    }

    /// Every header field that is still unset
    pub fn missing_fields(&self) -> Vec<DraftField> {
        let mut missing = self.identity_missing();
        missing.extend(self.missing_for_line_entry());
        missing
    }

    /// True when both dates are set and satisfy the ordering rules
    pub fn dates_consistent(&self, today: NaiveDate) -> bool {
        match (self.issue_date, self.arrival_or_departure_date) {
            (Some(issue), Some(movement)) => issue <= today && movement >= issue,
            _ => false,
        }
    }

    /// True when the header allows line entry
    pub fn is_complete(&self, today: NaiveDate) -> bool {
        self.missing_fields().is_empty() && self.dates_consistent(today)
    }

    /// Document number, model and series that are still empty
    pub(crate) fn identity_missing(&self) -> Vec<DraftField> {
        let mut missing = Vec::new();
        if self.document_number.is_empty() {
            missing.push(DraftField::DocumentNumber);
        }
        if self.document_model.is_empty() {
            missing.push(DraftField::DocumentModel);
        }
        if self.document_series.is_empty() {
            missing.push(DraftField::DocumentSeries);
        }
        missing
    }
}

/// The invoice draft aggregate root
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceDraft {
    pub(crate) id: DraftId,
    pub(crate) direction: DocumentDirection,
    pub(crate) origin: DraftOrigin,
    pub(crate) status: DraftStatus,
    pub(crate) header: DraftHeader,
    pub(crate) freight_type: FreightType,
    pub(crate) charges: ChargeSet,
    pub(crate) payment_condition_id: Option<PaymentConditionId>,
    pub(crate) carrier: Option<CarrierRef>,
    pub(crate) vehicle_plate: Option<String>,
    pub(crate) notes: String,
    pub(crate) store: LineItemStore,
    /// Refreshed by every recompute
    pub(crate) totals: InvoiceTotals,
}

impl InvoiceDraft {
    /// Creates an empty draft for the given direction
    pub fn new(direction: DocumentDirection) -> Self {
        Self {
            id: DraftId::new_v7(),
            direction,
            origin: DraftOrigin::New,
            status: DraftStatus::Open,
            header: DraftHeader::default(),
            freight_type: FreightType::default(),
            charges: ChargeSet::default(),
            payment_condition_id: None,
            carrier: None,
            vehicle_plate: None,
            notes: String::new(),
            store: LineItemStore::new(),
            totals: InvoiceTotals::default(),
        }
    }

    pub fn id(&self) -> DraftId {
        self.id
    }

    pub fn direction(&self) -> DocumentDirection {
        self.direction
    }

    pub fn origin(&self) -> DraftOrigin {
        self.origin
    }

    pub fn status(&self) -> DraftStatus {
        self.status
    }

    pub fn header(&self) -> &DraftHeader {
        &self.header
    }

    pub fn freight_type(&self) -> FreightType {
        self.freight_type
    }

    pub fn charges(&self) -> &ChargeSet {
        &self.charges
    }

    pub fn payment_condition_id(&self) -> Option<PaymentConditionId> {
        self.payment_condition_id
    }

    pub fn carrier(&self) -> Option<&CarrierRef> {
        self.carrier.as_ref()
    }

    pub fn vehicle_plate(&self) -> Option<&str> {
        self.vehicle_plate.as_deref()
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    /// Line items in insertion order
    pub fn lines(&self) -> &[LineItem] {
        self.store.list()
    }

    /// Looks up a line by its sequence number
    pub fn line(&self, sequence: u32) -> Option<&LineItem> {
        self.store.get(sequence)
    }

    /// Invoice-level totals derived from the lines and charges
    pub fn totals(&self) -> InvoiceTotals {
        self.totals
    }

    /// Current stage of the progressive entry gate
    pub fn stage(&self, today: NaiveDate) -> GateStage {
        gate::evaluate(self, today)
    }

    /// Which sections are currently editable
    pub fn access(&self, today: NaiveDate) -> SectionAccess {
        gate::section_access(self, today)
    }

    /// Returns true once the draft has been submitted
    pub fn is_submitted(&self) -> bool {
        self.status == DraftStatus::Submitted
    }

    /// Applies one edit, returning the resulting draft
    ///
    /// # Errors
    ///
    /// Returns `ValidationRejected` or `PreconditionNotMet`; `self` is never
    /// modified, so a rejected edit cannot leave a partially applied draft.
    pub fn apply(&self, edit: DraftEdit, today: NaiveDate) -> Result<InvoiceDraft, DraftError> {
        apply_edit(self, edit, today)
    }

    /// Freezes the draft for persistence
    ///
    /// Requires an open draft with a counterparty and at least one line, with
    /// the gate at `ItemsPresent`. Returns the submitted draft together with
    /// the snapshot handed to the persistence collaborator.
    ///
    /// # Errors
    ///
    /// `PreconditionNotMet` if already submitted or the gate is not at
    /// `ItemsPresent`; `ValidationRejected` if lines or counterparty are
    /// missing.
    pub fn submit(&self, today: NaiveDate) -> Result<(InvoiceDraft, DraftSnapshot), DraftError> {
        if self.is_submitted() {
            return Err(DraftError::precondition("submit", "draft has already been submitted"));
        }
        if self.header.counterparty.is_none() {
            return Err(DraftError::validation(
                DraftField::Counterparty,
                format!("a {} is required to submit", self.direction.counterparty_role()),
            ));
        }
        if self.store.is_empty() {
            return Err(DraftError::validation(
                DraftField::Lines,
                "at least one line item is required to submit",
            ));
        }
        let stage = self.stage(today);
        if stage != GateStage::ItemsPresent {
            return Err(DraftError::precondition(
                "submit",
                format!("draft is at stage {}, submission requires {}", stage, GateStage::ItemsPresent),
            ));
        }

        let mut submitted = self.clone();
        submitted.status = DraftStatus::Submitted;
        let snapshot = DraftSnapshot::capture(&submitted, today)?;
        Ok((submitted, snapshot))
    }

    /// Rebuilds an editable draft from a persisted snapshot
    ///
    /// Entered values are taken from the snapshot; every derived value is
    /// recomputed. The document identity and the line collection of the
    /// result are frozen.
    ///
    /// # Errors
    ///
    /// Returns `ValidationRejected` if the snapshot violates any draft
    /// invariant.
    pub fn hydrate(snapshot: &DraftSnapshot, today: NaiveDate) -> Result<InvoiceDraft, DraftError> {
        let header = DraftHeader {
            document_number: snapshot.document_number.trim().to_string(),
            document_model: snapshot.document_model.trim().to_string(),
            document_series: snapshot.document_series.trim().to_string(),
            counterparty: snapshot.counterparty.clone(),
            issue_date: snapshot.issue_date,
            arrival_or_departure_date: snapshot.arrival_or_departure_date,
        };

        if let Some(field) = header.missing_fields().first() {
            return Err(DraftError::validation(*field, "persisted document is missing this field"));
        }
        if !header.dates_consistent(today) {
            return Err(DraftError::validation(
                DraftField::ArrivalOrDepartureDate,
                "persisted document dates are inconsistent",
            ));
        }

        let charges = ChargeSet::new(
            snapshot.freight_amount,
            snapshot.insurance_amount,
            snapshot.other_expenses_amount,
        );
        validate_charges(&charges)?;

        let mut lines = Vec::with_capacity(snapshot.lines.len());
        for line in &snapshot.lines {
            lines.push(line.to_candidate().into_line(line.sequence)?);
        }
        let store = LineItemStore::restore(lines)?;

        if let Some(plate) = snapshot.vehicle_plate.as_deref() {
            let carrier = snapshot.carrier.as_ref().ok_or_else(|| {
                DraftError::validation(DraftField::VehiclePlate, "vehicle plate recorded without a carrier")
            })?;
            if carrier.vehicle(plate).is_none() {
                return Err(DraftError::validation(
                    DraftField::VehiclePlate,
                    format!("vehicle {} does not belong to carrier {}", plate, carrier.display_name),
                ));
            }
        }

        let mut draft = InvoiceDraft {
            id: snapshot.id,
            direction: snapshot.direction,
            origin: DraftOrigin::Persisted,
            status: DraftStatus::Open,
            header,
            freight_type: snapshot.freight_type,
            charges,
            payment_condition_id: snapshot.payment_condition_id,
            carrier: snapshot.carrier.clone(),
            vehicle_plate: snapshot.vehicle_plate.clone(),
            notes: snapshot.notes.clone(),
            store,
            totals: InvoiceTotals::default(),
        };
        draft.recompute()?;
        Ok(draft)
    }

    /// Re-runs the allocation engine over every line and refreshes the totals
    pub(crate) fn recompute(&mut self) -> Result<(), DraftError> {
        let allocations = allocate(self.store.list(), &self.charges)?;
        let totals = compute_totals(self.store.list(), &self.charges)?;
        for (line, allocation) in self.store.lines_mut().iter_mut().zip(allocations) {
            line.set_allocation(allocation);
        }
        self.totals = totals;
        Ok(())
    }
}

/// Rejects a negative charge, or a charge set whose total leaves the decimal range
///
/// The error names the first charge that is negative or that pushes the
/// running total out of range.
pub(crate) fn validate_charges(charges: &ChargeSet) -> Result<(), DraftError> {
    let mut total = Money::zero();
    for kind in ChargeKind::ALL {
        let amount = charges.get(kind);
        if amount.is_negative() {
            return Err(DraftError::validation(
                kind.field(),
                format!("charge cannot be negative, got {}", amount),
            ));
        }
        total = total.checked_add(&amount).map_err(|_| {
            DraftError::validation(kind.field(), "charges total exceeds the supported range")
        })?;
    }
    Ok(())
}
