//! Draft edits
//!
//! Every change to a draft is expressed as a [`DraftEdit`] and applied by a
//! pure reducer: the current draft is cloned, the edit is validated and
//! committed on the clone, and the allocation is recomputed before the clone
//! is returned. A rejected edit never reaches the caller's draft.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use core_kernel::{Money, PaymentConditionId};

use crate::allocation::ChargeKind;
use crate::draft::{DraftOrigin, FreightType, InvoiceDraft};
use crate::error::{DraftError, DraftField};
use crate::gate::GateStage;
use crate::line::LineCandidate;
use crate::references::{CarrierRef, CounterpartyRef};

/// A single user edit of a draft
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DraftEdit {
    SetDocumentNumber { value: String },
    SetDocumentModel { value: String },
    SetDocumentSeries { value: String },
    SetCounterparty { counterparty: Option<CounterpartyRef> },
    SetIssueDate { date: Option<NaiveDate> },
    SetArrivalOrDepartureDate { date: Option<NaiveDate> },
    AddLine { candidate: LineCandidate },
    RemoveLine { sequence: u32 },
    /// Removes every line; `confirmed` must be set by the caller
    ClearLines {
        #[serde(default)]
        confirmed: bool,
    },
    SetFreightType { freight_type: FreightType },
    SetCharge { kind: ChargeKind, amount: Money },
    SetPaymentCondition { payment_condition_id: Option<PaymentConditionId> },
    SetCarrier { carrier: Option<CarrierRef> },
    SetVehiclePlate { plate: Option<String> },
    SetNotes { notes: String },
}

impl DraftEdit {
    /// Name of the action, used in precondition errors and logs
    pub fn action(&self) -> &'static str {
        match self {
            DraftEdit::SetDocumentNumber { .. } => "set_document_number",
            DraftEdit::SetDocumentModel { .. } => "set_document_model",
            DraftEdit::SetDocumentSeries { .. } => "set_document_series",
            DraftEdit::SetCounterparty { .. } => "set_counterparty",
            DraftEdit::SetIssueDate { .. } => "set_issue_date",
            DraftEdit::SetArrivalOrDepartureDate { .. } => "set_arrival_or_departure_date",
            DraftEdit::AddLine { .. } => "add_line",
            DraftEdit::RemoveLine { .. } => "remove_line",
            DraftEdit::ClearLines { .. } => "clear_lines",
            DraftEdit::SetFreightType { .. } => "set_freight_type",
            DraftEdit::SetCharge { .. } => "set_charge",
            DraftEdit::SetPaymentCondition { .. } => "set_payment_condition",
            DraftEdit::SetCarrier { .. } => "set_carrier",
            DraftEdit::SetVehiclePlate { .. } => "set_vehicle_plate",
            DraftEdit::SetNotes { .. } => "set_notes",
        }
    }
}

/// Applies `edit` to a copy of `draft` and recomputes it
pub(crate) fn apply_edit(
    draft: &InvoiceDraft,
    edit: DraftEdit,
    today: NaiveDate,
) -> Result<InvoiceDraft, DraftError> {
    let action = edit.action();
    if draft.is_submitted() {
        return Err(DraftError::precondition(action, "draft has already been submitted"));
    }

    let mut next = draft.clone();
    match edit {
        DraftEdit::SetDocumentNumber { value } => {
            require_identity_unlocked(draft, action)?;
            next.header.document_number = value.trim().to_string();
        }
        DraftEdit::SetDocumentModel { value } => {
            require_identity_unlocked(draft, action)?;
            next.header.document_model = value.trim().to_string();
        }
        DraftEdit::SetDocumentSeries { value } => {
            require_identity_unlocked(draft, action)?;
            next.header.document_series = value.trim().to_string();
        }
        DraftEdit::SetCounterparty { counterparty } => {
            require_identity_unlocked(draft, action)?;
            // A condition inherited from the outgoing counterparty leaves with it
            let outgoing_default = draft
                .header
                .counterparty
                .as_ref()
                .and_then(|c| c.default_payment_condition_id);
            if outgoing_default.is_some() && next.payment_condition_id == outgoing_default {
                next.payment_condition_id = None;
            }
            if let Some(default) = counterparty
                .as_ref()
                .and_then(|c| c.default_payment_condition_id)
            {
                next.payment_condition_id = Some(default);
            }
            next.header.counterparty = counterparty;
        }
        DraftEdit::SetIssueDate { date } => {
            match date {
                Some(issue) => {
                    if issue > today {
                        return Err(DraftError::validation(
                            DraftField::IssueDate,
                            format!("issue date {} is after today ({})", issue, today),
                        ));
                    }
                    if let Some(movement) = draft.header.arrival_or_departure_date {
                        if movement < issue {
                            return Err(DraftError::validation(
                                DraftField::IssueDate,
                                format!(
                                    "issue date {} is after the {} {}",
                                    issue,
                                    draft.direction.movement_date_label(),
                                    movement
                                ),
                            ));
                        }
                    }
                }
                None => require_no_lines(draft, action, DraftField::IssueDate)?,
            }
            next.header.issue_date = date;
        }
        DraftEdit::SetArrivalOrDepartureDate { date } => {
            match date {
                Some(movement) => {
                    if let Some(issue) = draft.header.issue_date {
                        if movement < issue {
                            return Err(DraftError::validation(
                                DraftField::ArrivalOrDepartureDate,
                                format!(
                                    "{} {} is before the issue date {}",
                                    draft.direction.movement_date_label(),
                                    movement,
                                    issue
                                ),
                            ));
                        }
                    }
                }
                None => require_no_lines(draft, action, DraftField::ArrivalOrDepartureDate)?,
            }
            next.header.arrival_or_departure_date = date;
        }
        DraftEdit::AddLine { candidate } => {
            require_lines_editable(draft, action)?;
            let header = &draft.header;
            if header.missing_for_line_entry().is_empty() && !header.dates_consistent(today) {
                return Err(DraftError::precondition(action, "header dates are inconsistent"));
            }
            let missing_identity = header.identity_missing();
            if !missing_identity.is_empty() {
                let names: Vec<&str> = missing_identity.iter().map(DraftField::as_str).collect();
                return Err(DraftError::precondition(
                    action,
                    format!("header is missing {}", names.join(", ")),
                ));
            }
            next.store.add_line(candidate, header)?;
        }
        DraftEdit::RemoveLine { sequence } => {
            require_lines_editable(draft, action)?;
            next.store.remove_line(sequence);
        }
        DraftEdit::ClearLines { confirmed } => {
            require_lines_editable(draft, action)?;
            if !confirmed {
                return Err(DraftError::precondition(
                    action,
                    "clearing all lines requires confirmation",
                ));
            }
            next.store.clear();
        }
        DraftEdit::SetFreightType { freight_type } => {
            require_items_present(draft, action, today)?;
            next.freight_type = freight_type;
        }
        DraftEdit::SetCharge { kind, amount } => {
            require_items_present(draft, action, today)?;
            if amount.is_negative() {
                return Err(DraftError::validation(
                    kind.field(),
                    format!("charge cannot be negative, got {}", amount),
                ));
            }
            next.charges = next.charges.with(kind, amount);
            next.charges.total().map_err(|_| {
                DraftError::validation(
                    kind.field(),
                    format!("{} takes the charges total beyond the supported range", amount),
                )
            })?;
        }
        DraftEdit::SetPaymentCondition { payment_condition_id } => {
            require_items_present(draft, action, today)?;
            next.payment_condition_id = payment_condition_id;
        }
        DraftEdit::SetCarrier { carrier } => {
            require_items_present(draft, action, today)?;
            let keeps_plate = match (&carrier, next.vehicle_plate.as_deref()) {
                (Some(carrier), Some(plate)) => carrier.vehicle(plate).is_some(),
                _ => false,
            };
            if !keeps_plate {
                next.vehicle_plate = None;
            }
            next.carrier = carrier;
        }
        DraftEdit::SetVehiclePlate { plate } => {
            require_items_present(draft, action, today)?;
            next.vehicle_plate = match plate {
                Some(plate) => {
                    let carrier = draft.carrier.as_ref().ok_or_else(|| {
                        DraftError::precondition(action, "select a carrier before a vehicle")
                    })?;
                    let vehicle = carrier.vehicle(&plate).ok_or_else(|| {
                        DraftError::validation(
                            DraftField::VehiclePlate,
                            format!(
                                "vehicle {} does not belong to carrier {}",
                                plate.trim(),
                                carrier.display_name
                            ),
                        )
                    })?;
                    Some(vehicle.plate.clone())
                }
                None => None,
            };
        }
        DraftEdit::SetNotes { notes } => {
            next.notes = notes;
        }
    }

    next.recompute()?;
    Ok(next)
}

fn require_identity_unlocked(draft: &InvoiceDraft, action: &'static str) -> Result<(), DraftError> {
    if draft.origin == DraftOrigin::Persisted {
        return Err(DraftError::precondition(
            action,
            "the identity of a persisted document cannot change",
        ));
    }
    if !draft.store.is_empty() {
        return Err(DraftError::precondition(
            action,
            "remove all lines before changing the document identity or counterparty",
        ));
    }
    Ok(())
}

fn require_no_lines(
    draft: &InvoiceDraft,
    action: &'static str,
    field: DraftField,
) -> Result<(), DraftError> {
    if draft.store.is_empty() {
        Ok(())
    } else {
        Err(DraftError::precondition(
            action,
            format!("{} cannot be cleared while lines exist", field),
        ))
    }
}

fn require_lines_editable(draft: &InvoiceDraft, action: &'static str) -> Result<(), DraftError> {
    if draft.origin == DraftOrigin::Persisted {
        return Err(DraftError::precondition(
            action,
            "lines of a persisted document are frozen",
        ));
    }
    Ok(())
}

fn require_items_present(
    draft: &InvoiceDraft,
    action: &'static str,
    today: NaiveDate,
) -> Result<(), DraftError> {
    let stage = draft.stage(today);
    if stage < GateStage::ItemsPresent {
        return Err(DraftError::precondition(
            action,
            format!("requires at least one line item (stage is {})", stage),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::DocumentDirection;
    use crate::references::ProductRef;
    use core_kernel::{PartyId, ProductId};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn supplier() -> CounterpartyRef {
        CounterpartyRef {
            id: PartyId::new(),
            display_name: "Laticinios Serra".to_string(),
            default_payment_condition_id: Some(PaymentConditionId::new()),
        }
    }

    fn apply_all(draft: InvoiceDraft, edits: Vec<DraftEdit>) -> Result<InvoiceDraft, DraftError> {
        edits
            .into_iter()
            .try_fold(draft, |draft, edit| draft.apply(edit, today()))
    }

    fn header_edits() -> Vec<DraftEdit> {
        vec![
            DraftEdit::SetDocumentNumber { value: " 1001 ".to_string() },
            DraftEdit::SetDocumentModel { value: "55".to_string() },
            DraftEdit::SetDocumentSeries { value: "1".to_string() },
            DraftEdit::SetCounterparty { counterparty: Some(supplier()) },
            DraftEdit::SetIssueDate { date: Some(date(1)) },
            DraftEdit::SetArrivalOrDepartureDate { date: Some(date(2)) },
        ]
    }

    fn add_line() -> DraftEdit {
        DraftEdit::AddLine {
            candidate: LineCandidate::for_product(
                ProductRef {
                    id: ProductId::new(),
                    display_name: "Tomato sauce".to_string(),
                    display_code: "TOM".to_string(),
                    default_unit_price: Money::new(dec!(10.50)),
                },
                dec!(2),
            ),
        }
    }

    #[test]
    fn test_header_edits_are_trimmed_and_copy_payment_default() {
        let draft = apply_all(InvoiceDraft::new(DocumentDirection::Inbound), header_edits()).unwrap();

        assert_eq!(draft.header().document_number(), "1001");
        assert!(draft.payment_condition_id().is_some());
        assert_eq!(draft.stage(today()), GateStage::HeaderComplete);
    }

    #[test]
    fn test_rejected_edit_leaves_draft_untouched() {
        let draft = apply_all(InvoiceDraft::new(DocumentDirection::Inbound), header_edits()).unwrap();
        let before = draft.clone();

        let err = draft
            .apply(DraftEdit::SetIssueDate { date: Some(date(11)) }, today())
            .unwrap_err();

        assert_eq!(err.field(), Some(DraftField::IssueDate));
        assert_eq!(draft, before);
    }

    #[test]
    fn test_arrival_before_issue_rejected() {
        let draft = apply_all(InvoiceDraft::new(DocumentDirection::Inbound), header_edits()).unwrap();
        let err = draft
            .apply(
                DraftEdit::SetArrivalOrDepartureDate {
                    date: NaiveDate::from_ymd_opt(2024, 2, 29),
                },
                today(),
            )
            .unwrap_err();
        assert_eq!(err.field(), Some(DraftField::ArrivalOrDepartureDate));
    }

    #[test]
    fn test_identity_locked_while_lines_exist() {
        let mut edits = header_edits();
        edits.push(add_line());
        let draft = apply_all(InvoiceDraft::new(DocumentDirection::Inbound), edits).unwrap();

        let err = draft
            .apply(DraftEdit::SetDocumentNumber { value: "2002".to_string() }, today())
            .unwrap_err();
        assert!(matches!(err, DraftError::PreconditionNotMet { action: "set_document_number", .. }));

        let err = draft.apply(DraftEdit::SetIssueDate { date: None }, today()).unwrap_err();
        assert!(matches!(err, DraftError::PreconditionNotMet { .. }));

        assert!(draft.apply(DraftEdit::SetIssueDate { date: Some(date(2)) }, today()).is_ok());
    }

    #[test]
    fn test_add_line_requires_identity() {
        let edits: Vec<DraftEdit> = header_edits().into_iter().skip(1).collect();
        let draft = apply_all(InvoiceDraft::new(DocumentDirection::Outbound), edits).unwrap();

        let err = draft.apply(add_line(), today()).unwrap_err();
        assert!(err.to_string().contains("document_number"));
    }

    #[test]
    fn test_charges_locked_until_items_present() {
        let draft = apply_all(InvoiceDraft::new(DocumentDirection::Inbound), header_edits()).unwrap();
        let edit = DraftEdit::SetCharge {
            kind: ChargeKind::Freight,
            amount: Money::new(dec!(5)),
        };

        assert!(matches!(
            draft.apply(edit.clone(), today()),
            Err(DraftError::PreconditionNotMet { .. })
        ));

        let draft = draft.apply(add_line(), today()).unwrap();
        let draft = draft.apply(edit, today()).unwrap();
        assert_eq!(draft.lines()[0].landed_total().amount(), dec!(26.00));
    }

    #[test]
    fn test_negative_charge_rejected() {
        let mut edits = header_edits();
        edits.push(add_line());
        let draft = apply_all(InvoiceDraft::new(DocumentDirection::Inbound), edits).unwrap();

        let err = draft
            .apply(
                DraftEdit::SetCharge {
                    kind: ChargeKind::Insurance,
                    amount: Money::new(dec!(-1)),
                },
                today(),
            )
            .unwrap_err();
        assert_eq!(err.field(), Some(DraftField::InsuranceAmount));
    }

    #[test]
    fn test_charge_total_beyond_decimal_range_rejected() {
        let mut edits = header_edits();
        edits.push(add_line());
        edits.push(DraftEdit::SetCharge {
            kind: ChargeKind::Freight,
            amount: Money::new(Decimal::MAX),
        });
        let draft = apply_all(InvoiceDraft::new(DocumentDirection::Inbound), edits);
        assert!(draft.is_err());

        let mut edits = header_edits();
        edits.push(add_line());
        let draft = apply_all(InvoiceDraft::new(DocumentDirection::Inbound), edits).unwrap();
        let draft = draft
            .apply(
                DraftEdit::SetCharge {
                    kind: ChargeKind::Freight,
                    amount: Money::new(dec!(50000000000000000000000000000)),
                },
                today(),
            )
            .unwrap();
        let before = draft.clone();

        let err = draft
            .apply(
                DraftEdit::SetCharge {
                    kind: ChargeKind::OtherExpenses,
                    amount: Money::new(dec!(50000000000000000000000000000)),
                },
                today(),
            )
            .unwrap_err();

        assert_eq!(err.field(), Some(DraftField::OtherExpensesAmount));
        assert_eq!(draft, before);
    }

    #[test]
    fn test_switching_counterparty_drops_inherited_payment_condition() {
        let draft = apply_all(InvoiceDraft::new(DocumentDirection::Inbound), header_edits()).unwrap();
        let inherited = draft.payment_condition_id();
        assert!(inherited.is_some());

        let walk_in = CounterpartyRef {
            id: PartyId::new(),
            display_name: "Walk-in".to_string(),
            default_payment_condition_id: None,
        };
        let switched = draft
            .apply(DraftEdit::SetCounterparty { counterparty: Some(walk_in) }, today())
            .unwrap();
        assert_eq!(switched.payment_condition_id(), None);

        let cleared = draft
            .apply(DraftEdit::SetCounterparty { counterparty: None }, today())
            .unwrap();
        assert_eq!(cleared.payment_condition_id(), None);

        let other = supplier();
        let replaced = draft
            .apply(DraftEdit::SetCounterparty { counterparty: Some(other.clone()) }, today())
            .unwrap();
        assert_eq!(replaced.payment_condition_id(), other.default_payment_condition_id);
    }

    #[test]
    fn test_switching_counterparty_keeps_chosen_payment_condition() {
        let mut edits = header_edits();
        edits.push(add_line());
        let chosen = PaymentConditionId::new();
        edits.push(DraftEdit::SetPaymentCondition { payment_condition_id: Some(chosen) });
        edits.push(DraftEdit::ClearLines { confirmed: true });
        let draft = apply_all(InvoiceDraft::new(DocumentDirection::Inbound), edits).unwrap();

        let cleared = draft
            .apply(DraftEdit::SetCounterparty { counterparty: None }, today())
            .unwrap();

        assert_eq!(cleared.payment_condition_id(), Some(chosen));
    }

    #[test]
    fn test_clear_requires_confirmation() {
        let mut edits = header_edits();
        edits.push(add_line());
        let draft = apply_all(InvoiceDraft::new(DocumentDirection::Inbound), edits).unwrap();

        assert!(draft.apply(DraftEdit::ClearLines { confirmed: false }, today()).is_err());
        let cleared = draft.apply(DraftEdit::ClearLines { confirmed: true }, today()).unwrap();
        assert!(cleared.lines().is_empty());
    }

    #[test]
    fn test_edit_action_names() {
        assert_eq!(DraftEdit::RemoveLine { sequence: 1 }.action(), "remove_line");
        assert_eq!(DraftEdit::SetNotes { notes: String::new() }.action(), "set_notes");
    }
}
