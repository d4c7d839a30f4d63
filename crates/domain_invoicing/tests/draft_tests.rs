//! Comprehensive tests for domain_invoicing

use std::sync::Arc;

use rust_decimal_macros::dec;

use core_kernel::{FixedClock, Money};

use domain_invoicing::{
    ChargeKind, DocumentDirection, DraftController, DraftEdit, DraftError, DraftField,
    DraftOrigin, DraftService, DraftSnapshot, DraftStatus, ErrorKind, FreightType, GateStage,
    InvoiceDraft,
};
use test_utils::{
    assert_money_eq, assert_precondition, assert_rejected_on, assert_snapshot_reconciles,
    seeded_reference_port, CarrierFixtures, CounterpartyFixtures, DateFixtures, DraftBuilder,
    LineCandidateBuilder, PaymentConditionFixtures, ProductFixtures,
};

fn today() -> chrono::NaiveDate {
    DateFixtures::today()
}

fn two_line_builder() -> DraftBuilder {
    DraftBuilder::new(DocumentDirection::Inbound)
        .line(ProductFixtures::mozzarella(), dec!(1), dec!(15.00), dec!(0))
        .line(ProductFixtures::tomato_sauce(), dec!(2), dec!(8.50), dec!(1.00))
        .charge(ChargeKind::Freight, dec!(3.00))
        .charge(ChargeKind::Insurance, dec!(2.00))
        .charge(ChargeKind::OtherExpenses, dec!(1.00))
}

// ============================================================================
// Worked Examples
// ============================================================================

mod worked_example_tests {
    use super::*;

    #[test]
    fn test_single_line_with_freight() {
        let draft = DraftBuilder::new(DocumentDirection::Inbound)
            .line(ProductFixtures::dough(), dec!(2), dec!(10.50), dec!(0))
            .charge(ChargeKind::Freight, dec!(5.00))
            .build();

        let line = &draft.lines()[0];
        assert_money_eq(&line.gross_amount(), dec!(21.00));
        assert_money_eq(&line.allocated_freight(), dec!(5.00));
        assert_money_eq(&line.landed_total(), dec!(26.00));
        assert_money_eq(&line.landed_unit_cost(), dec!(13.00));
        assert_money_eq(&draft.totals().grand_total, dec!(26.00));
    }

    #[test]
    fn test_two_lines_split_proportionally() {
        let draft = two_line_builder().build();
        let snapshot = DraftSnapshot::capture(&draft, today()).unwrap();

        assert_money_eq(&snapshot.totals.items_subtotal, dec!(31.00));
        assert_money_eq(&snapshot.lines[0].allocated_total(), dec!(2.90));
        assert_money_eq(&snapshot.lines[1].allocated_total(), dec!(3.10));
        assert_money_eq(&snapshot.lines[0].landed_total, dec!(17.90));
        assert_money_eq(&snapshot.lines[1].landed_total, dec!(19.10));
        assert_money_eq(&snapshot.totals.grand_total, dec!(37.00));
        assert_snapshot_reconciles(&snapshot);
    }

    #[test]
    fn test_two_lines_displayed_shares_per_charge() {
        let snapshot = DraftSnapshot::capture(&two_line_builder().build(), today()).unwrap();

        assert_money_eq(&snapshot.lines[0].allocated_freight, dec!(1.45));
        assert_money_eq(&snapshot.lines[1].allocated_freight, dec!(1.55));
        assert_money_eq(&snapshot.lines[0].allocated_insurance, dec!(0.97));
        assert_money_eq(&snapshot.lines[1].allocated_insurance, dec!(1.03));
        assert_money_eq(&snapshot.lines[0].allocated_other_expenses, dec!(0.48));
        assert_money_eq(&snapshot.lines[1].allocated_other_expenses, dec!(0.52));
    }
}

// ============================================================================
// Zero Basis and Empty Store
// ============================================================================

mod zero_basis_tests {
    use super::*;

    #[test]
    fn test_fully_discounted_lines_leave_charges_unallocated() {
        let draft = DraftBuilder::new(DocumentDirection::Inbound)
            .line(ProductFixtures::basil(), dec!(4), dec!(1.00), dec!(4.00))
            .charge(ChargeKind::Freight, dec!(9.00))
            .build();
        let snapshot = DraftSnapshot::capture(&draft, today()).unwrap();

        assert!(snapshot.lines[0].allocated_total().is_zero());
        assert!(snapshot.lines[0].landed_total.is_zero());
        assert_money_eq(&snapshot.totals.unallocated_charges, dec!(9.00));
        assert_money_eq(&snapshot.totals.grand_total, dec!(9.00));
        assert_snapshot_reconciles(&snapshot);
    }

    #[test]
    fn test_empty_draft_totals_are_zero() {
        let draft = DraftBuilder::new(DocumentDirection::Outbound).build();
        let totals = draft.totals();

        assert!(totals.items_subtotal.is_zero());
        assert!(totals.grand_total.is_zero());
        assert!(DraftSnapshot::capture(&draft, today()).unwrap().lines.is_empty());
    }
}

// ============================================================================
// Progressive Gate
// ============================================================================

mod gate_tests {
    use super::*;

    #[test]
    fn test_blank_draft_needs_header() {
        let draft = DraftBuilder::blank(DocumentDirection::Inbound).build();
        assert_eq!(draft.stage(today()), GateStage::HeaderIncomplete);

        let err = draft
            .apply(
                DraftEdit::AddLine {
                    candidate: LineCandidateBuilder::new(ProductFixtures::dough()).build(),
                },
                today(),
            )
            .unwrap_err();
        assert_precondition(&err);
    }

    #[test]
    fn test_missing_counterparty_blocks_line_entry() {
        let draft = DraftBuilder::new(DocumentDirection::Outbound)
            .counterparty(None)
            .build();

        assert_eq!(draft.stage(today()), GateStage::HeaderIncomplete);
        assert!(!draft.access(today()).line_entry);
    }

    #[test]
    fn test_removing_last_line_collapses_and_relocks_charges() {
        let draft = DraftBuilder::new(DocumentDirection::Inbound)
            .line(ProductFixtures::dough(), dec!(2), dec!(10.50), dec!(0))
            .charge(ChargeKind::Freight, dec!(5.00))
            .build();
        assert_eq!(draft.stage(today()), GateStage::ItemsPresent);

        let collapsed = draft
            .apply(DraftEdit::RemoveLine { sequence: 1 }, today())
            .unwrap();
        assert_eq!(collapsed.stage(today()), GateStage::HeaderComplete);
        assert_money_eq(&collapsed.charges().freight, dec!(5.00));
        assert!(!collapsed.access(today()).charges);

        let err = collapsed
            .apply(
                DraftEdit::SetCharge {
                    kind: ChargeKind::Freight,
                    amount: Money::new(dec!(1.00)),
                },
                today(),
            )
            .unwrap_err();
        assert_precondition(&err);

        let restored = collapsed
            .apply(
                DraftEdit::AddLine {
                    candidate: LineCandidateBuilder::new(ProductFixtures::dough())
                        .quantity(dec!(2))
                        .build(),
                },
                today(),
            )
            .unwrap();
        assert_eq!(restored.stage(today()), GateStage::ItemsPresent);
        assert_eq!(restored.lines()[0].sequence(), 2);
        assert_money_eq(&restored.lines()[0].landed_total(), dec!(26.00));
    }

    #[test]
    fn test_vehicle_plate_requires_carrier() {
        let draft = DraftBuilder::new(DocumentDirection::Inbound)
            .line(ProductFixtures::dough(), dec!(1), dec!(10.50), dec!(0))
            .build();
        assert!(!draft.access(today()).vehicle_plate);

        let err = draft
            .apply(
                DraftEdit::SetVehiclePlate {
                    plate: Some("ABC1D23".to_string()),
                },
                today(),
            )
            .unwrap_err();
        assert_precondition(&err);

        let with_carrier = draft
            .apply(
                DraftEdit::SetCarrier {
                    carrier: Some(CarrierFixtures::rapido()),
                },
                today(),
            )
            .unwrap();
        assert!(with_carrier.access(today()).vehicle_plate);
    }
}

// ============================================================================
// Date Rules
// ============================================================================

mod date_tests {
    use super::*;

    #[test]
    fn test_future_issue_date_rejected() {
        let draft = DraftBuilder::blank(DocumentDirection::Inbound).build();
        let err = draft
            .apply(
                DraftEdit::SetIssueDate {
                    date: Some(DateFixtures::tomorrow()),
                },
                today(),
            )
            .unwrap_err();

        assert_rejected_on(&err, DraftField::IssueDate);
        assert!(draft.header().issue_date().is_none());
    }

    #[test]
    fn test_arrival_before_issue_rejected_and_draft_unchanged() {
        let draft = DraftBuilder::new(DocumentDirection::Inbound).build();
        let before = draft.clone();

        let err = draft
            .apply(
                DraftEdit::SetArrivalOrDepartureDate {
                    date: DateFixtures::issue_date().pred_opt(),
                },
                today(),
            )
            .unwrap_err();

        assert_rejected_on(&err, DraftField::ArrivalOrDepartureDate);
        assert_eq!(draft, before);
    }

    #[test]
    fn test_arrival_may_be_after_today() {
        let draft = DraftBuilder::new(DocumentDirection::Inbound)
            .movement_date(Some(DateFixtures::tomorrow()))
            .build();
        assert_eq!(draft.stage(today()), GateStage::HeaderComplete);
    }
}

// ============================================================================
// Header Locking and References
// ============================================================================

mod header_tests {
    use super::*;

    #[test]
    fn test_counterparty_locked_while_lines_exist() {
        let draft = DraftBuilder::new(DocumentDirection::Inbound)
            .line(ProductFixtures::dough(), dec!(1), dec!(10.50), dec!(0))
            .build();

        let err = draft
            .apply(
                DraftEdit::SetCounterparty {
                    counterparty: Some(CounterpartyFixtures::customer()),
                },
                today(),
            )
            .unwrap_err();
        assert_precondition(&err);

        let cleared = draft
            .apply(DraftEdit::ClearLines { confirmed: true }, today())
            .unwrap();
        assert!(cleared
            .apply(
                DraftEdit::SetCounterparty {
                    counterparty: Some(CounterpartyFixtures::customer()),
                },
                today(),
            )
            .is_ok());
    }

    #[test]
    fn test_counterparty_copies_default_payment_condition() {
        let draft = DraftBuilder::new(DocumentDirection::Inbound).build();
        assert_eq!(
            draft.payment_condition_id(),
            Some(PaymentConditionFixtures::split_30_60().id)
        );
        assert!(draft.header().document_key().is_some());
    }

    #[test]
    fn test_carrier_change_drops_foreign_plate() {
        let draft = DraftBuilder::new(DocumentDirection::Outbound)
            .line(ProductFixtures::dough(), dec!(1), dec!(10.50), dec!(0))
            .edit(DraftEdit::SetCarrier {
                carrier: Some(CarrierFixtures::rapido()),
            })
            .edit(DraftEdit::SetVehiclePlate {
                plate: Some("abc1d23".to_string()),
            })
            .build();
        assert_eq!(draft.vehicle_plate(), Some("ABC1D23"));

        let err = draft
            .apply(
                DraftEdit::SetVehiclePlate {
                    plate: Some("QRS4T56".to_string()),
                },
                today(),
            )
            .unwrap_err();
        assert_rejected_on(&err, DraftField::VehiclePlate);

        let switched = draft
            .apply(
                DraftEdit::SetCarrier {
                    carrier: Some(CarrierFixtures::norte()),
                },
                today(),
            )
            .unwrap();
        assert!(switched.vehicle_plate().is_none());
    }

    #[test]
    fn test_freight_type_and_notes() {
        let draft = DraftBuilder::new(DocumentDirection::Inbound)
            .line(ProductFixtures::dough(), dec!(1), dec!(10.50), dec!(0))
            .edit(DraftEdit::SetFreightType {
                freight_type: FreightType::Fob,
            })
            .edit(DraftEdit::SetNotes {
                notes: "Deliver to back door".to_string(),
            })
            .build();

        assert_eq!(draft.freight_type(), FreightType::Fob);
        assert_eq!(draft.notes(), "Deliver to back door");
    }
}

// ============================================================================
// Lifecycle
// ============================================================================

mod lifecycle_tests {
    use super::*;

    #[test]
    fn test_submit_then_hydrate_as_persisted() {
        let draft = two_line_builder().build();
        let (submitted, snapshot) = draft.submit(today()).unwrap();
        assert_eq!(submitted.status(), DraftStatus::Submitted);
        assert_eq!(snapshot.status, DraftStatus::Submitted);

        let err = submitted
            .apply(DraftEdit::SetNotes { notes: "x".to_string() }, today())
            .unwrap_err();
        assert_precondition(&err);

        let hydrated = InvoiceDraft::hydrate(&snapshot, today()).unwrap();
        assert_eq!(hydrated.origin(), DraftOrigin::Persisted);
        assert_eq!(hydrated.status(), DraftStatus::Open);
        assert_eq!(hydrated.id(), draft.id());
        assert_eq!(hydrated.stage(today()), GateStage::ItemsPresent);

        let rehydrated_snapshot = DraftSnapshot::capture(&hydrated, today()).unwrap();
        assert_eq!(rehydrated_snapshot.lines, snapshot.lines);
        assert_eq!(rehydrated_snapshot.totals, snapshot.totals);
    }

    #[test]
    fn test_persisted_draft_freezes_identity_and_lines() {
        let (_, snapshot) = two_line_builder().build().submit(today()).unwrap();
        let hydrated = InvoiceDraft::hydrate(&snapshot, today()).unwrap();

        for edit in [
            DraftEdit::SetDocumentNumber { value: "999".to_string() },
            DraftEdit::RemoveLine { sequence: 1 },
            DraftEdit::ClearLines { confirmed: true },
            DraftEdit::AddLine {
                candidate: LineCandidateBuilder::new(ProductFixtures::basil()).build(),
            },
        ] {
            assert_precondition(&hydrated.apply(edit, today()).unwrap_err());
        }

        let access = hydrated.access(today());
        assert!(!access.header_identity);
        assert!(!access.line_entry);
        assert!(access.charges);

        let updated = hydrated
            .apply(
                DraftEdit::SetCharge {
                    kind: ChargeKind::Freight,
                    amount: Money::new(dec!(6.00)),
                },
                today(),
            )
            .unwrap();
        assert_money_eq(&updated.totals().grand_total, dec!(40.00));
    }

    #[test]
    fn test_hydrate_rejects_inconsistent_snapshot() {
        let (_, mut snapshot) = two_line_builder().build().submit(today()).unwrap();
        snapshot.lines[1].quantity = dec!(0);

        let err = InvoiceDraft::hydrate(&snapshot, today()).unwrap_err();
        assert_rejected_on(&err, DraftField::Quantity);
    }

    #[test]
    fn test_submit_requires_lines() {
        let err = DraftBuilder::new(DocumentDirection::Inbound)
            .build()
            .submit(today())
            .unwrap_err();
        assert_rejected_on(&err, DraftField::Lines);
    }

    #[test]
    fn test_controller_session() {
        let mut controller = DraftController::open(
            DocumentDirection::Outbound,
            Arc::new(FixedClock(today())),
        );
        for edit in DraftBuilder::new(DocumentDirection::Outbound)
            .line(ProductFixtures::dough(), dec!(2), dec!(10.50), dec!(0))
            .charge(ChargeKind::Freight, dec!(5.00))
            .edits()
        {
            controller.dispatch(edit).unwrap();
        }

        let snapshot = controller.submit().unwrap();
        assert_money_eq(&snapshot.totals.grand_total, dec!(26.00));

        let mut reopened = DraftController::hydrate(&snapshot, DateFixtures::clock()).unwrap();
        assert_eq!(reopened.draft().origin(), DraftOrigin::Persisted);
        assert!(reopened
            .dispatch(DraftEdit::SetNotes { notes: "reopened".to_string() })
            .is_ok());
    }
}

// ============================================================================
// Decimal Range Limits
// ============================================================================

mod overflow_tests {
    use super::*;
    use rust_decimal::Decimal;

    fn fully_discounted_draft() -> InvoiceDraft {
        DraftBuilder::new(DocumentDirection::Inbound)
            .line(ProductFixtures::basil(), dec!(4), dec!(1.00), dec!(4.00))
            .build()
    }

    #[test]
    fn test_add_line_beyond_decimal_range_rejected() {
        let draft = DraftBuilder::new(DocumentDirection::Inbound)
            .line(ProductFixtures::dough(), dec!(2), dec!(10.50), dec!(0))
            .build();
        let before = draft.clone();

        let candidate = LineCandidateBuilder::new(ProductFixtures::basil())
            .quantity(dec!(2))
            .unit_price(Decimal::MAX)
            .build();
        let err = draft
            .apply(DraftEdit::AddLine { candidate }, today())
            .unwrap_err();

        assert_rejected_on(&err, DraftField::UnitPrice);
        assert_eq!(draft, before);
        assert_eq!(draft.lines().len(), 1);
    }

    #[test]
    fn test_line_near_limit_with_charge_rejected() {
        let draft = DraftBuilder::new(DocumentDirection::Inbound)
            .line(ProductFixtures::basil(), dec!(1), Decimal::MAX, dec!(0))
            .build();
        let before = draft.clone();

        let err = draft
            .apply(
                DraftEdit::SetCharge {
                    kind: ChargeKind::Freight,
                    amount: Money::new(dec!(1.00)),
                },
                today(),
            )
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::ValidationRejected);
        assert_eq!(draft, before);
    }

    #[test]
    fn test_charges_beyond_decimal_range_on_zero_basis_rejected() {
        let draft = fully_discounted_draft()
            .apply(
                DraftEdit::SetCharge {
                    kind: ChargeKind::Freight,
                    amount: Money::new(Decimal::MAX),
                },
                today(),
            )
            .unwrap();
        assert_eq!(draft.totals().unallocated_charges, Money::new(Decimal::MAX));
        let before = draft.clone();

        let err = draft
            .apply(
                DraftEdit::SetCharge {
                    kind: ChargeKind::Insurance,
                    amount: Money::new(Decimal::MAX),
                },
                today(),
            )
            .unwrap_err();

        assert_rejected_on(&err, DraftField::InsuranceAmount);
        assert_eq!(draft, before);
        assert_eq!(draft.totals().grand_total, Money::new(Decimal::MAX));
    }

    #[test]
    fn test_controller_keeps_draft_after_overflowing_edit() {
        let mut controller = DraftController::open(
            DocumentDirection::Inbound,
            Arc::new(FixedClock(today())),
        );
        for edit in DraftBuilder::new(DocumentDirection::Inbound)
            .line(ProductFixtures::basil(), dec!(4), dec!(1.00), dec!(4.00))
            .charge(ChargeKind::Freight, Decimal::MAX)
            .edits()
        {
            controller.dispatch(edit).unwrap();
        }
        let before = controller.draft().clone();

        let err = controller
            .dispatch(DraftEdit::SetCharge {
                kind: ChargeKind::OtherExpenses,
                amount: Money::new(Decimal::MAX),
            })
            .unwrap_err();

        assert_rejected_on(&err, DraftField::OtherExpensesAmount);
        assert_eq!(controller.draft(), &before);
    }

    #[test]
    fn test_hydrate_rejects_charges_beyond_decimal_range() {
        let (_, mut snapshot) = two_line_builder().build().submit(today()).unwrap();
        snapshot.freight_amount = Money::new(Decimal::MAX);
        snapshot.insurance_amount = Money::new(Decimal::MAX);

        let err = InvoiceDraft::hydrate(&snapshot, today()).unwrap_err();
        assert_rejected_on(&err, DraftField::InsuranceAmount);
    }

    #[test]
    fn test_hydrate_rejects_line_value_beyond_decimal_range() {
        let (_, mut snapshot) = two_line_builder().build().submit(today()).unwrap();
        snapshot.lines[0].unit_price = Money::new(Decimal::MAX);
        snapshot.lines[0].quantity = dec!(2);

        let err = InvoiceDraft::hydrate(&snapshot, today()).unwrap_err();
        assert_rejected_on(&err, DraftField::UnitPrice);
    }
}

// ============================================================================
// Reference Data Service
// ============================================================================

mod service_tests {
    use super::*;

    #[tokio::test]
    async fn test_service_edits_drive_a_draft() {
        let service = DraftService::new(seeded_reference_port().await);
        let supplier = CounterpartyFixtures::supplier();

        let mut draft = DraftBuilder::new(DocumentDirection::Inbound)
            .counterparty(None)
            .build();
        draft = draft
            .apply(
                service
                    .counterparty_edit(DocumentDirection::Inbound, supplier.id)
                    .await
                    .unwrap(),
                today(),
            )
            .unwrap();

        let candidate = service
            .line_candidate(ProductFixtures::dough().id, dec!(2), None, Money::zero())
            .await
            .unwrap();
        draft = draft.apply(DraftEdit::AddLine { candidate }, today()).unwrap();
        assert_money_eq(&draft.lines()[0].unit_price(), dec!(10.50));

        draft = draft
            .apply(
                service
                    .payment_condition_edit(PaymentConditionFixtures::cash().id)
                    .await
                    .unwrap(),
                today(),
            )
            .unwrap();
        assert_eq!(
            draft.payment_condition_id(),
            Some(PaymentConditionFixtures::cash().id)
        );
    }

    #[tokio::test]
    async fn test_customer_is_not_a_supplier() {
        let service = DraftService::new(seeded_reference_port().await);

        let err: DraftError = service
            .counterparty_edit(DocumentDirection::Inbound, CounterpartyFixtures::customer().id)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ExternalLookupFailure);
    }
}
