//! Custom Test Assertions
//!
//! Provides specialized assertion helpers for money, drafts and snapshots
//! that give more meaningful error messages than standard assertions.

use core_kernel::Money;
use domain_invoicing::{DraftError, DraftField, DraftSnapshot, ErrorKind};
use rust_decimal::Decimal;

/// Asserts that two Money values are approximately equal within a tolerance
///
/// # Panics
///
/// Panics if the amounts differ by more than tolerance
pub fn assert_money_approx_eq(actual: &Money, expected: &Money, tolerance: Decimal) {
    let diff = (actual.amount() - expected.amount()).abs();
    assert!(
        diff <= tolerance,
        "Money amounts differ by more than tolerance: actual={}, expected={}, diff={}, tolerance={}",
        actual.amount(),
        expected.amount(),
        diff,
        tolerance
    );
}

/// Asserts that a Money value equals a decimal exactly (scale is ignored)
pub fn assert_money_eq(actual: &Money, expected: Decimal) {
    assert_eq!(
        actual.amount(),
        expected,
        "Expected money {}, got {}",
        expected,
        actual.amount()
    );
}

/// Asserts that money values sum to a total exactly
pub fn assert_money_sum_equals(parts: &[Money], total: &Money) {
    let sum: Money = parts.iter().sum();
    assert_eq!(
        sum.amount(),
        total.amount(),
        "Sum of parts ({}) doesn't equal total ({})",
        sum.amount(),
        total.amount()
    );
}

/// Asserts that a value has at most two fractional digits
pub fn assert_cents(money: &Money) {
    assert_eq!(
        money.round_for_display().amount(),
        money.amount(),
        "{} is not a whole number of cents",
        money.amount()
    );
}

/// Asserts every displayed figure of a snapshot reconciles exactly
///
/// - each charge equals the sum of its displayed shares, unless unallocated
/// - each landed total equals gross plus shares
/// - the grand total equals the landed totals plus unallocated charges
pub fn assert_snapshot_reconciles(snapshot: &DraftSnapshot) {
    let totals = &snapshot.totals;
    if totals.unallocated_charges.is_zero() {
        let freight: Vec<Money> = snapshot.lines.iter().map(|l| l.allocated_freight).collect();
        let insurance: Vec<Money> = snapshot.lines.iter().map(|l| l.allocated_insurance).collect();
        let other: Vec<Money> = snapshot
            .lines
            .iter()
            .map(|l| l.allocated_other_expenses)
            .collect();
        assert_money_sum_equals(&freight, &totals.freight);
        assert_money_sum_equals(&insurance, &totals.insurance);
        assert_money_sum_equals(&other, &totals.other_expenses);
    } else {
        assert_eq!(totals.unallocated_charges, totals.charges_total);
        for line in &snapshot.lines {
            assert!(line.allocated_total().is_zero(), "line {} received a share", line.sequence);
        }
    }

    for line in &snapshot.lines {
        assert_cents(&line.gross_amount);
        assert_eq!(
            line.landed_total.amount(),
            (line.gross_amount + line.allocated_total()).amount(),
            "landed total of line {} does not reconcile",
            line.sequence
        );
    }

    let landed_sum = snapshot.landed_sum().expect("landed totals overflow");
    assert_eq!(
        totals.grand_total.amount(),
        (landed_sum + totals.unallocated_charges).amount(),
        "grand total {} != landed sum {} + unallocated {}",
        totals.grand_total,
        landed_sum,
        totals.unallocated_charges
    );
}

/// Asserts that an error is a validation rejection on `field`
pub fn assert_rejected_on(err: &DraftError, field: DraftField) {
    assert_eq!(
        err.field(),
        Some(field),
        "Expected validation rejection on {}, got {:?}",
        field,
        err
    );
}

/// Asserts that an error is a precondition failure
pub fn assert_precondition(err: &DraftError) {
    assert_eq!(
        err.kind(),
        ErrorKind::PreconditionNotMet,
        "Expected precondition failure, got {:?}",
        err
    );
}

/// Asserts that a result is Ok and returns the value
#[macro_export]
macro_rules! assert_ok {
    ($result:expr) => {
        match $result {
            Ok(value) => value,
            Err(e) => panic!("Expected Ok, got Err: {:?}", e),
        }
    };
    ($result:expr, $msg:expr) => {
        match $result {
            Ok(value) => value,
            Err(e) => panic!("{}: {:?}", $msg, e),
        }
    };
}

/// Asserts that a result is Err and returns the error
#[macro_export]
macro_rules! assert_err {
    ($result:expr) => {
        match $result {
            Ok(value) => panic!("Expected Err, got Ok: {:?}", value),
            Err(e) => e,
        }
    };
}
