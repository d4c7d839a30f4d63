//! Invoice draft errors
//!
//! Every rejected edit is reported through [`DraftError`]. None of these
//! errors is fatal: the draft that produced them is left exactly as it was.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use core_kernel::{MoneyError, PortError};

/// Draft fields an edit can be rejected on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftField {
    DocumentNumber,
    DocumentModel,
    DocumentSeries,
    Counterparty,
    IssueDate,
    ArrivalOrDepartureDate,
    Product,
    Quantity,
    UnitPrice,
    LineDiscount,
    Lines,
    FreightType,
    FreightAmount,
    InsuranceAmount,
    OtherExpensesAmount,
    PaymentCondition,
    Carrier,
    VehiclePlate,
    Notes,
}

impl DraftField {
    /// Returns the wire name of the field
    pub fn as_str(&self) -> &'static str {
        match self {
            DraftField::DocumentNumber => "document_number",
            DraftField::DocumentModel => "document_model",
            DraftField::DocumentSeries => "document_series",
            DraftField::Counterparty => "counterparty",
            DraftField::IssueDate => "issue_date",
            DraftField::ArrivalOrDepartureDate => "arrival_or_departure_date",
            DraftField::Product => "product",
            DraftField::Quantity => "quantity",
            DraftField::UnitPrice => "unit_price",
            DraftField::LineDiscount => "line_discount",
            DraftField::Lines => "lines",
            DraftField::FreightType => "freight_type",
            DraftField::FreightAmount => "freight_amount",
            DraftField::InsuranceAmount => "insurance_amount",
            DraftField::OtherExpensesAmount => "other_expenses_amount",
            DraftField::PaymentCondition => "payment_condition",
            DraftField::Carrier => "carrier",
            DraftField::VehiclePlate => "vehicle_plate",
            DraftField::Notes => "notes",
        }
    }
}

impl fmt::Display for DraftField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse classification of a [`DraftError`], used by callers that only need
/// to decide how to report the rejection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    ValidationRejected,
    PreconditionNotMet,
    ExternalLookupFailure,
}

/// Errors that can occur while editing an invoice draft
#[derive(Debug, Error)]
pub enum DraftError {
    /// An edit violates an invariant of the draft
    #[error("Validation rejected on {field}: {reason}")]
    ValidationRejected {
        field: DraftField,
        reason: String,
    },

    /// An action was attempted before the section it belongs to was unlocked
    #[error("Precondition not met for {action}: {reason}")]
    PreconditionNotMet {
        action: &'static str,
        reason: String,
    },

    /// A reference-data collaborator failed to resolve a reference
    #[error("External lookup failed for {reference}: {source}")]
    ExternalLookupFailure {
        reference: String,
        #[source]
        source: PortError,
    },
}

impl DraftError {
    /// Creates a validation rejection
    pub fn validation(field: DraftField, reason: impl Into<String>) -> Self {
        DraftError::ValidationRejected {
            field,
            reason: reason.into(),
        }
    }

    /// Creates a precondition failure
    pub fn precondition(action: &'static str, reason: impl Into<String>) -> Self {
        DraftError::PreconditionNotMet {
            action,
            reason: reason.into(),
        }
    }

    /// Creates an external lookup failure
    pub fn lookup(reference: impl fmt::Display, source: PortError) -> Self {
        DraftError::ExternalLookupFailure {
            reference: reference.to_string(),
            source,
        }
    }

    /// Returns the kind of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            DraftError::ValidationRejected { .. } => ErrorKind::ValidationRejected,
            DraftError::PreconditionNotMet { .. } => ErrorKind::PreconditionNotMet,
            DraftError::ExternalLookupFailure { .. } => ErrorKind::ExternalLookupFailure,
        }
    }

    /// Returns the field a validation rejection refers to
    pub fn field(&self) -> Option<DraftField> {
        match self {
            DraftError::ValidationRejected { field, .. } => Some(*field),
            _ => None,
        }
    }
}

/// Arithmetic that leaves the representable range turns the offending edit
/// into a rejected one.
impl From<MoneyError> for DraftError {
    fn from(err: MoneyError) -> Self {
        DraftError::validation(DraftField::Lines, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_message() {
        let err = DraftError::validation(DraftField::Quantity, "must be positive");
        assert_eq!(err.kind(), ErrorKind::ValidationRejected);
        assert_eq!(err.field(), Some(DraftField::Quantity));
        assert_eq!(err.to_string(), "Validation rejected on quantity: must be positive");
    }

    #[test]
    fn test_lookup_error_keeps_source() {
        let err = DraftError::lookup("product PRD-1", PortError::unavailable("catalogue"));
        assert_eq!(err.kind(), ErrorKind::ExternalLookupFailure);
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.field().is_none());
    }

    #[test]
    fn test_money_error_becomes_rejection() {
        let err: DraftError = MoneyError::Overflow.into();
        assert_eq!(err.kind(), ErrorKind::ValidationRejected);
    }
}
