//! Invoice Draft Domain
//!
//! The in-memory core of the purchase and sales invoice screens. A draft
//! collects line items, spreads the shared charges (freight, insurance, other
//! expenses) across them in proportion to their value, derives the landed
//! cost of every line, and unlocks the form section by section.
//!
//! # Components
//!
//! - [`store::LineItemStore`]: ordered, append-only line storage
//! - [`allocation`]: proportional landed-cost allocation
//! - [`totals`]: invoice-level totals
//! - [`gate`]: the progressive entry gate
//! - [`draft::InvoiceDraft`] and [`edit::DraftEdit`]: the aggregate and its
//!   pure reducer
//! - [`controller::DraftController`]: session owner that dispatches edits
//!   and publishes [`snapshot::DraftSnapshot`]s
//!
//! Reference data is resolved outside the draft through
//! [`ports::ReferenceDataPort`] and [`services::DraftService`].

pub mod allocation;
pub mod controller;
pub mod draft;
pub mod edit;
pub mod error;
pub mod gate;
pub mod line;
pub mod ports;
pub mod references;
pub mod services;
pub mod snapshot;
pub mod store;
pub mod totals;

pub use allocation::{allocate, allocation_basis, ChargeKind, ChargeSet, LineAllocation};
pub use controller::DraftController;
pub use draft::{
    DocumentDirection, DocumentKey, DraftHeader, DraftOrigin, DraftStatus, FreightType,
    InvoiceDraft,
};
pub use edit::DraftEdit;
pub use error::{DraftError, DraftField, ErrorKind};
pub use gate::{GateStage, SectionAccess};
pub use line::{LineCandidate, LineItem};
pub use ports::ReferenceDataPort;
#[cfg(any(test, feature = "mock"))]
pub use ports::mock::MockReferenceDataPort;
pub use references::{
    CarrierRef, CounterpartyRef, Installment, PaymentConditionRef, ProductRef, VehicleRef,
};
pub use services::DraftService;
pub use snapshot::{DraftSnapshot, LineSnapshot, TotalsSnapshot};
pub use store::LineItemStore;
pub use totals::{compute_totals, landed_sum, InvoiceTotals};
