//! Progressive entry gate
//!
//! Sections of a draft unlock in order: the header first, then line entry,
//! then the charges and logistics fields once lines exist. The stage is a
//! projection of the draft and is re-derived on every evaluation, so removing
//! the last line drops the draft back to [`GateStage::HeaderComplete`]
//! without any bookkeeping.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::draft::{DraftOrigin, InvoiceDraft};

/// Stage of the progressive gate, ordered from least to most unlocked
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateStage {
    HeaderIncomplete,
    HeaderComplete,
    ItemsPresent,
}

impl GateStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            GateStage::HeaderIncomplete => "header_incomplete",
            GateStage::HeaderComplete => "header_complete",
            GateStage::ItemsPresent => "items_present",
        }
    }

    /// The stage that follows this one, if any
    pub fn next(&self) -> Option<GateStage> {
        match self {
            GateStage::HeaderIncomplete => Some(GateStage::HeaderComplete),
            GateStage::HeaderComplete => Some(GateStage::ItemsPresent),
            GateStage::ItemsPresent => None,
        }
    }

    /// Whether `draft` satisfies the condition for leaving this stage
    pub fn exit_condition_met(&self, draft: &InvoiceDraft, today: NaiveDate) -> bool {
        match self {
            GateStage::HeaderIncomplete => draft.header().is_complete(today),
            GateStage::HeaderComplete => !draft.lines().is_empty(),
            GateStage::ItemsPresent => false,
        }
    }
}

impl fmt::Display for GateStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derives the current stage of `draft`
pub fn evaluate(draft: &InvoiceDraft, today: NaiveDate) -> GateStage {
    let mut stage = GateStage::HeaderIncomplete;
    while stage.exit_condition_met(draft, today) {
        match stage.next() {
            Some(next) => stage = next,
            None => break,
        }
    }
    stage
}

/// Which parts of a draft accept edits right now
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionAccess {
    /// Document number, model, series and counterparty
    pub header_identity: bool,
    pub dates: bool,
    pub line_entry: bool,
    pub line_removal: bool,
    /// Freight type and the three charge amounts
    pub charges: bool,
    pub payment_condition: bool,
    pub carrier: bool,
    pub vehicle_plate: bool,
    pub notes: bool,
    pub submit: bool,
}

/// Derives the editable sections of `draft`
pub fn section_access(draft: &InvoiceDraft, today: NaiveDate) -> SectionAccess {
    let open = !draft.is_submitted();
    let fresh = open && draft.origin() == DraftOrigin::New;
    let stage = evaluate(draft, today);
    let items = open && stage >= GateStage::ItemsPresent;

    SectionAccess {
        header_identity: fresh && draft.lines().is_empty(),
        dates: open,
        line_entry: fresh && stage >= GateStage::HeaderComplete,
        line_removal: fresh && !draft.lines().is_empty(),
        charges: items,
        payment_condition: items,
        carrier: items,
        vehicle_plate: items && draft.carrier().is_some(),
        notes: open,
        submit: items,
    }
}
