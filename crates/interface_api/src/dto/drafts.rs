//! Invoice draft DTOs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use domain_invoicing::{DocumentDirection, DraftEdit, DraftSnapshot};

const MAX_DOCUMENT_NUMBER: usize = 20;
const MAX_DOCUMENT_MODEL: usize = 4;
const MAX_DOCUMENT_SERIES: usize = 3;
const MAX_VEHICLE_PLATE: usize = 10;
const MAX_NOTES: usize = 2000;

/// Replays a list of edits against a new or persisted draft
#[derive(Debug, Deserialize, Validate)]
pub struct PreviewRequest {
    pub direction: DocumentDirection,

    /// Persisted document to edit; the draft starts empty when absent
    #[serde(default)]
    pub persisted: Option<DraftSnapshot>,

    /// Overrides the server's calendar date
    #[serde(default)]
    pub today: Option<NaiveDate>,

    #[serde(default)]
    #[validate(
        length(max = 500, message = "Too many edits in one preview"),
        custom(function = "validate_edits")
    )]
    pub edits: Vec<DraftEdit>,

    /// Submit the draft after the last edit
    #[serde(default)]
    pub submit: bool,
}

#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    pub applied_edits: usize,
    pub submitted: bool,
    pub snapshot: DraftSnapshot,
}

fn validate_edits(edits: &[DraftEdit]) -> Result<(), ValidationError> {
    for edit in edits {
        let (value, max) = match edit {
            DraftEdit::SetDocumentNumber { value } => (value.as_str(), MAX_DOCUMENT_NUMBER),
            DraftEdit::SetDocumentModel { value } => (value.as_str(), MAX_DOCUMENT_MODEL),
            DraftEdit::SetDocumentSeries { value } => (value.as_str(), MAX_DOCUMENT_SERIES),
            DraftEdit::SetVehiclePlate { plate: Some(plate) } => (plate.as_str(), MAX_VEHICLE_PLATE),
            DraftEdit::SetNotes { notes } => (notes.as_str(), MAX_NOTES),
            _ => continue,
        };
        if value.trim().chars().count() > max {
            let mut err = ValidationError::new("length");
            err.message = Some(format!("{} accepts at most {} characters", edit.action(), max).into());
            return Err(err);
        }
    }
    Ok(())
}
