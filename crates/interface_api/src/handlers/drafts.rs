//! Invoice draft handlers

use std::sync::Arc;

use axum::{extract::State, Json};
use tracing::debug;
use validator::Validate;

use core_kernel::{Clock, FixedClock};
use domain_invoicing::DraftController;

use crate::dto::drafts::{PreviewRequest, PreviewResponse};
use crate::{error::ApiError, AppState};

/// Replays edits through a draft session and returns the resulting snapshot
///
/// Nothing is stored: each request builds its draft from scratch (or from
/// the persisted snapshot it carries) and discards it afterwards.
pub async fn preview_draft(
    State(state): State<AppState>,
    Json(request): Json<PreviewRequest>,
) -> Result<Json<PreviewResponse>, ApiError> {
    request.validate()?;

    let clock: Arc<dyn Clock> = match request.today {
        Some(today) => Arc::new(FixedClock(today)),
        None => state.clock.clone(),
    };

    let mut controller = match &request.persisted {
        Some(persisted) => {
            if persisted.direction != request.direction {
                return Err(ApiError::BadRequest(format!(
                    "persisted document is {:?}, request is {:?}",
                    persisted.direction, request.direction
                )));
            }
            DraftController::hydrate(persisted, clock)?
        }
        None => DraftController::open(request.direction, clock),
    };

    let mut snapshot = controller.snapshot()?;
    let applied_edits = request.edits.len();
    for (index, edit) in request.edits.into_iter().enumerate() {
        snapshot = controller
            .dispatch(edit)
            .map_err(|e| ApiError::rejected_at(index, e))?;
    }

    if request.submit {
        snapshot = controller.submit()?;
    }

    debug!(
        draft_id = %snapshot.id,
        applied_edits,
        stage = %snapshot.stage,
        "Draft preview computed"
    );

    Ok(Json(PreviewResponse {
        applied_edits,
        submitted: request.submit,
        snapshot,
    }))
}
