//! API error handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use domain_invoicing::{DraftError, DraftField, ErrorKind};

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// A draft edit or submission was rejected
    #[error("{source}")]
    Draft {
        /// Position of the rejected edit in the request, if an edit was rejected
        edit_index: Option<usize>,
        #[source]
        source: DraftError,
    },
}

impl ApiError {
    /// Wraps a rejection of the edit at `index`
    pub fn rejected_at(index: usize, source: DraftError) -> Self {
        ApiError::Draft {
            edit_index: Some(index),
            source,
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<DraftField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edit_index: Option<usize>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, field, edit_index) = match &self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request", None, None),
            ApiError::Validation(_) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error",
                None,
                None,
            ),
            ApiError::Draft { edit_index, source } => {
                let (status, error_type) = match source.kind() {
                    ErrorKind::ValidationRejected => {
                        (StatusCode::UNPROCESSABLE_ENTITY, "validation_rejected")
                    }
                    ErrorKind::PreconditionNotMet => (StatusCode::CONFLICT, "precondition_not_met"),
                    ErrorKind::ExternalLookupFailure => {
                        (StatusCode::BAD_GATEWAY, "external_lookup_failure")
                    }
                };
                (status, error_type, source.field(), *edit_index)
            }
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message: self.to_string(),
            field,
            edit_index,
        };

        (status, Json(body)).into_response()
    }
}

impl From<DraftError> for ApiError {
    fn from(source: DraftError) -> Self {
        ApiError::Draft {
            edit_index: None,
            source,
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        ApiError::Validation(err.to_string())
    }
}
