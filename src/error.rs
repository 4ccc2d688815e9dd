use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Error taxonomy surfaced by the inventory core.
///
/// Every variant maps to a stable HTTP status; internal detail (storage
/// state, panics) never reaches the response body.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed or missing input. The caller can correct and retry.
    #[error("{0}")]
    InvalidArgument(String),

    /// Unknown event/section/row, or a mismatched parent/child pair.
    #[error("{0}")]
    NotFound(String),

    /// Legitimate business rejection: the row cannot hold the requested
    /// quantity at commit time. Never retried internally.
    #[error("Not enough seats available")]
    CapacityExceeded,

    /// Transient failure to win the row's commit scope. Retryable.
    #[error("Booking failed. Please try again.")]
    Contention,

    /// Structured field-level validation failures from the request boundary.
    #[error("Validation failed")]
    Validation(#[from] validator::ValidationErrors),

    /// Unexpected failure. Surfaced as an opaque 500.
    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl Error {
    pub fn status(&self) -> StatusCode {
        match self {
            Error::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::CapacityExceeded | Error::Contention => StatusCode::CONFLICT,
            Error::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match &self {
            Error::Validation(errors) => {
                // Mirror the express-validator errors.array() shape:
                // one entry per failed field.
                let details: Vec<_> = errors
                    .field_errors()
                    .iter()
                    .flat_map(|(field, errs)| {
                        errs.iter().map(move |e| {
                            json!({
                                "path": field,
                                "msg": e
                                    .message
                                    .as_deref()
                                    .unwrap_or("Invalid value")
                                    .to_string(),
                            })
                        })
                    })
                    .collect();
                json!({ "success": false, "errors": details })
            }
            Error::Internal(err) => {
                tracing::error!("internal error: {:?}", err);
                json!({ "success": false, "message": "Internal server error" })
            }
            other => json!({ "success": false, "message": other.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}
