//! # Error Handling Middleware
//!
//! Maps `ParkError` values to HTTP status codes and a JSON body of the form
//! `{"error": "<KIND>", "message": "<text>"}`.
//!
//! Storage and internal failures are logged here and answered with an opaque
//! message; their details never reach the client.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use parkslot_core::errors::ParkError;
use serde_json::json;
use tracing::error;

/// Application error wrapper that provides HTTP status code mapping
///
/// # Example
///
/// ```
/// use axum::{extract::Path, Json};
/// use parkslot_api::middleware::error_handling::AppError;
/// use parkslot_core::errors::ParkError;
///
/// async fn handler(Path(number): Path<String>) -> Result<Json<String>, AppError> {
///     Err(AppError(ParkError::NotFound(format!("Slot number {} not found", number))))
/// }
/// # fn main() {}
/// ```
#[derive(Debug)]
pub struct AppError(pub ParkError);

/// HTTP status for each error kind.
pub fn status_for(err: &ParkError) -> StatusCode {
    match err {
        ParkError::NotFound(_) => StatusCode::NOT_FOUND,
        ParkError::DuplicateSlotNumber(_) => StatusCode::CONFLICT,
        ParkError::SlotInUse(_) => StatusCode::CONFLICT,
        ParkError::SlotUnavailable(_)
        | ParkError::InvalidTransition(_)
        | ParkError::InvalidState(_)
        | ParkError::InvalidArgument(_)
        | ParkError::Validation(_) => StatusCode::BAD_REQUEST,
        ParkError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        ParkError::Forbidden(_) => StatusCode::FORBIDDEN,
        ParkError::Database(_) | ParkError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);

        let message = match &self.0 {
            ParkError::Database(e) => {
                error!(error = ?e, "Storage failure");
                "An internal error occurred".to_string()
            }
            ParkError::Internal(e) => {
                error!(error = %e, "Internal failure");
                "An internal error occurred".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(json!({ "error": self.0.kind(), "message": message }));
        (status, body).into_response()
    }
}

/// Allows `?` on `ParkResult` inside handlers.
impl From<ParkError> for AppError {
    fn from(err: ParkError) -> Self {
        AppError(err)
    }
}
