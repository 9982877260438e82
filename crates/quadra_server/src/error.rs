//! HTTP mapping for database errors.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use quadra_db::DbError;
use serde::Serialize;
use tracing::error;

/// Handler result type.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Body shape for every failure response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Wraps `DbError` so handlers can bubble it up with `?`.
///
/// NotFound maps to 404 and Conflict to 409, each carrying the message that
/// names the missing or conflicting resource. Anything else is an
/// infrastructure failure: logged, surfaced as a generic 500.
#[derive(Debug)]
pub struct ApiError(DbError);

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self.0 {
            DbError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            DbError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            err => {
                error!(error = %err, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
