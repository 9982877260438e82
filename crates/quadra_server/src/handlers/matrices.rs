//! Matrix endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::error::ApiResult;
use crate::state::AppState;
use quadra_db::MatrixDetail;

/// Matrix creation response: the stored row plus the derived sharable link.
#[derive(Debug, Serialize)]
pub struct MatrixResponse {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub sharable_link: String,
}

/// POST /matrices
pub async fn create_matrix(
    State(state): State<AppState>,
) -> ApiResult<(StatusCode, Json<MatrixResponse>)> {
    let matrix = state.db.create_matrix().await?;
    info!(matrix_id = %matrix.id, "Matrix created");

    let sharable_link = state.sharable_link(&matrix.id);
    Ok((
        StatusCode::CREATED,
        Json(MatrixResponse {
            id: matrix.id,
            created_at: matrix.created_at,
            updated_at: matrix.updated_at,
            sharable_link,
        }),
    ))
}

/// GET /matrices/{matrix_id}
pub async fn get_matrix(
    State(state): State<AppState>,
    Path(matrix_id): Path<String>,
) -> ApiResult<Json<MatrixDetail>> {
    let detail = state.db.get_matrix(&matrix_id).await?;
    Ok(Json(detail))
}

/// DELETE /matrices/{matrix_id}
pub async fn delete_matrix(
    State(state): State<AppState>,
    Path(matrix_id): Path<String>,
) -> ApiResult<StatusCode> {
    state.db.delete_matrix(&matrix_id).await?;
    info!(matrix_id = %matrix_id, "Matrix deleted");
    Ok(StatusCode::NO_CONTENT)
}
