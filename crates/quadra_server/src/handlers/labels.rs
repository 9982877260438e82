//! Label endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::info;

use crate::error::ApiResult;
use crate::state::AppState;
use quadra_db::{Label, LabelPatch, NewLabel};

/// POST /matrices/{matrix_id}/labels
pub async fn create_label(
    State(state): State<AppState>,
    Path(matrix_id): Path<String>,
    Json(payload): Json<NewLabel>,
) -> ApiResult<(StatusCode, Json<Label>)> {
    let label = state.db.create_label(&matrix_id, payload).await?;
    info!(matrix_id = %matrix_id, label_id = label.id, name = %label.name, "Label created");
    Ok((StatusCode::CREATED, Json(label)))
}

/// GET /matrices/{matrix_id}/labels
pub async fn list_labels(
    State(state): State<AppState>,
    Path(matrix_id): Path<String>,
) -> ApiResult<Json<Vec<Label>>> {
    let labels = state.db.list_labels(&matrix_id).await?;
    Ok(Json(labels))
}

/// PUT /matrices/{matrix_id}/labels/{label_id}
pub async fn update_label(
    State(state): State<AppState>,
    Path((matrix_id, label_id)): Path<(String, i64)>,
    Json(payload): Json<LabelPatch>,
) -> ApiResult<Json<Label>> {
    let label = state.db.update_label(&matrix_id, label_id, payload).await?;
    Ok(Json(label))
}

/// DELETE /matrices/{matrix_id}/labels/{label_id}
pub async fn delete_label(
    State(state): State<AppState>,
    Path((matrix_id, label_id)): Path<(String, i64)>,
) -> ApiResult<StatusCode> {
    state.db.delete_label(&matrix_id, label_id).await?;
    info!(matrix_id = %matrix_id, label_id, "Label deleted");
    Ok(StatusCode::NO_CONTENT)
}
