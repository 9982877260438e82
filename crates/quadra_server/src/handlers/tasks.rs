//! Task endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::info;

use crate::error::ApiResult;
use crate::state::AppState;
use quadra_db::{NewTask, Task, TaskPatch};

/// POST /matrices/{matrix_id}/tasks
pub async fn create_task(
    State(state): State<AppState>,
    Path(matrix_id): Path<String>,
    Json(payload): Json<NewTask>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let task = state.db.create_task(&matrix_id, payload).await?;
    info!(matrix_id = %matrix_id, task_id = task.id, "Task created");
    Ok((StatusCode::CREATED, Json(task)))
}

/// GET /matrices/{matrix_id}/tasks
pub async fn list_tasks(
    State(state): State<AppState>,
    Path(matrix_id): Path<String>,
) -> ApiResult<Json<Vec<Task>>> {
    let tasks = state.db.list_tasks(&matrix_id).await?;
    Ok(Json(tasks))
}

/// PUT /matrices/{matrix_id}/tasks/{task_id}
pub async fn update_task(
    State(state): State<AppState>,
    Path((matrix_id, task_id)): Path<(String, i64)>,
    Json(payload): Json<TaskPatch>,
) -> ApiResult<Json<Task>> {
    let task = state.db.update_task(&matrix_id, task_id, payload).await?;
    Ok(Json(task))
}

/// DELETE /matrices/{matrix_id}/tasks/{task_id}
pub async fn delete_task(
    State(state): State<AppState>,
    Path((matrix_id, task_id)): Path<(String, i64)>,
) -> ApiResult<StatusCode> {
    state.db.delete_task(&matrix_id, task_id).await?;
    info!(matrix_id = %matrix_id, task_id, "Task deleted");
    Ok(StatusCode::NO_CONTENT)
}
