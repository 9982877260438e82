//! Request handlers, one module per resource.
//!
//! Handlers stay thin: extract, invoke one database operation, render the
//! result. All error mapping lives in [`crate::error`].

pub mod labels;
pub mod matrices;
pub mod tasks;

use axum::Json;
use serde_json::{json, Value};

/// GET / welcome body.
pub async fn root() -> Json<Value> {
    Json(json!({ "message": "Welcome to the Collaborative Eisenhower Matrix API" }))
}
