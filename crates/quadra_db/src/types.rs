//! Unified types for all Quadra database entities.
//!
//! These types are the single source of truth. Entity structs double as
//! response views; payload structs carry validated request input.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

// ============================================================================
// Entities
// ============================================================================

/// A shared workspace holding labels and tasks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Matrix {
    /// Opaque unique identifier (UUIDv4 rendered as text)
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A matrix with its full label and task collections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatrixDetail {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub labels: Vec<Label>,
    pub tasks: Vec<Task>,
}

/// A named, colored tag scoped to one matrix.
///
/// `(matrix_id, name)` is unique; labels in different matrices may share a
/// name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Label {
    pub id: i64,
    pub matrix_id: String,
    pub name: String,
    /// Optional display color, e.g. "#FF5733"
    pub color: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A unit of work scoped to one matrix.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub matrix_id: String,
    pub title: String,
    pub description: Option<String>,
    /// Quadrant bucket. Conventionally one of `urgent_important`,
    /// `urgent_not_important`, `not_urgent_important`,
    /// `not_urgent_not_important`; stored as free text.
    pub quadrant: String,
    /// Associated labels, resolved to full objects
    pub labels: Vec<Label>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ============================================================================
// Request Payloads
// ============================================================================

/// Payload for creating a label.
#[derive(Debug, Clone, Deserialize)]
pub struct NewLabel {
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

/// Partial update for a label. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LabelPatch {
    pub name: Option<String>,
    pub color: Option<String>,
}

/// Payload for creating a task.
#[derive(Debug, Clone, Deserialize)]
pub struct NewTask {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub quadrant: String,
    /// Labels to attach at creation; defaults to none
    #[serde(default, deserialize_with = "null_as_empty")]
    pub label_ids: Vec<i64>,
}

/// Partial update for a task. Absent fields are left unchanged.
///
/// `label_ids` is tri-state: absent leaves the association set untouched,
/// while `null` or a list replaces it wholesale.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub quadrant: Option<String>,
    #[serde(default)]
    pub label_ids: Patch<Vec<i64>>,
}

/// Tri-state field for partial updates: absent, explicit null, or a value.
///
/// Plain `Option` collapses "field missing" and "field: null" into one case;
/// this keeps them apart so task updates can distinguish "leave associations
/// alone" from "clear them".
#[derive(Debug, Clone, PartialEq)]
pub enum Patch<T> {
    /// Field was not present in the payload
    Absent,
    /// Field was present and null
    Null,
    /// Field was present with a value
    Value(T),
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Absent
    }
}

impl<'de, T> Deserialize<'de> for Patch<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(value) => Patch::Value(value),
            None => Patch::Null,
        })
    }
}

/// Accepts JSON `null` where a list is expected (clients send it to mean
/// "no labels").
fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<i64>>::deserialize(deserializer)?.unwrap_or_default())
}
