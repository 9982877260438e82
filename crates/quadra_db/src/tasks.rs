//! Task database operations (units of work and their label associations)

use crate::error::{DbError, Result};
use crate::types::*;
use crate::QuadraDb;
use sqlx::sqlite::{SqliteConnection, SqliteRow};
use sqlx::Row;
use std::collections::{HashMap, HashSet};

impl QuadraDb {
    // ========================================================================
    // Task Operations
    // ========================================================================

    /// Create a task under a matrix, attaching the given labels.
    ///
    /// Every label id must resolve to a label of this matrix, or the whole
    /// operation fails and nothing is persisted.
    pub async fn create_task(&self, matrix_id: &str, task: NewTask) -> Result<Task> {
        let now = Self::now_millis();
        let mut tx = self.pool.begin().await?;

        Self::ensure_matrix_exists(&mut tx, matrix_id).await?;

        let result = sqlx::query(
            r#"
            INSERT INTO tasks (matrix_id, title, description, quadrant, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(matrix_id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(&task.quadrant)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;
        let task_id = result.last_insert_rowid();

        let labels = Self::attach_labels(&mut tx, matrix_id, task_id, &task.label_ids).await?;

        Self::touch_matrix(&mut tx, matrix_id, now).await?;
        tx.commit().await?;

        Ok(Task {
            id: task_id,
            matrix_id: matrix_id.to_string(),
            title: task.title,
            description: task.description,
            quadrant: task.quadrant,
            labels,
            created_at: Self::millis_to_datetime(now),
            updated_at: Self::millis_to_datetime(now),
        })
    }

    /// List all tasks owned by a matrix, each with its labels resolved.
    pub async fn list_tasks(&self, matrix_id: &str) -> Result<Vec<Task>> {
        let mut tx = self.pool.begin().await?;

        Self::ensure_matrix_exists(&mut tx, matrix_id).await?;
        let tasks = Self::fetch_tasks_with_labels(&mut tx, matrix_id).await?;

        tx.commit().await?;
        Ok(tasks)
    }

    /// Partially update a task. Only supplied fields change.
    ///
    /// A present `label_ids` (including null or an empty list) replaces the
    /// entire association set; an absent one leaves it untouched. An invalid
    /// label id rolls back the whole operation, the clear included.
    pub async fn update_task(
        &self,
        matrix_id: &str,
        task_id: i64,
        patch: TaskPatch,
    ) -> Result<Task> {
        let now = Self::now_millis();
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            "SELECT id, matrix_id, title, description, quadrant, created_at, updated_at FROM tasks WHERE id = ? AND matrix_id = ?",
        )
        .bind(task_id)
        .bind(matrix_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| {
            DbError::not_found(format!("Task with id {} not found in this matrix", task_id))
        })?;

        let title: String = match patch.title {
            Some(title) => title,
            None => row.get("title"),
        };
        let description: Option<String> = patch.description.or_else(|| row.get("description"));
        let quadrant: String = match patch.quadrant {
            Some(quadrant) => quadrant,
            None => row.get("quadrant"),
        };

        sqlx::query(
            "UPDATE tasks SET title = ?, description = ?, quadrant = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&title)
        .bind(&description)
        .bind(&quadrant)
        .bind(now)
        .bind(task_id)
        .execute(&mut *tx)
        .await?;

        let labels = match patch.label_ids {
            Patch::Absent => Self::fetch_task_labels(&mut tx, task_id).await?,
            Patch::Null => {
                Self::clear_task_labels(&mut tx, task_id).await?;
                Vec::new()
            }
            Patch::Value(ids) => {
                Self::clear_task_labels(&mut tx, task_id).await?;
                Self::attach_labels(&mut tx, matrix_id, task_id, &ids).await?
            }
        };

        Self::touch_matrix(&mut tx, matrix_id, now).await?;
        tx.commit().await?;

        Ok(Task {
            id: task_id,
            matrix_id: matrix_id.to_string(),
            title,
            description,
            quadrant,
            labels,
            created_at: Self::millis_to_datetime(row.get("created_at")),
            updated_at: Self::millis_to_datetime(now),
        })
    }

    /// Delete a task and its label associations.
    pub async fn delete_task(&self, matrix_id: &str, task_id: i64) -> Result<()> {
        let now = Self::now_millis();
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query("SELECT id FROM tasks WHERE id = ? AND matrix_id = ?")
            .bind(task_id)
            .bind(matrix_id)
            .fetch_optional(&mut *tx)
            .await?;
        if row.is_none() {
            return Err(DbError::not_found(format!(
                "Task with id {} not found in this matrix",
                task_id
            )));
        }

        Self::clear_task_labels(&mut tx, task_id).await?;

        sqlx::query("DELETE FROM tasks WHERE id = ?")
            .bind(task_id)
            .execute(&mut *tx)
            .await?;

        Self::touch_matrix(&mut tx, matrix_id, now).await?;
        tx.commit().await?;

        Ok(())
    }

    // ========================================================================
    // Shared Helpers
    // ========================================================================

    /// Fetch all tasks of a matrix with their labels, ordered by id.
    pub(crate) async fn fetch_tasks_with_labels(
        conn: &mut SqliteConnection,
        matrix_id: &str,
    ) -> Result<Vec<Task>> {
        let task_rows = sqlx::query(
            "SELECT id, matrix_id, title, description, quadrant, created_at, updated_at FROM tasks WHERE matrix_id = ? ORDER BY id",
        )
        .bind(matrix_id)
        .fetch_all(&mut *conn)
        .await?;

        let label_rows = sqlx::query(
            r#"
            SELECT tl.task_id, l.id, l.matrix_id, l.name, l.color, l.created_at, l.updated_at
            FROM task_labels tl
            JOIN labels l ON l.id = tl.label_id
            JOIN tasks t ON t.id = tl.task_id
            WHERE t.matrix_id = ?
            ORDER BY tl.task_id, l.id
            "#,
        )
        .bind(matrix_id)
        .fetch_all(&mut *conn)
        .await?;

        let mut labels_by_task: HashMap<i64, Vec<Label>> = HashMap::new();
        for row in &label_rows {
            labels_by_task
                .entry(row.get("task_id"))
                .or_default()
                .push(Self::row_to_label(row));
        }

        Ok(task_rows
            .iter()
            .map(|row| {
                let labels = labels_by_task
                    .remove(&row.get::<i64, _>("id"))
                    .unwrap_or_default();
                Self::row_to_task(row, labels)
            })
            .collect())
    }

    /// Fetch the labels attached to one task, ordered by id.
    async fn fetch_task_labels(conn: &mut SqliteConnection, task_id: i64) -> Result<Vec<Label>> {
        let rows = sqlx::query(
            r#"
            SELECT l.id, l.matrix_id, l.name, l.color, l.created_at, l.updated_at
            FROM task_labels tl
            JOIN labels l ON l.id = tl.label_id
            WHERE tl.task_id = ?
            ORDER BY l.id
            "#,
        )
        .bind(task_id)
        .fetch_all(&mut *conn)
        .await?;

        Ok(rows.iter().map(Self::row_to_label).collect())
    }

    /// Validate each id against the matrix and insert the association rows.
    ///
    /// Duplicate ids attach once. An unresolved id aborts with NotFound
    /// naming it; the caller's transaction rolls back any rows already
    /// inserted.
    async fn attach_labels(
        conn: &mut SqliteConnection,
        matrix_id: &str,
        task_id: i64,
        label_ids: &[i64],
    ) -> Result<Vec<Label>> {
        let mut labels = Vec::with_capacity(label_ids.len());
        let mut seen = HashSet::new();

        for &label_id in label_ids {
            if !seen.insert(label_id) {
                continue;
            }

            let row = sqlx::query(
                "SELECT id, matrix_id, name, color, created_at, updated_at FROM labels WHERE id = ? AND matrix_id = ?",
            )
            .bind(label_id)
            .bind(matrix_id)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(|| {
                DbError::not_found(format!(
                    "Label with id {} not found in this matrix",
                    label_id
                ))
            })?;

            sqlx::query("INSERT INTO task_labels (task_id, label_id) VALUES (?, ?)")
                .bind(task_id)
                .bind(label_id)
                .execute(&mut *conn)
                .await?;

            labels.push(Self::row_to_label(&row));
        }

        Ok(labels)
    }

    async fn clear_task_labels(conn: &mut SqliteConnection, task_id: i64) -> Result<()> {
        sqlx::query("DELETE FROM task_labels WHERE task_id = ?")
            .bind(task_id)
            .execute(conn)
            .await?;
        Ok(())
    }

    fn row_to_task(row: &SqliteRow, labels: Vec<Label>) -> Task {
        Task {
            id: row.get("id"),
            matrix_id: row.get("matrix_id"),
            title: row.get("title"),
            description: row.get("description"),
            quadrant: row.get("quadrant"),
            labels,
            created_at: Self::millis_to_datetime(row.get("created_at")),
            updated_at: Self::millis_to_datetime(row.get("updated_at")),
        }
    }
}
