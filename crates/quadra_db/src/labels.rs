//! Label database operations (named tags scoped to a matrix)

use crate::error::{DbError, Result};
use crate::types::*;
use crate::QuadraDb;
use sqlx::sqlite::{SqliteConnection, SqliteRow};
use sqlx::Row;

impl QuadraDb {
    // ========================================================================
    // Label Operations
    // ========================================================================

    /// Create a label under a matrix.
    ///
    /// Fails with Conflict if the matrix already has a label with this name.
    pub async fn create_label(&self, matrix_id: &str, label: NewLabel) -> Result<Label> {
        let now = Self::now_millis();
        let mut tx = self.pool.begin().await?;

        Self::ensure_matrix_exists(&mut tx, matrix_id).await?;

        let taken = sqlx::query("SELECT id FROM labels WHERE matrix_id = ? AND name = ?")
            .bind(matrix_id)
            .bind(&label.name)
            .fetch_optional(&mut *tx)
            .await?;
        if taken.is_some() {
            return Err(DbError::conflict(format!(
                "Label with name '{}' already exists for this matrix",
                label.name
            )));
        }

        let result = sqlx::query(
            r#"
            INSERT INTO labels (matrix_id, name, color, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(matrix_id)
        .bind(&label.name)
        .bind(&label.color)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;
        let id = result.last_insert_rowid();

        Self::touch_matrix(&mut tx, matrix_id, now).await?;
        tx.commit().await?;

        Ok(Label {
            id,
            matrix_id: matrix_id.to_string(),
            name: label.name,
            color: label.color,
            created_at: Self::millis_to_datetime(now),
            updated_at: Self::millis_to_datetime(now),
        })
    }

    /// List all labels owned by a matrix.
    pub async fn list_labels(&self, matrix_id: &str) -> Result<Vec<Label>> {
        let mut tx = self.pool.begin().await?;

        Self::ensure_matrix_exists(&mut tx, matrix_id).await?;
        let labels = Self::fetch_labels(&mut tx, matrix_id).await?;

        tx.commit().await?;
        Ok(labels)
    }

    /// Partially update a label. Only supplied fields change.
    ///
    /// Fails with Conflict if the new name collides with a different label
    /// in the same matrix.
    pub async fn update_label(
        &self,
        matrix_id: &str,
        label_id: i64,
        patch: LabelPatch,
    ) -> Result<Label> {
        let now = Self::now_millis();
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            "SELECT id, matrix_id, name, color, created_at, updated_at FROM labels WHERE id = ? AND matrix_id = ?",
        )
        .bind(label_id)
        .bind(matrix_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| {
            DbError::not_found(format!("Label with id {} not found in this matrix", label_id))
        })?;

        if let Some(ref name) = patch.name {
            let clash = sqlx::query("SELECT id FROM labels WHERE matrix_id = ? AND name = ? AND id != ?")
                .bind(matrix_id)
                .bind(name)
                .bind(label_id)
                .fetch_optional(&mut *tx)
                .await?;
            if clash.is_some() {
                return Err(DbError::conflict(format!(
                    "Another label named '{}' already exists for this matrix",
                    name
                )));
            }
        }

        let name: String = match patch.name {
            Some(name) => name,
            None => row.get("name"),
        };
        let color: Option<String> = patch.color.or_else(|| row.get("color"));

        sqlx::query("UPDATE labels SET name = ?, color = ?, updated_at = ? WHERE id = ?")
            .bind(&name)
            .bind(&color)
            .bind(now)
            .bind(label_id)
            .execute(&mut *tx)
            .await?;

        Self::touch_matrix(&mut tx, matrix_id, now).await?;
        tx.commit().await?;

        Ok(Label {
            id: label_id,
            matrix_id: matrix_id.to_string(),
            name,
            color,
            created_at: Self::millis_to_datetime(row.get("created_at")),
            updated_at: Self::millis_to_datetime(now),
        })
    }

    /// Delete a label, detaching it from any tasks that reference it.
    pub async fn delete_label(&self, matrix_id: &str, label_id: i64) -> Result<()> {
        let now = Self::now_millis();
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query("SELECT id FROM labels WHERE id = ? AND matrix_id = ?")
            .bind(label_id)
            .bind(matrix_id)
            .fetch_optional(&mut *tx)
            .await?;
        if row.is_none() {
            return Err(DbError::not_found(format!(
                "Label with id {} not found in this matrix",
                label_id
            )));
        }

        // Associations first, then the label itself
        sqlx::query("DELETE FROM task_labels WHERE label_id = ?")
            .bind(label_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM labels WHERE id = ?")
            .bind(label_id)
            .execute(&mut *tx)
            .await?;

        Self::touch_matrix(&mut tx, matrix_id, now).await?;
        tx.commit().await?;

        Ok(())
    }

    // ========================================================================
    // Shared Helpers
    // ========================================================================

    /// Fetch all labels of a matrix, ordered by id.
    pub(crate) async fn fetch_labels(
        conn: &mut SqliteConnection,
        matrix_id: &str,
    ) -> Result<Vec<Label>> {
        let rows = sqlx::query(
            "SELECT id, matrix_id, name, color, created_at, updated_at FROM labels WHERE matrix_id = ? ORDER BY id",
        )
        .bind(matrix_id)
        .fetch_all(&mut *conn)
        .await?;

        Ok(rows.iter().map(Self::row_to_label).collect())
    }

    pub(crate) fn row_to_label(row: &SqliteRow) -> Label {
        Label {
            id: row.get("id"),
            matrix_id: row.get("matrix_id"),
            name: row.get("name"),
            color: row.get("color"),
            created_at: Self::millis_to_datetime(row.get("created_at")),
            updated_at: Self::millis_to_datetime(row.get("updated_at")),
        }
    }
}
