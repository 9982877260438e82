//! Matrix database operations (workspace lifecycle)

use crate::error::{DbError, Result};
use crate::types::*;
use crate::QuadraDb;
use sqlx::sqlite::SqliteConnection;
use sqlx::Row;
use uuid::Uuid;

impl QuadraDb {
    // ========================================================================
    // Matrix Operations
    // ========================================================================

    /// Create a new matrix with a generated identifier.
    pub async fn create_matrix(&self) -> Result<Matrix> {
        let id = Uuid::new_v4().to_string();
        let now = Self::now_millis();

        sqlx::query("INSERT INTO matrices (id, created_at, updated_at) VALUES (?, ?, ?)")
            .bind(&id)
            .bind(now)
            .bind(now)
            .execute(&self.pool)
            .await?;

        Ok(Matrix {
            id,
            created_at: Self::millis_to_datetime(now),
            updated_at: Self::millis_to_datetime(now),
        })
    }

    /// Get a matrix with its full label and task collections.
    pub async fn get_matrix(&self, matrix_id: &str) -> Result<MatrixDetail> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query("SELECT id, created_at, updated_at FROM matrices WHERE id = ?")
            .bind(matrix_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DbError::not_found(format!("Matrix {} not found", matrix_id)))?;

        let labels = Self::fetch_labels(&mut tx, matrix_id).await?;
        let tasks = Self::fetch_tasks_with_labels(&mut tx, matrix_id).await?;

        tx.commit().await?;

        Ok(MatrixDetail {
            id: row.get("id"),
            created_at: Self::millis_to_datetime(row.get("created_at")),
            updated_at: Self::millis_to_datetime(row.get("updated_at")),
            labels,
            tasks,
        })
    }

    /// Delete a matrix and everything it owns.
    ///
    /// Removes association rows, then tasks, then labels, then the matrix
    /// itself, all in one transaction.
    pub async fn delete_matrix(&self, matrix_id: &str) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        Self::ensure_matrix_exists(&mut tx, matrix_id).await?;

        sqlx::query(
            "DELETE FROM task_labels WHERE task_id IN (SELECT id FROM tasks WHERE matrix_id = ?)",
        )
        .bind(matrix_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM tasks WHERE matrix_id = ?")
            .bind(matrix_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM labels WHERE matrix_id = ?")
            .bind(matrix_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM matrices WHERE id = ?")
            .bind(matrix_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(())
    }

    // ========================================================================
    // Shared Helpers
    // ========================================================================

    /// Fail with NotFound unless the matrix exists.
    pub(crate) async fn ensure_matrix_exists(
        conn: &mut SqliteConnection,
        matrix_id: &str,
    ) -> Result<()> {
        let row = sqlx::query("SELECT id FROM matrices WHERE id = ?")
            .bind(matrix_id)
            .fetch_optional(&mut *conn)
            .await?;

        if row.is_none() {
            return Err(DbError::not_found(format!(
                "Matrix {} not found",
                matrix_id
            )));
        }
        Ok(())
    }

    /// Advance the matrix's `updated_at`.
    ///
    /// Every mutating label/task operation calls this inside its own
    /// transaction; nothing bumps the parent automatically.
    pub(crate) async fn touch_matrix(
        conn: &mut SqliteConnection,
        matrix_id: &str,
        now: i64,
    ) -> Result<()> {
        sqlx::query("UPDATE matrices SET updated_at = ? WHERE id = ?")
            .bind(now)
            .bind(matrix_id)
            .execute(conn)
            .await?;
        Ok(())
    }
}
