//! Database schema creation for all Quadra tables.
//!
//! All CREATE TABLE statements live here - single source of truth.

use crate::error::Result;
use crate::QuadraDb;
use tracing::info;

impl QuadraDb {
    /// Ensure all tables exist.
    pub(crate) async fn ensure_schema(&self) -> Result<()> {
        // Enable WAL mode for better concurrent access
        sqlx::query("PRAGMA journal_mode=WAL")
            .execute(&self.pool)
            .await?;
        sqlx::query("PRAGMA synchronous=NORMAL")
            .execute(&self.pool)
            .await?;
        sqlx::query("PRAGMA foreign_keys=ON")
            .execute(&self.pool)
            .await?;

        // Matrices: anonymous shared workspaces
        sqlx::query(
            r#"CREATE TABLE IF NOT EXISTS matrices (
                id TEXT PRIMARY KEY,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            )"#,
        )
        .execute(&self.pool)
        .await?;

        // Labels: named, colored tags scoped to one matrix
        sqlx::query(
            r#"CREATE TABLE IF NOT EXISTS labels (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                matrix_id TEXT NOT NULL REFERENCES matrices(id),
                name TEXT NOT NULL,
                color TEXT,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL,
                UNIQUE(matrix_id, name)
            )"#,
        )
        .execute(&self.pool)
        .await?;

        // Tasks: units of work, one quadrant each
        sqlx::query(
            r#"CREATE TABLE IF NOT EXISTS tasks (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                matrix_id TEXT NOT NULL REFERENCES matrices(id),
                title TEXT NOT NULL,
                description TEXT,
                quadrant TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            )"#,
        )
        .execute(&self.pool)
        .await?;

        // Task-label join: each pair at most once
        sqlx::query(
            r#"CREATE TABLE IF NOT EXISTS task_labels (
                task_id INTEGER NOT NULL REFERENCES tasks(id),
                label_id INTEGER NOT NULL REFERENCES labels(id),
                PRIMARY KEY (task_id, label_id)
            )"#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_labels_matrix ON labels(matrix_id)")
            .execute(&self.pool)
            .await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_tasks_matrix ON tasks(matrix_id)")
            .execute(&self.pool)
            .await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_task_labels_label ON task_labels(label_id)")
            .execute(&self.pool)
            .await?;

        info!("Database schema verified");
        Ok(())
    }
}
