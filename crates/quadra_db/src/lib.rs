//! Database layer for Quadra.
//!
//! Single source of truth for matrix/label/task storage. Every interface
//! (HTTP handlers, tests) goes through this crate for database access;
//! nothing else touches SQLite directly.
//!
//! # Usage
//!
//! ```rust,ignore
//! use quadra_db::{NewLabel, QuadraDb, Result};
//!
//! let db = QuadraDb::open("quadra.db").await?;
//!
//! let matrix = db.create_matrix().await?;
//! let label = db
//!     .create_label(&matrix.id, NewLabel { name: "Work".into(), color: None })
//!     .await?;
//! ```

mod error;
mod schema;
mod types;

// Method implementations organized by entity
mod labels;
mod matrices;
mod tasks;

pub use error::{DbError, Result};
pub use types::*;

use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use std::path::Path;
use tracing::info;

/// Handle to the Quadra database.
///
/// Cheap to clone; all clones share one connection pool. Connections are
/// acquired per operation and released on every exit path.
#[derive(Clone)]
pub struct QuadraDb {
    pool: SqlitePool,
}

impl QuadraDb {
    /// Open or create a database at the given path.
    ///
    /// Creates all tables if they don't exist.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let url = format!("sqlite:{}?mode=rwc", path.display());

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&url)
            .await?;

        let db = Self { pool };

        db.ensure_schema().await?;

        info!(path = %path.display(), "Database opened");

        Ok(db)
    }

    /// Get the underlying connection pool (escape hatch for ad-hoc queries).
    ///
    /// Prefer using the typed methods instead.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the database connection.
    pub async fn close(self) {
        self.pool.close().await;
    }
}

// Timestamp utilities
impl QuadraDb {
    /// Current time as milliseconds since Unix epoch.
    pub fn now_millis() -> i64 {
        chrono::Utc::now().timestamp_millis()
    }

    /// Convert stored milliseconds to a DateTime.
    pub fn millis_to_datetime(millis: i64) -> chrono::DateTime<chrono::Utc> {
        chrono::DateTime::from_timestamp_millis(millis).unwrap_or_else(chrono::Utc::now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_open_creates_database() {
        let tmp = TempDir::new().unwrap();
        let db_path = tmp.path().join("test.db");

        let db = QuadraDb::open(&db_path).await.unwrap();
        assert!(db_path.exists());

        db.close().await;
    }

    #[tokio::test]
    async fn test_open_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let db_path = tmp.path().join("test.db");

        let first = QuadraDb::open(&db_path).await.unwrap();
        let matrix = first.create_matrix().await.unwrap();
        first.close().await;

        // Re-opening must keep existing rows and re-verify the schema
        let second = QuadraDb::open(&db_path).await.unwrap();
        let detail = second.get_matrix(&matrix.id).await.unwrap();
        assert_eq!(detail.id, matrix.id);

        second.close().await;
    }
}
