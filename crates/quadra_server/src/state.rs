//! Shared state carried by every request handler.

use quadra_db::QuadraDb;

/// Application state: the database handle plus the public base URL used to
/// derive sharable matrix links. Cheap to clone; handed to axum as router
/// state.
#[derive(Clone)]
pub struct AppState {
    pub db: QuadraDb,
    public_url: String,
}

impl AppState {
    pub fn new(db: QuadraDb, public_url: String) -> Self {
        // A trailing slash would double up in derived links
        let public_url = public_url.trim_end_matches('/').to_string();
        Self { db, public_url }
    }

    /// Link a collaborator can open to join a matrix. Derived, never stored.
    pub fn sharable_link(&self, matrix_id: &str) -> String {
        format!("{}/matrix/{}", self.public_url, matrix_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_sharable_link_strips_trailing_slash() {
        let tmp = TempDir::new().unwrap();
        let db = QuadraDb::open(tmp.path().join("state.db")).await.unwrap();

        let state = AppState::new(db, "https://example.com/".to_string());
        assert_eq!(state.sharable_link("m1"), "https://example.com/matrix/m1");
    }
}
