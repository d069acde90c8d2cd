use std::sync::Arc;

use tracing::error;

use warbler_db::Database;

use crate::error::AppError;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    /// Signs the session cookie.
    pub secret_key: String,
}

impl AppStateInner {
    pub fn new(db: Database, secret_key: impl Into<String>) -> AppState {
        Arc::new(Self {
            db,
            secret_key: secret_key.into(),
        })
    }
}

/// Runs blocking database work off the async runtime.
pub async fn with_db<F, T>(state: &AppState, f: F) -> Result<T, AppError>
where
    F: FnOnce(&Database) -> T + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state.db))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            AppError::Internal(e.into())
        })
}
