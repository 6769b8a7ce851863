//! Application state management

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::auth::IdentityClient;
use crate::config::Config;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    db: SqlitePool,
    identity: IdentityClient,
}

impl AppState {
    /// Create a new application state
    pub fn new(config: Config, db: SqlitePool) -> Self {
        let identity = IdentityClient::new(config.providers.clone());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                db,
                identity,
            }),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Get the database pool
    pub fn db(&self) -> &SqlitePool {
        &self.inner.db
    }

    /// Get the identity provider client
    pub fn identity(&self) -> &IdentityClient {
        &self.inner.identity
    }
}
