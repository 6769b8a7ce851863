//! Session token database operations
//!
//! The session store maps opaque bearer tokens to user ids; every
//! authenticated request goes through it.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::Utc;
use rand::RngCore;
use sqlx::SqlitePool;

use crate::error::Result;

/// Session repository
pub struct SessionRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> SessionRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Issue a fresh opaque token for a user
    pub async fn create(&self, user_id: &str) -> Result<String> {
        let mut bytes = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut bytes);
        let token = BASE64.encode(bytes);

        sqlx::query("INSERT INTO sessions (token, user_id) VALUES (?, ?)")
            .bind(&token)
            .bind(user_id)
            .execute(self.pool)
            .await?;

        Ok(token)
    }

    /// Resolve a bearer token to the owning user id
    pub async fn resolve(&self, token: &str) -> Result<Option<String>> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT user_id FROM sessions WHERE token = ?")
                .bind(token)
                .fetch_optional(self.pool)
                .await?;

        Ok(row.map(|(user_id,)| user_id))
    }

    /// Record that a token was just used
    pub async fn touch(&self, token: &str) -> Result<()> {
        sqlx::query("UPDATE sessions SET last_used = ? WHERE token = ?")
            .bind(Utc::now().to_rfc3339())
            .bind(token)
            .execute(self.pool)
            .await?;

        Ok(())
    }
}
