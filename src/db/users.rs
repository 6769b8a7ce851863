//! User account database operations

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::{AppError, Result};

/// A user as exposed to the rest of the application
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: String,
    pub name: String,
    pub avatar_url: Option<String>,
}

/// Profile returned by an identity provider after a code exchange
#[derive(Debug, Clone)]
pub struct ProviderProfile {
    pub provider: String,
    pub uid: String,
    pub name: String,
    pub avatar_url: Option<String>,
    pub access_token: String,
    pub refresh_token: Option<String>,
}

/// User repository
pub struct UserRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert or refresh the account linked to a provider identity.
    ///
    /// The `(provider, uid)` pair is the stable key; name, avatar, and tokens
    /// are refreshed on every login. A previously stored refresh token
    /// survives logins where the provider omits one.
    pub async fn upsert(&self, profile: &ProviderProfile) -> Result<User> {
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO users (id, provider, uid, name, avatar_url, access_token, refresh_token, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(provider, uid) DO UPDATE SET
                name = excluded.name,
                avatar_url = excluded.avatar_url,
                access_token = excluded.access_token,
                refresh_token = COALESCE(excluded.refresh_token, refresh_token),
                updated_at = excluded.updated_at
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&profile.provider)
        .bind(&profile.uid)
        .bind(&profile.name)
        .bind(&profile.avatar_url)
        .bind(&profile.access_token)
        .bind(&profile.refresh_token)
        .bind(&now)
        .execute(self.pool)
        .await?;

        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, avatar_url FROM users WHERE provider = ? AND uid = ?",
        )
        .bind(&profile.provider)
        .bind(&profile.uid)
        .fetch_optional(self.pool)
        .await?;

        user.ok_or_else(|| AppError::Internal("Failed to fetch upserted user".to_string()))
    }

    /// Get a user by id
    pub async fn get(&self, id: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, avatar_url FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }
}
