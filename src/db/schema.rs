//! Database schema initialization

use sqlx::SqlitePool;

use crate::error::Result;

/// Initialize the database schema
pub async fn initialize_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(SCHEMA_SQL).execute(pool).await?;

    Ok(())
}

const SCHEMA_SQL: &str = r#"
-- Users table (identity provider linkage)
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    provider TEXT NOT NULL,
    uid TEXT NOT NULL,
    name TEXT NOT NULL,
    avatar_url TEXT,
    access_token TEXT,
    refresh_token TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now')),

    UNIQUE(provider, uid)
);

-- Sessions table (opaque bearer tokens)
CREATE TABLE IF NOT EXISTS sessions (
    token TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    last_used TEXT
);

CREATE INDEX IF NOT EXISTS idx_sessions_user_id ON sessions(user_id);

-- Solves table (one row per timed attempt)
CREATE TABLE IF NOT EXISTS solves (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    event TEXT NOT NULL DEFAULT '',
    start_time INTEGER NOT NULL,
    time INTEGER,
    dnf INTEGER NOT NULL DEFAULT 0,
    -- delta-encoded move tuples, JSON array
    moves TEXT NOT NULL DEFAULT '[]',
    -- client fields passed through untouched, JSON object
    extra TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_solves_user_id ON solves(user_id);
CREATE INDEX IF NOT EXISTS idx_solves_event ON solves(event);
CREATE INDEX IF NOT EXISTS idx_solves_start_time ON solves(start_time);
"#;
