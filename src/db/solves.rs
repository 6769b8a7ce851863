//! Solve storage, the repository behind sync and statistics

use serde_json::Map;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::Result;
use crate::sync::{EncodedMove, SolveRecord};

/// One non-DNF solve row as queried for statistics
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EventScoreRow {
    pub user_id: String,
    pub time: Option<i64>,
    pub move_count: i64,
}

/// Solve repository
pub struct SolveRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> SolveRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// All solves owned by a user, oldest first
    pub async fn find_by_user(&self, user_id: &str) -> Result<Vec<SolveRecord>> {
        let rows = sqlx::query_as::<_, SolveRow>(
            r#"
            SELECT start_time, event, time, dnf, moves, extra
            FROM solves
            WHERE user_id = ?
            ORDER BY start_time ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(SolveRow::into_record).collect()
    }

    /// Insert a validated batch as new rows, all or nothing
    pub async fn insert_many(&self, user_id: &str, solves: &[SolveRecord]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        for solve in solves {
            let extra = if solve.extra.is_empty() {
                None
            } else {
                Some(serde_json::to_string(&solve.extra)?)
            };

            sqlx::query(
                r#"
                INSERT INTO solves (id, user_id, event, start_time, time, dnf, moves, extra)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(user_id)
            .bind(&solve.event)
            .bind(solve.start_time)
            .bind(solve.time)
            .bind(solve.dnf)
            .bind(serde_json::to_string(&solve.moves)?)
            .bind(extra)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Delete the user's solves matching the given start times.
    ///
    /// Ids with no matching row are ignored, which makes repeated deletes
    /// harmless.
    pub async fn delete_by_user_and_ids(&self, user_id: &str, ids: &[i64]) -> Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let placeholders: Vec<&str> = ids.iter().map(|_| "?").collect();
        let query = format!(
            "DELETE FROM solves WHERE user_id = ? AND start_time IN ({})",
            placeholders.join(", ")
        );

        let mut q = sqlx::query(&query).bind(user_id);
        for id in ids {
            q = q.bind(id);
        }

        let result = q.execute(self.pool).await?;
        Ok(result.rows_affected())
    }

    /// Non-DNF rows for an event with the inputs statistics needs, grouped by
    /// user through the sort order
    pub async fn find_event_scores(&self, event: &str) -> Result<Vec<EventScoreRow>> {
        let rows = sqlx::query_as::<_, EventScoreRow>(
            r#"
            SELECT user_id, time, json_array_length(moves) AS move_count
            FROM solves
            WHERE event = ? AND dnf = 0
            ORDER BY user_id, start_time
            "#,
        )
        .bind(event)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }
}

#[derive(sqlx::FromRow)]
struct SolveRow {
    start_time: i64,
    event: String,
    time: Option<i64>,
    dnf: bool,
    moves: String,
    extra: Option<String>,
}

impl SolveRow {
    fn into_record(self) -> Result<SolveRecord> {
        let moves: Vec<EncodedMove> = serde_json::from_str(&self.moves)?;
        let extra = match self.extra {
            Some(raw) => serde_json::from_str(&raw)?,
            None => Map::new(),
        };

        Ok(SolveRecord {
            start_time: self.start_time,
            event: self.event,
            time: self.time,
            dnf: self.dnf,
            moves,
            extra,
        })
    }
}
