//! Statistics aggregation
//!
//! Turns every user's non-DNF solves for an event into one normalized
//! histogram. Users are not weighted equally per solve: a user with `k`
//! solves contributes weight `1 / (2 + k)` per solve, which keeps prolific
//! grinders from dominating the distribution while still letting their data
//! in.

mod histogram;

pub use histogram::{chart, trim_outliers, Scored, TRIM_THRESHOLD};

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::db::EventScoreRow;
use crate::error::AppError;

/// Which numeric dimension statistics are computed over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreKind {
    /// Elapsed time, in seconds
    Time,
    /// Number of moves
    Moves,
}

impl std::str::FromStr for ScoreKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "time" => Ok(ScoreKind::Time),
            "moves" => Ok(ScoreKind::Moves),
            other => Err(AppError::BadRequest(format!(
                "Unknown score kind: {}",
                other
            ))),
        }
    }
}

/// Chart-ready histogram: bin left-edges and normalized weights
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    pub labels: Vec<i64>,
    pub data: Vec<f64>,
}

/// Aggregate per-user solve rows into a normalized histogram.
///
/// Deterministic for a fixed input: grouping preserves row order and the
/// histogram sort is stable.
pub fn aggregate(rows: Vec<EventScoreRow>, kind: ScoreKind) -> ChartData {
    let mut slots: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<Vec<f64>> = Vec::new();

    for row in &rows {
        let score = match kind {
            ScoreKind::Moves => row.move_count as f64,
            ScoreKind::Time => match row.time {
                Some(ms) => ms as f64 / 1000.0,
                None => continue,
            },
        };

        let slot = *slots.entry(row.user_id.clone()).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[slot].push(score);
    }

    let mut scored = Vec::new();
    for solves in &groups {
        let weight = 1.0 / (2.0 + solves.len() as f64);
        for &score in solves {
            scored.push(Scored { score, weight });
        }
    }

    chart(scored)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(user_id: &str, time: Option<i64>, move_count: i64) -> EventScoreRow {
        EventScoreRow {
            user_id: user_id.to_string(),
            time,
            move_count,
        }
    }

    #[test]
    fn test_score_kind_parsing() {
        assert_eq!("time".parse::<ScoreKind>().unwrap(), ScoreKind::Time);
        assert_eq!("moves".parse::<ScoreKind>().unwrap(), ScoreKind::Moves);
        assert!("median".parse::<ScoreKind>().is_err());
    }

    #[test]
    fn test_insufficient_data_is_empty_not_an_error() {
        let result = aggregate(vec![row("a", Some(10_000), 25)], ScoreKind::Time);
        assert!(result.labels.is_empty());
        assert!(result.data.is_empty());
    }

    #[test]
    fn test_time_scores_are_seconds() {
        let result = aggregate(
            vec![row("a", Some(10_000), 30), row("a", Some(12_000), 34)],
            ScoreKind::Time,
        );

        // 10s and 12s: domain [9, 14] with step 1
        assert_eq!(result.labels, vec![9, 10, 11, 12, 13, 14]);
        assert_eq!(result.data, vec![0.0, 1.0, 0.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_moves_kind_counts_moves() {
        let result = aggregate(
            vec![row("a", Some(10_000), 20), row("b", Some(50_000), 24)],
            ScoreKind::Moves,
        );

        assert!(!result.labels.is_empty());
        assert_eq!(result.labels[0], 18); // floor(20 * 0.9)
    }

    #[test]
    fn test_prolific_users_are_underweighted() {
        // One user with k solves gets per-solve weight 1/(2+k); doubling the
        // solve count strictly decreases it.
        let few = 1.0 / (2.0 + 2.0);
        let many = 1.0 / (2.0 + 4.0);
        assert!(many < few);

        // Two users with identical scores but different counts: the user with
        // more solves still contributes more total weight, just sublinearly.
        let rows = vec![
            row("a", Some(10_000), 10),
            row("a", Some(10_000), 10),
            row("a", Some(10_000), 10),
            row("a", Some(10_000), 10),
            row("b", Some(20_000), 10),
        ];
        let result = aggregate(rows, ScoreKind::Time);

        // User a's four solves pile 4/6 into the 10s bin, user b's one puts
        // 1/3 into the 20s bin; normalization pins a's bin at 1.
        let max = result.data.iter().copied().fold(0.0_f64, f64::max);
        assert_eq!(max, 1.0);
    }

    #[test]
    fn test_rows_without_time_are_skipped_for_time_kind() {
        let result = aggregate(
            vec![row("a", None, 30), row("a", Some(10_000), 34)],
            ScoreKind::Time,
        );
        assert!(result.labels.is_empty());
    }
}
