//! Solve-set reconciliation and push validation
//!
//! Pure functions: the routes resolve the user and load/store rows, these
//! compute what to send and what to accept.

use std::collections::HashSet;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{AppError, Result};

use super::moves::MovesWire;
use super::types::SolveRecord;

/// Outcome of comparing a client's known ids against the stored solves
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    /// Ids the client holds that the server does not
    pub missing: Vec<i64>,
    /// Stored solves absent from the client
    pub to_send: Vec<SolveRecord>,
}

/// Partition stored solves against the set of ids the client already holds.
///
/// Every stored solve goes to `to_send` exactly once unless the client already
/// has it; every known id absent from the store is reported in `missing` at
/// most once, in first-occurrence order.
pub fn reconcile(stored: Vec<SolveRecord>, known: &[i64]) -> Reconciliation {
    let mut unmatched: HashSet<i64> = known.iter().copied().collect();

    let mut to_send = Vec::new();
    for solve in stored {
        if !unmatched.remove(&solve.start_time) {
            to_send.push(solve);
        }
    }

    let mut missing = Vec::new();
    let mut reported = HashSet::new();
    for &id in known {
        if unmatched.contains(&id) && reported.insert(id) {
            missing.push(id);
        }
    }

    Reconciliation { missing, to_send }
}

/// A pushed solve before validation
#[derive(Debug, Deserialize)]
struct IncomingSolve {
    /// Repository-assigned identity; must be absent on push
    #[serde(default)]
    id: Option<Value>,
    #[serde(rename = "startTime", default)]
    start_time: Option<Value>,
    #[serde(default)]
    event: String,
    #[serde(default)]
    time: Option<i64>,
    #[serde(default)]
    dnf: bool,
    #[serde(default)]
    moves: MovesWire,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

/// Validate a pushed batch in order, failing on the first invalid record.
///
/// Succeeds with records ready for insertion (moves normalized to the stored
/// encoding); fails before anything touches the repository.
pub fn validate_push(batch: Vec<Value>) -> Result<Vec<SolveRecord>> {
    batch.into_iter().map(validate_solve).collect()
}

fn validate_solve(value: Value) -> Result<SolveRecord> {
    let mut incoming: IncomingSolve = serde_json::from_value(value)
        .map_err(|e| AppError::BadRequest(format!("Malformed solve: {}", e)))?;

    if incoming.id.as_ref().is_some_and(|id| !id.is_null()) {
        return Err(AppError::BadRequest(
            "Pushed solves must not carry an id".to_string(),
        ));
    }

    let start_time = incoming
        .start_time
        .as_ref()
        .and_then(json_number)
        .ok_or_else(|| AppError::BadRequest("startTime must be a number".to_string()))?;

    // Ownership comes from the session, never from the payload
    incoming.extra.remove("user");

    Ok(SolveRecord {
        start_time,
        event: incoming.event,
        time: incoming.time,
        dnf: incoming.dnf,
        moves: incoming.moves.into_encoded(),
        extra: incoming.extra,
    })
}

fn json_number(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|f| f as i64))
}
