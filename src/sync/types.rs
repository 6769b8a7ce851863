//! Solve data and wire types

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::moves::{EncodedMove, MoveEncoding, MovesWire};

/// A solve as the repository stores it, minus owner and row id
///
/// `start_time` doubles as the solve's identity within one user's collection.
/// Unrecognized client fields ride along in `extra` so clients can attach
/// scramble data and the like without a server migration.
#[derive(Debug, Clone, PartialEq)]
pub struct SolveRecord {
    pub start_time: i64,
    pub event: String,
    pub time: Option<i64>,
    pub dnf: bool,
    pub moves: Vec<EncodedMove>,
    pub extra: Map<String, Value>,
}

impl SolveRecord {
    /// Serialize for a client speaking `encoding`
    pub fn into_wire(self, encoding: MoveEncoding) -> SolveWire {
        SolveWire {
            start_time: self.start_time,
            event: self.event,
            time: self.time,
            dnf: self.dnf,
            moves: MovesWire::from_stored(self.moves, encoding),
            extra: self.extra,
        }
    }
}

/// A solve as serialized to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolveWire {
    #[serde(rename = "startTime")]
    pub start_time: i64,
    #[serde(default)]
    pub event: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<i64>,
    #[serde(default)]
    pub dnf: bool,
    #[serde(default)]
    pub moves: MovesWire,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Response to a pull/compare request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullResponse {
    /// Ids the client holds that the server does not; the client should
    /// re-push these
    pub missing: Vec<i64>,
    /// Stored solves the client does not hold yet
    pub solves: Vec<SolveWire>,
}
