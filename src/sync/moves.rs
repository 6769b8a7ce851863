//! Move codec
//!
//! Converts between the verbose move objects older clients speak and the
//! compact delta-time-encoded tuples the server stores. Encoding replaces each
//! move's absolute timestamp with the increment since the previous move, which
//! keeps the numbers small for solves recorded at normal speed.
//!
//! The codec is a pure bijection over `(axis, index, n, time)`. It does not
//! enforce the non-decreasing-time invariant; producers are responsible for
//! that, and decode reproduces whatever deltas it is given, negative ones
//! included.

use serde::{Deserialize, Serialize};

/// Which axis of the grid a move turns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Row,
    Col,
}

/// One atomic turn within a solve
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    pub axis: Axis,
    pub index: i64,
    pub n: i64,
    pub time: i64,
}

/// Compact wire form: `[axis_bit, index, n, time_delta]`
pub type EncodedMove = [i64; 4];

/// Which wire representation of moves a request negotiated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveEncoding {
    /// Compact delta-encoded tuples
    Encoded,
    /// Verbose move objects with absolute timestamps
    Verbose,
}

/// Moves as they appear in request and response bodies
///
/// Untagged: a tuple list and an object list are structurally distinct, so
/// incoming payloads self-select the right variant regardless of what the
/// client negotiated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MovesWire {
    Encoded(Vec<EncodedMove>),
    Verbose(Vec<Move>),
}

impl Default for MovesWire {
    fn default() -> Self {
        MovesWire::Encoded(Vec::new())
    }
}

impl MovesWire {
    /// Normalize to the stored form, whichever variant the client sent
    pub fn into_encoded(self) -> Vec<EncodedMove> {
        match self {
            MovesWire::Encoded(moves) => moves,
            MovesWire::Verbose(moves) => encode_moves(&moves),
        }
    }

    /// Prepare stored moves for a client speaking `encoding`
    pub fn from_stored(stored: Vec<EncodedMove>, encoding: MoveEncoding) -> Self {
        match encoding {
            MoveEncoding::Encoded => MovesWire::Encoded(stored),
            MoveEncoding::Verbose => MovesWire::Verbose(decode_moves(&stored)),
        }
    }
}

/// Encode moves into delta-time tuples, in order
pub fn encode_moves(moves: &[Move]) -> Vec<EncodedMove> {
    let mut last_time = 0;
    moves
        .iter()
        .map(|m| {
            let delta = m.time - last_time;
            last_time = m.time;
            [(m.axis == Axis::Col) as i64, m.index, m.n, delta]
        })
        .collect()
}

/// Decode delta-time tuples back into moves with absolute timestamps
pub fn decode_moves(encoded: &[EncodedMove]) -> Vec<Move> {
    let mut last_time = 0;
    encoded
        .iter()
        .map(|&[axis_bit, index, n, delta]| {
            last_time += delta;
            Move {
                axis: if axis_bit != 0 { Axis::Col } else { Axis::Row },
                index,
                n,
                time: last_time,
            }
        })
        .collect()
}
