//! Solve synchronization
//!
//! Everything behind `/sync`:
//! - Move codec between verbose and delta-encoded wire forms
//! - Reconciliation of a client's solve set against the server's
//! - Push validation
//!
//! # Sync Protocol
//!
//! 1. Client POSTs the `startTime` ids it holds locally
//! 2. Server answers with the stored solves the client lacks plus the ids the
//!    server lacks (`missing`)
//! 3. Client PUTs the missing solves as new records
//! 4. Deletions are an explicit id list, idempotent on both sides
//!
//! Solves are immutable once created; there is no update operation and thus
//! no conflict to resolve. The id set is the whole story.

mod moves;
mod reconcile;
mod types;

pub use moves::{decode_moves, encode_moves, Axis, EncodedMove, Move, MoveEncoding, MovesWire};
pub use reconcile::{reconcile, validate_push, Reconciliation};
pub use types::{PullResponse, SolveRecord, SolveWire};
