use serde::{Deserialize, Serialize};

/// Host-facing notification for an accepted placement change. Serialized
/// payloads ride on a DOM custom event so any host page can forward them
/// to its server unchanged.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Intent {
    /// An existing block moved, and possibly changed lane, during a drag.
    SetGuess {
        id: String,
        guess_start: i64,
        guess_end: i64,
        lane: usize,
    },
    /// A pool card was dropped onto the board. `drop_year` is the center
    /// of the accepted span, so re-centering it lands on the same columns.
    PlaceFromPool {
        id: String,
        drop_year: i64,
        lane: usize,
    },
    /// A placed block was sent back to the pool.
    RemoveCard { id: String },
}
