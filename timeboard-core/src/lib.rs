//! Placement engine for a timeline guessing board.
//!
//! Cards carry a fixed-duration guess span. The engine quantizes years to
//! grid columns, tracks per-lane occupied intervals, and resolves drag and
//! drop gestures against them so placed blocks never overlap: a drag is
//! clamped into the free corridor around the pointer, a drop walks outward
//! from its target to the nearest free start. Everything is synchronous
//! and allocation-light; the front end calls into it at pointer-move
//! frequency.

pub mod board;
pub mod grid;
pub mod intent;
pub mod lanes;
pub mod model;
pub mod scroll;
pub mod session;
pub mod solver;

pub use board::{Board, BoardConfig, BoardError};
pub use grid::{Axis, Grid, TARGET_COLS, Track, format_year};
pub use intent::Intent;
pub use lanes::{ColSpan, LanePolicy, LaneRegistry, PlacedSpan};
pub use model::{Card, Deck, DeckFile};
pub use session::{DragPhase, DragSession};
pub use solver::{Corridor, corridor, solve_drop, solve_move};
