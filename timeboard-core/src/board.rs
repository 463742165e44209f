use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::grid::{Axis, Grid, TARGET_COLS};
use crate::lanes::{ColSpan, LanePolicy, LaneRegistry};
use crate::solver::{self, Corridor};

/// Construction-time validation failures. Everything past construction is
/// either a silent clamp or a solver rejection, never an error.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("axis is empty: min {min} is not below max {max}")]
    EmptyAxis { min: i64, max: i64 },

    #[error("board needs at least one lane")]
    NoLanes,
}

/// Static configuration for a board.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct BoardConfig {
    pub axis: Axis,
    pub lane_count: usize,
    #[serde(default)]
    pub lane_policy: LanePolicy,
    #[serde(default = "default_target_cols")]
    pub target_cols: i64,
}

fn default_target_cols() -> i64 {
    TARGET_COLS
}

/// Axis, grid and lane registry tied together under the placement rules.
///
/// The board never mutates on a failed solve; a commit writes lane and
/// columns in one step, only after the solver accepted them.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Board {
    axis: Axis,
    grid: Grid,
    lanes: LaneRegistry,
}

impl Board {
    /// `earliest`/`latest` are the deck's true year extent; they widen the
    /// grid beyond the axis when events fall outside it. The grid is fixed
    /// for the board's lifetime.
    pub fn new(config: BoardConfig, earliest: i64, latest: i64) -> Result<Board, BoardError> {
        if config.axis.min >= config.axis.max {
            return Err(BoardError::EmptyAxis {
                min: config.axis.min,
                max: config.axis.max,
            });
        }
        if config.lane_count == 0 {
            return Err(BoardError::NoLanes);
        }
        let grid = Grid::derive(config.axis, earliest, latest, config.target_cols);
        Ok(Board {
            axis: config.axis,
            grid,
            lanes: LaneRegistry::new(config.lane_count, config.lane_policy),
        })
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn lanes(&self) -> &LaneRegistry {
        &self.lanes
    }

    /// Legal start columns for a span: the axis range shrunk on the right
    /// by the span width.
    pub fn col_bounds(&self, span_cols: i64) -> Corridor {
        Corridor {
            left: self.grid.year_to_col(self.axis.min),
            right: self.grid.year_to_col(self.axis.max) - span_cols.max(1),
        }
    }

    /// Resolve a continuous reposition for `id` on `lane`. Read-only; the
    /// caller commits the returned start column if it wants the move.
    pub fn solve_move(&self, id: &str, lane: usize, span_cols: i64, desired_start: i64) -> Option<i64> {
        let occupied = self.lanes.occupied(lane, Some(id));
        solver::solve_move(&occupied, self.col_bounds(span_cols), span_cols, desired_start)
    }

    /// Resolve a discrete drop for `id` on `lane` around `drop_col`.
    pub fn solve_drop(&self, id: &str, lane: usize, span_cols: i64, drop_col: i64) -> Option<i64> {
        let occupied = self.lanes.occupied(lane, Some(id));
        solver::solve_drop(&occupied, self.col_bounds(span_cols), span_cols, drop_col)
    }

    /// Write an accepted placement. Under `GreedyRepack` the layout is
    /// re-derived afterwards and the evicted ids are returned so the
    /// caller can send those cards back to the pool.
    pub fn commit(&mut self, id: &str, lane: usize, start_col: i64, span_cols: i64) -> Vec<String> {
        self.lanes
            .place(id, lane, ColSpan::with_width(start_col, span_cols));
        match self.lanes.policy() {
            LanePolicy::ServerStable => Vec::new(),
            LanePolicy::GreedyRepack => self.lanes.repack(),
        }
    }

    pub fn remove(&mut self, id: &str) -> bool {
        self.lanes.remove(id).is_some()
    }

    /// Drop every placement and adopt a new lane count, keeping the derived
    /// grid. Used when the host swaps the visible card set wholesale.
    pub fn reset(&mut self, lane_count: usize) {
        self.lanes = LaneRegistry::new(lane_count, self.lanes.policy());
    }
}
