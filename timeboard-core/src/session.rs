use serde::{Deserialize, Serialize};

use crate::grid::Grid;

/// Lifecycle of one drag gesture.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DragPhase {
    #[default]
    Idle,
    Dragging,
    /// Closed with the final placement accepted.
    Resolved,
    /// Closed keeping the last committed placement.
    Reverted,
}

/// Everything one drag gesture needs, captured at pointer-down.
///
/// The span is fixed for the whole gesture; the grab offset is the pointer
/// year minus the guess start at grab time, so the block does not jump
/// under the pointer. Serializable so a host can inspect or persist an
/// in-flight gesture.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DragSession {
    pub card_id: String,
    pub pointer_id: i32,
    pub span_cols: i64,
    pub grab_offset_years: i64,
    pub origin_lane: usize,
    pub origin_start_col: i64,
    pub phase: DragPhase,
}

impl DragSession {
    pub fn begin(
        card_id: impl Into<String>,
        pointer_id: i32,
        span_cols: i64,
        grab_offset_years: i64,
        origin_lane: usize,
        origin_start_col: i64,
    ) -> DragSession {
        DragSession {
            card_id: card_id.into(),
            pointer_id,
            span_cols: span_cols.max(1),
            grab_offset_years,
            origin_lane,
            origin_start_col,
            phase: DragPhase::Dragging,
        }
    }

    pub fn is_active(&self) -> bool {
        self.phase == DragPhase::Dragging
    }

    /// Desired start column for a pointer year with the grab offset
    /// removed.
    pub fn desired_start_col(&self, grid: &Grid, pointer_year: i64) -> i64 {
        grid.year_to_col(pointer_year - self.grab_offset_years)
    }

    pub fn resolve(&mut self) {
        if self.is_active() {
            self.phase = DragPhase::Resolved;
        }
    }

    /// Pointer cancel takes this path too; the card stays wherever the
    /// last accepted move left it.
    pub fn revert(&mut self) {
        if self.is_active() {
            self.phase = DragPhase::Reverted;
        }
    }
}
