use crate::lanes::ColSpan;

/// Inclusive range of start columns a span may legally occupy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Corridor {
    pub left: i64,
    pub right: i64,
}

impl Corridor {
    pub fn is_empty(&self) -> bool {
        self.left > self.right
    }

    pub fn clamp(&self, col: i64) -> i64 {
        col.max(self.left).min(self.right)
    }
}

/// Narrow `bounds` around `anchor_col` using the same-lane occupied spans.
/// A span entirely left of the anchor raises the left wall to its end; a
/// span entirely right of `anchor + span_cols` lowers the right wall to
/// its start minus the span width. Spans straddling the anchor leave the
/// walls alone and are caught by the overlap check instead.
pub fn corridor(occupied: &[ColSpan], bounds: Corridor, span_cols: i64, anchor_col: i64) -> Corridor {
    let mut left = bounds.left;
    let mut right = bounds.right;
    for iv in occupied {
        if iv.end() <= anchor_col {
            left = left.max(iv.end());
        }
        if iv.start() >= anchor_col + span_cols {
            right = right.min(iv.start() - span_cols);
        }
    }
    Corridor { left, right }
}

/// Continuous reposition during a drag. Returns the accepted start column,
/// or `None` when no legal start exists at this pointer position; the
/// caller then holds the card at its last accepted placement.
pub fn solve_move(
    occupied: &[ColSpan],
    bounds: Corridor,
    span_cols: i64,
    desired_start: i64,
) -> Option<i64> {
    let span_cols = span_cols.max(1);
    let walls = corridor(occupied, bounds, span_cols, desired_start);
    if walls.is_empty() {
        return None;
    }
    let start = walls.clamp(desired_start);
    if overlaps_any(occupied, start, span_cols) {
        return None;
    }
    Some(start)
}

/// Discrete placement for a drop. The span is centered on the drop column,
/// clamped into the corridor, then pushed outward one column at a time,
/// right side first, until a free start appears. `None` means the lane has
/// no room near the drop point.
pub fn solve_drop(
    occupied: &[ColSpan],
    bounds: Corridor,
    span_cols: i64,
    drop_col: i64,
) -> Option<i64> {
    let span_cols = span_cols.max(1);
    let walls = corridor(occupied, bounds, span_cols, drop_col);
    if walls.is_empty() {
        return None;
    }
    let start = walls.clamp(drop_col - span_cols / 2);
    if !overlaps_any(occupied, start, span_cols) {
        return Some(start);
    }
    let max_delta = (start - walls.left).max(walls.right - start);
    for delta in 1..=max_delta {
        let to_right = start + delta;
        if to_right <= walls.right && !overlaps_any(occupied, to_right, span_cols) {
            return Some(to_right);
        }
        let to_left = start - delta;
        if to_left >= walls.left && !overlaps_any(occupied, to_left, span_cols) {
            return Some(to_left);
        }
    }
    None
}

fn overlaps_any(occupied: &[ColSpan], start_col: i64, span_cols: i64) -> bool {
    let candidate = ColSpan::with_width(start_col, span_cols);
    occupied.iter().any(|iv| iv.overlaps(&candidate))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOUNDS: Corridor = Corridor { left: 0, right: 37 };

    fn spans(list: &[(i64, i64)]) -> Vec<ColSpan> {
        list.iter().map(|&(s, e)| ColSpan::new(s, e)).collect()
    }

    #[test]
    fn move_clear_of_neighbors_is_accepted_as_is() {
        let occ = spans(&[(10, 15)]);
        assert_eq!(solve_move(&occ, BOUNDS, 3, 16), Some(16));
        assert_eq!(solve_move(&occ, BOUNDS, 3, 20), Some(20));
    }

    #[test]
    fn move_into_an_occupied_block_is_rejected() {
        let occ = spans(&[(10, 15)]);
        assert_eq!(solve_move(&occ, BOUNDS, 3, 13), None);
        assert_eq!(solve_move(&occ, BOUNDS, 3, 9), None);
    }

    #[test]
    fn move_clamps_to_a_neighbor_wall() {
        let occ = spans(&[(10, 15)]);
        // Pushing right past the block stops flush against its end.
        assert_eq!(solve_move(&occ, BOUNDS, 3, 15), Some(15));
        // Pushing left against it stops at start - span.
        assert_eq!(solve_move(&occ, BOUNDS, 3, 7), Some(7));
    }

    #[test]
    fn move_clamps_to_axis_bounds() {
        assert_eq!(solve_move(&[], BOUNDS, 3, -10), Some(0));
        assert_eq!(solve_move(&[], BOUNDS, 3, 99), Some(37));
    }

    #[test]
    fn move_rejects_when_walls_cross_the_bounds() {
        // The block's wall pushes the right bound below the left bound.
        let occ = spans(&[(14, 20)]);
        let bounds = Corridor { left: 12, right: 17 };
        assert_eq!(solve_move(&occ, bounds, 3, 11), None);
        // One column further right the block straddles the span instead.
        assert_eq!(solve_move(&occ, bounds, 3, 12), None);
    }

    #[test]
    fn move_rejects_inverted_bounds_outright() {
        let bounds = Corridor { left: 0, right: -2 };
        assert_eq!(solve_move(&[], bounds, 5, 0), None);
        assert_eq!(solve_drop(&[], bounds, 5, 0), None);
    }

    #[test]
    fn exact_gap_between_two_blocks_is_usable() {
        let occ = spans(&[(0, 6), (9, 25)]);
        assert_eq!(solve_move(&occ, Corridor { left: 0, right: 17 }, 3, 6), Some(6));
    }

    #[test]
    fn accepted_moves_are_idempotent() {
        let occ = spans(&[(10, 15), (20, 24)]);
        let first = solve_move(&occ, BOUNDS, 3, 16);
        assert_eq!(first, Some(16));
        assert_eq!(solve_move(&occ, BOUNDS, 3, 16), first);
    }

    #[test]
    fn drop_centers_on_the_drop_column() {
        assert_eq!(solve_drop(&[], BOUNDS, 4, 10), Some(8));
        assert_eq!(solve_drop(&[], BOUNDS, 1, 10), Some(10));
    }

    #[test]
    fn drop_walks_outward_to_the_nearest_free_start() {
        let occ = spans(&[(5, 8), (8, 12)]);
        assert_eq!(solve_drop(&occ, BOUNDS, 2, 9), Some(12));
    }

    #[test]
    fn drop_prefers_the_right_side_on_ties() {
        let occ = spans(&[(5, 6)]);
        assert_eq!(solve_drop(&occ, BOUNDS, 1, 5), Some(6));
    }

    #[test]
    fn drop_can_reach_the_far_end_of_the_corridor() {
        let occ = spans(&[(0, 9)]);
        let bounds = Corridor { left: 0, right: 9 };
        assert_eq!(solve_drop(&occ, bounds, 1, 0), Some(9));
    }

    #[test]
    fn drop_on_a_full_lane_is_rejected() {
        let occ = spans(&[(0, 10)]);
        let bounds = Corridor { left: 0, right: 9 };
        assert_eq!(solve_drop(&occ, bounds, 2, 5), None);
        assert_eq!(solve_move(&occ, bounds, 2, 4), None);
    }

    #[test]
    fn degenerate_span_is_treated_as_one_column() {
        assert_eq!(solve_drop(&[], BOUNDS, 0, 4), Some(4));
        assert_eq!(solve_move(&[], BOUNDS, 0, 4), Some(4));
    }
}
