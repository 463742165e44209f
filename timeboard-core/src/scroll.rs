/// Distance from a container edge, in CSS pixels, where drag auto-scroll
/// starts to engage.
pub const EDGE_PX: f64 = 48.0;

/// Fastest auto-scroll step, in CSS pixels per animation frame.
pub const MAX_STEP_PX: f64 = 18.0;

/// Horizontal auto-scroll step for a pointer near a container edge.
/// Ramps from one pixel at the zone boundary up to `MAX_STEP_PX` at the
/// container edge; negative steps scroll left, zero means the pointer is
/// clear of both zones.
pub fn edge_velocity(pointer_x: f64, container_left: f64, container_right: f64) -> f64 {
    if pointer_x < container_left + EDGE_PX {
        let t = ((container_left + EDGE_PX - pointer_x) / EDGE_PX).clamp(0.0, 1.0);
        -(MAX_STEP_PX * t).ceil()
    } else if pointer_x > container_right - EDGE_PX {
        let t = ((pointer_x - (container_right - EDGE_PX)) / EDGE_PX).clamp(0.0, 1.0);
        (MAX_STEP_PX * t).ceil()
    } else {
        0.0
    }
}
