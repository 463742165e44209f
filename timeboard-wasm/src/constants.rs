/// Canvas layout constants, all in CSS pixels.
pub const PAD_LEFT: f64 = 40.0;
pub const PAD_RIGHT: f64 = 20.0;
pub const PAD_TOP: f64 = 32.0;
pub const PAD_BOTTOM: f64 = 24.0;
/// Height of the axis header band above the lanes.
pub const HEADER_H: f64 = 36.0;
pub const LANE_H: f64 = 88.0;
pub const LANE_GAP: f64 = 18.0;
/// Height of a placed block, centered inside its lane.
pub const BLOCK_H: f64 = 56.0;
/// Bars never render narrower than this.
pub const BAR_MIN_W: f64 = 6.0;
/// Bars at least this wide carry their label inside; narrower ones get a
/// bubble above the bar.
pub const WIDE_BAR_PX: f64 = 140.0;
