use serde::{Deserialize, Serialize};

/// Default number of columns a derived grid aims for across its span.
pub const TARGET_COLS: i64 = 40;

/// Inclusive year range shown on the horizontal axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Axis {
    pub min: i64,
    pub max: i64,
}

/// Horizontal pixel band the axis maps onto, in CSS pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Track {
    pub left: f64,
    pub width: f64,
}

impl Axis {
    pub fn span_years(&self) -> i64 {
        self.max - self.min
    }

    /// Map a year to an x position on the track, clamped to the track ends.
    pub fn year_to_x(&self, year: i64, track: Track) -> f64 {
        let span = self.span_years();
        if span <= 0 {
            return track.left;
        }
        let t = ((year - self.min) as f64 / span as f64).clamp(0.0, 1.0);
        track.left + t * track.width
    }

    /// Map an x position back to a whole year, clamped to the axis range.
    pub fn x_to_year(&self, x: f64, track: Track) -> i64 {
        if track.width <= 0.0 {
            return self.min;
        }
        let t = ((x - track.left) / track.width).clamp(0.0, 1.0);
        round_half_up(self.min as f64 + t * self.span_years() as f64)
    }

    /// Evenly spaced tick years across the axis, endpoints included.
    /// Used when the host supplies no tick list of its own.
    pub fn even_ticks(&self, count: usize) -> Vec<i64> {
        match count {
            0 => Vec::new(),
            1 => vec![self.min],
            _ => {
                let step = self.span_years() as f64 / (count - 1) as f64;
                (0..count)
                    .map(|i| round_half_up(self.min as f64 + step * i as f64))
                    .collect()
            }
        }
    }
}

/// Quantization grid for guess positions: years snap to column boundaries
/// spaced `cell_size_years` apart starting at `origin_year`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    pub origin_year: i64,
    pub cell_size_years: i64,
}

impl Grid {
    /// Derive origin and cell size so roughly `target_cols` columns cover
    /// both the deck's year extent and the axis. The cell size never drops
    /// below one year.
    pub fn derive(axis: Axis, earliest: i64, latest: i64, target_cols: i64) -> Grid {
        let origin_year = earliest.min(axis.min);
        let span_years = (latest.max(axis.max) - origin_year).max(1);
        let cell_size_years = div_round(span_years, target_cols.max(1)).max(1);
        Grid {
            origin_year,
            cell_size_years,
        }
    }

    pub fn year_to_col(&self, year: i64) -> i64 {
        div_round(year - self.origin_year, self.cell_size_years)
    }

    pub fn col_to_year(&self, col: i64) -> i64 {
        self.origin_year + col * self.cell_size_years
    }

    /// Snap a year to its nearest column boundary.
    pub fn snap_year(&self, year: i64) -> i64 {
        self.col_to_year(self.year_to_col(year))
    }

    /// Column width for a duration in years, at least one column.
    pub fn span_cols(&self, duration_years: i64) -> i64 {
        div_round(duration_years, self.cell_size_years).max(1)
    }
}

/// Era-aware label for a year; negative years read as BCE.
pub fn format_year(year: i64) -> String {
    if year < 0 {
        format!("{} BCE", -year)
    } else if year == 0 {
        "0".to_string()
    } else {
        format!("{} CE", year)
    }
}

// Integer division rounding to nearest, halves toward positive infinity.
fn div_round(numer: i64, denom: i64) -> i64 {
    debug_assert!(denom > 0);
    (2 * numer + denom).div_euclid(2 * denom)
}

// Same tie-break for floats: -1.5 rounds to -1, 1.5 rounds to 2.
fn round_half_up(v: f64) -> i64 {
    (v + 0.5).floor() as i64
}
