//! Utility functions for visualization: colors, axis bounds, gap splitting.

use crate::trend::SeriesColor;
use plotters::prelude::*;

#[inline]
pub fn rgb(color: SeriesColor) -> RGBColor {
    RGBColor(color.0, color.1, color.2)
}

/// X range for the year axis, padded half a year on each side.
/// A single year gets one year of room on both sides.
pub fn year_bounds(years: &[i32]) -> Option<(f64, f64)> {
    let min = *years.iter().min()?;
    let max = *years.iter().max()?;
    if min == max {
        Some((min as f64 - 1.0, max as f64 + 1.0))
    } else {
        Some((min as f64 - 0.5, max as f64 + 0.5))
    }
}

/// `(low, high)` for the rank axis. `low` is the floor (never below it), `high`
/// leaves ~10% headroom above the worst rank and is rounded up to a multiple of 5.
pub fn rank_bounds(max_rank: Option<u32>, floor: f64) -> (f64, f64) {
    let worst = max_rank.map(f64::from).unwrap_or(10.0).max(floor + 1.0);
    let padded = (worst * 1.1).max(worst + 1.0);
    let high = (padded / 5.0).ceil() * 5.0;
    (floor, high)
}

/// Split a gap-marked series into runs of consecutive known values.
pub fn line_segments(years: &[i32], values: &[Option<u32>]) -> Vec<Vec<(f64, f64)>> {
    let mut out = Vec::new();
    let mut current: Vec<(f64, f64)> = Vec::new();
    for (y, v) in years.iter().zip(values) {
        match v {
            Some(r) => current.push((*y as f64, *r as f64)),
            None => {
                if !current.is_empty() {
                    out.push(std::mem::take(&mut current));
                }
            }
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}
