//! # Coordinate Normalizer
//!
//! Fits an arbitrary-sized route into a fixed sub-rectangle of a 1 x 1 calendar
//! cell with one uniform scale, so the aspect ratio of the route survives.
//!
//! The transform applied to every raw point is
//!
//! ```text
//! cell_point = (raw_point - offset) / scale
//! ```
//!
//! `scale` is picked from the tighter axis so the bounding box never leaves the
//! target rectangle, and `offset` aligns the box with the rectangle and then
//! centers it along the looser axis.

use geo::Coord;
use serde::{Deserialize, Serialize};

use crate::geo_utils::compute_bounds;

/// Target sub-rectangle of a unit cell, as fractions of the cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellMargins {
    /// Horizontal target range. Default: (0.1, 0.9)
    pub xlims: (f64, f64),
    /// Vertical target range. Default: (0.1, 0.9)
    pub ylims: (f64, f64),
}

impl Default for CellMargins {
    fn default() -> Self {
        Self {
            xlims: (0.1, 0.9),
            ylims: (0.1, 0.9),
        }
    }
}

impl CellMargins {
    /// Width of the target rectangle.
    #[inline]
    pub fn width(&self) -> f64 {
        self.xlims.1 - self.xlims.0
    }

    /// Height of the target rectangle.
    #[inline]
    pub fn height(&self) -> f64 {
        self.ylims.1 - self.ylims.0
    }
}

/// A uniform scale plus a per-axis offset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleAndOffset {
    /// Divisor applied to both axes. Always positive.
    pub scale: f64,
    /// Subtracted from each raw point before dividing by `scale`.
    pub offset: Coord,
}

impl ScaleAndOffset {
    /// The transform used for empty routes.
    pub const IDENTITY: Self = Self {
        scale: 1.0,
        offset: Coord { x: 0.0, y: 0.0 },
    };

    /// Map a raw point into cell units and then shift it by `anchor`.
    #[inline]
    pub fn apply(&self, point: Coord, anchor: Coord) -> Coord {
        Coord {
            x: (point.x - self.offset.x) / self.scale + anchor.x,
            y: (point.y - self.offset.y) / self.scale + anchor.y,
        }
    }
}

/// Raw tight-axis scale, or `None` for an empty route.
///
/// Unlike [`compute_scale`] this can return `0.0` for a route whose points all
/// coincide. The day aggregator needs the raw value to take a max over routes.
pub(crate) fn fit_scale(points: &[Coord], margins: &CellMargins) -> Option<f64> {
    let bounds = compute_bounds(points)?;
    let sx = bounds.width() / margins.width();
    let sy = bounds.height() / margins.height();
    Some(sx.max(sy))
}

/// Clamp a raw scale to something safe to divide by.
#[inline]
pub(crate) fn positive_or_unit(scale: f64) -> f64 {
    if scale > 0.0 && scale.is_finite() {
        scale
    } else {
        1.0
    }
}

/// Compute the uniform scale that fits `points` inside `margins`.
///
/// Returns `1.0` for an empty route or one whose points all coincide.
///
/// # Example
///
/// ```rust
/// use geo::coord;
/// use route_calendar::normalize::{compute_scale, CellMargins};
///
/// let points = vec![coord! { x: 0.0, y: 0.0 }, coord! { x: 10.0, y: 5.0 }];
/// let scale = compute_scale(&points, &CellMargins::default());
/// assert!((scale - 12.5).abs() < 1e-9);
/// ```
pub fn compute_scale(points: &[Coord], margins: &CellMargins) -> f64 {
    fit_scale(points, margins).map_or(1.0, positive_or_unit)
}

/// Compute the offset that places `points` inside `margins` at `scale`.
///
/// After `(point - offset) / scale` the box's minimum lands on the rectangle's
/// lower corner, then the box is moved by half the unused room on each axis.
/// Returns `(0, 0)` for an empty route.
pub fn compute_offset(points: &[Coord], scale: f64, margins: &CellMargins) -> Coord {
    let Some(bounds) = compute_bounds(points) else {
        return Coord { x: 0.0, y: 0.0 };
    };

    let mut offset = bounds.min();
    offset.x -= scale * margins.xlims.0;
    offset.y -= scale * margins.ylims.0;

    // Far edge of the scaled box once its minimum sits on the lower margin.
    let padding = Coord {
        x: (bounds.max().x - offset.x) / scale,
        y: (bounds.max().y - offset.y) / scale,
    };

    offset.x -= 0.5 * scale * (margins.xlims.1 - padding.x);
    offset.y -= 0.5 * scale * (margins.ylims.1 - padding.y);

    offset
}

/// Compute scale and offset together for a standalone route.
pub fn scale_and_offset(points: &[Coord], margins: &CellMargins) -> ScaleAndOffset {
    if points.is_empty() {
        return ScaleAndOffset::IDENTITY;
    }
    let scale = compute_scale(points, margins);
    let offset = compute_offset(points, scale, margins);
    ScaleAndOffset { scale, offset }
}
