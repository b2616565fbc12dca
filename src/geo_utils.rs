//! # Geometry Utilities
//!
//! Bounding-box helpers for the 2-D point sequences that flow through the
//! layout engine, both raw route coordinates and rendered polylines.
//!
//! ## Overview
//!
//! | Function | Description |
//! |----------|-------------|
//! | [`compute_bounds`] | Bounding rectangle of a point slice |
//! | [`extent`] | Width and height of a point slice |
//! | [`min_corner`] | Per-axis minimum across several polylines |
//! | [`polyline_bounds`] | Bounding rectangle across several polylines |
//!
//! ## Example
//!
//! ```rust
//! use geo::coord;
//! use route_calendar::geo_utils;
//!
//! let track = vec![
//!     coord! { x: 0.0, y: 0.0 },
//!     coord! { x: 10.0, y: 5.0 },
//! ];
//!
//! let bounds = geo_utils::compute_bounds(&track).unwrap();
//! assert_eq!(bounds.width(), 10.0);
//! assert_eq!(bounds.height(), 5.0);
//! ```
//!
//! ## Coordinate System
//!
//! Route points are stored in raw geographic units with `x` holding latitude
//! and `y` holding longitude. Rendered polylines live in calendar grid units
//! where one day cell is 1 x 1.

use geo::{Coord, LineString, Rect};

// =============================================================================
// Bounding Box Functions
// =============================================================================

/// Compute the bounding rectangle of a point slice.
///
/// Returns `None` for empty input, so callers can tell a degenerate route
/// apart from a route collapsed onto a single point.
///
/// # Example
///
/// ```rust
/// use geo::coord;
/// use route_calendar::geo_utils;
///
/// let track = vec![
///     coord! { x: 51.50, y: -0.13 },
///     coord! { x: 51.51, y: -0.12 },
///     coord! { x: 51.505, y: -0.125 },
/// ];
///
/// let bounds = geo_utils::compute_bounds(&track).unwrap();
/// assert_eq!(bounds.min().x, 51.50);
/// assert_eq!(bounds.max().y, -0.12);
/// ```
pub fn compute_bounds(points: &[Coord]) -> Option<Rect> {
    let first = points.first()?;

    let mut min = *first;
    let mut max = *first;

    for p in &points[1..] {
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
    }

    Some(Rect::new(min, max))
}

/// Width and height of a point slice, or `None` when it is empty.
#[inline]
pub fn extent(points: &[Coord]) -> Option<Coord> {
    compute_bounds(points).map(|r| Coord { x: r.width(), y: r.height() })
}

/// Bounding rectangle across several polylines.
///
/// Empty polylines are skipped. Returns `None` if every polyline is empty.
pub fn polyline_bounds<'a, I>(lines: I) -> Option<Rect>
where
    I: IntoIterator<Item = &'a LineString>,
{
    lines
        .into_iter()
        .filter_map(|line| compute_bounds(&line.0))
        .reduce(|a, b| {
            Rect::new(
                Coord { x: a.min().x.min(b.min().x), y: a.min().y.min(b.min().y) },
                Coord { x: a.max().x.max(b.max().x), y: a.max().y.max(b.max().y) },
            )
        })
}

/// Per-axis minimum across several polylines.
///
/// This is the lower-left corner of the combined bounding box, used to anchor
/// a day label so it never sits on top of the drawn routes.
#[inline]
pub fn min_corner<'a, I>(lines: I) -> Option<Coord>
where
    I: IntoIterator<Item = &'a LineString>,
{
    polyline_bounds(lines).map(|r| r.min())
}

// =============================================================================
// Unit Tests
// =============================================================================
