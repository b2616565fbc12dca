//! Day aggregation: every route on one calendar date, drawn at one scale.
//!
//! Scale is shared inside a day so two runs on the same date keep their
//! relative size. It is never shared across days.

use chrono::NaiveDate;
use geo::{Coord, LineString};
use log::debug;

use crate::calendar::GridPosition;
use crate::geo_utils::min_corner;
use crate::normalize::{
    compute_offset, fit_scale, positive_or_unit, CellMargins, ScaleAndOffset,
};
use crate::route::Route;

/// All routes recorded on one date, in the order they were added.
#[derive(Debug, Clone, PartialEq)]
pub struct Day {
    routes: Vec<Route>,
}

impl Day {
    /// Start a day from its first route.
    pub fn new(route: Route) -> Self {
        Self { routes: vec![route] }
    }

    /// Append another route. The caller keeps all routes on the same date.
    pub fn add_route(&mut self, route: Route) {
        debug_assert_eq!(route.date(), self.date());
        self.routes.push(route);
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn date(&self) -> NaiveDate {
        self.routes[0].date()
    }

    /// Grid cell of the day, taken from its first route.
    pub fn default_offset(&self) -> GridPosition {
        self.routes[0].grid_anchor()
    }

    /// Largest individual scale over the non-empty routes.
    ///
    /// The max is taken over raw scales, before the `1.0` clamp that
    /// [`compute_scale`](crate::normalize::compute_scale) applies, so a single-point
    /// route contributes `0.0` rather than `1.0`. Empty routes have no bounding
    /// box and are left out. Falls back to `1.0` when no route has a positive extent.
    pub fn shared_scale(&self, margins: &CellMargins) -> f64 {
        let scale = self
            .routes
            .iter()
            .filter_map(|r| fit_scale(r.points(), margins))
            .fold(0.0_f64, f64::max);
        positive_or_unit(scale)
    }

    /// Per-route transforms at the shared scale, nudged by `extra_offset` grid units.
    pub fn transforms(
        &self,
        extra_offset: Coord,
        margins: &CellMargins,
    ) -> Vec<ScaleAndOffset> {
        let scale = self.shared_scale(margins);
        debug!(
            "Day {}: {} routes at shared scale {:.6}",
            self.date(),
            self.routes.len(),
            scale
        );
        self.routes
            .iter()
            .map(|route| ScaleAndOffset {
                scale,
                offset: compute_offset(route.points(), scale, margins) + extra_offset * scale,
            })
            .collect()
    }

    /// Rendering polylines for every route with the default cell margins.
    ///
    /// Each route is anchored on its own grid cell, then moved by
    /// `-extra_offset` grid units.
    pub fn render(&self, extra_offset: Coord) -> impl Iterator<Item = LineString> + '_ {
        self.render_with(extra_offset, &CellMargins::default())
    }

    /// Same as [`Day::render`] with explicit cell margins.
    pub fn render_with(
        &self,
        extra_offset: Coord,
        margins: &CellMargins,
    ) -> impl Iterator<Item = LineString> + '_ {
        self.routes
            .iter()
            .zip(self.transforms(extra_offset, margins))
            .map(|(route, transform)| route.rendering_points(None, Some(transform)))
    }

    /// Lower-left corner of everything [`Day::render`] draws.
    ///
    /// `None` when every route on the day is empty.
    pub fn bottom_left(&self, extra_offset: Coord) -> Option<Coord> {
        let lines: Vec<LineString> = self.render(extra_offset).collect();
        min_corner(&lines)
    }
}
