//! One activity's geometry, ready to be placed in a calendar cell.

use chrono::{NaiveDate, NaiveDateTime};
use geo::{Coord, LineString};

use crate::activity::ActivityRecord;
use crate::calendar::{grid_position, GridPosition};
use crate::normalize::{scale_and_offset, CellMargins, ScaleAndOffset};
use crate::Result;

/// A route owns its raw points (`x` = latitude, `y` = longitude) and start time.
///
/// Rendering never mutates the route: every call to [`Route::rendering_points`]
/// produces a fresh polyline for whatever transform it is given.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    points: Vec<Coord>,
    start_time: NaiveDateTime,
    distance: f64,
    origin: Coord,
}

impl Route {
    pub fn new(points: Vec<Coord>, start_time: NaiveDateTime) -> Self {
        Self {
            points,
            start_time,
            distance: 0.0,
            origin: Coord { x: 0.0, y: 0.0 },
        }
    }

    /// Build a route from a parsed activity record.
    pub fn from_record(record: &ActivityRecord) -> Result<Self> {
        record.route.validate()?;
        Ok(Self {
            distance: record.distance,
            ..Self::new(record.route.to_points(), record.start_time)
        })
    }

    /// Extra translation added to the grid anchor for self-anchored rendering.
    pub fn with_origin(mut self, origin: Coord) -> Self {
        self.origin = origin;
        self
    }

    pub fn points(&self) -> &[Coord] {
        &self.points
    }

    pub fn start_time(&self) -> NaiveDateTime {
        self.start_time
    }

    pub fn distance(&self) -> f64 {
        self.distance
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn date(&self) -> NaiveDate {
        self.start_time.date()
    }

    pub fn grid_anchor(&self) -> GridPosition {
        grid_position(self.date())
    }

    /// Scale and offset fitting this route alone into `margins`.
    pub fn scale_and_offset(&self, margins: &CellMargins) -> ScaleAndOffset {
        scale_and_offset(&self.points, margins)
    }

    /// Transform the route into grid units.
    ///
    /// Without an `anchor` the route is placed at `origin + grid_anchor()`.
    /// Without a `transform` it is normalized against its own bounding box with
    /// the default cell margins.
    pub fn rendering_points(
        &self,
        anchor: Option<Coord>,
        transform: Option<ScaleAndOffset>,
    ) -> LineString {
        let anchor = anchor.unwrap_or_else(|| self.origin + self.grid_anchor().to_coord());
        let transform =
            transform.unwrap_or_else(|| self.scale_and_offset(&CellMargins::default()));

        self.points
            .iter()
            .map(|p| transform.apply(*p, anchor))
            .collect()
    }
}
