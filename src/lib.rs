//! # Route Calendar
//!
//! Calendar mosaic layout for a year of GPS activities.
//!
//! This library provides:
//! - Normalization of arbitrary GPS tracks into fixed 1 x 1 calendar cells
//! - A shared per-day scale so several runs on one date stay comparable
//! - Date to (day-of-week, week) grid mapping
//! - Month and year layout with day labels and week separators
//!
//! Nothing here draws pixels. Every layout is returned as polylines, text
//! anchors and line segments in grid units for a drawing backend to consume.
//!
//! ## Features
//!
//! - **`parallel`** - Normalize the days of a month in parallel with rayon
//! - **`full`** - Enable all features
//!
//! ## Quick Start
//!
//! ```rust
//! use route_calendar::{ActivityIndex, ActivityLog, CalendarLayout, IndexConfig, LayoutConfig};
//!
//! let json = r#"{"activities": [{
//!     "distance": 5000.0,
//!     "elapsed_time": 1500.0,
//!     "start_time": "2024-03-15T07:30:00",
//!     "sport": "running",
//!     "route": {"lat": [0, 10, 10], "long": [0, 0, 5]}
//! }]}"#;
//!
//! let log = ActivityLog::from_json(json).unwrap();
//! let index = ActivityIndex::from_log(&log, IndexConfig::default()).unwrap();
//! let layout = CalendarLayout::new(&index, LayoutConfig::default());
//!
//! let day = layout.day(2024, 3, 15).unwrap();
//! assert_eq!(day.label.text, "Mar 15");
//!
//! let march = layout.month(2024, 3, geo::coord! { x: 0.0, y: 0.0 }).unwrap();
//! assert_eq!(march.days.len(), 1);
//! assert_eq!(march.separators.len(), 6);
//! ```

use chrono::NaiveDateTime;
use thiserror::Error;

pub mod activity;
pub mod calendar;
pub mod day;
pub mod geo_utils;
pub mod index;
pub mod layout;
pub mod normalize;
pub mod route;

pub use activity::{ActivityFilter, ActivityLog, ActivityRecord, Location, RawRoute};
pub use calendar::{grid_position, GridPosition};
pub use day::Day;
pub use index::{ActivityIndex, DayKey, IndexConfig, MonthKey};
pub use layout::{
    render_calendar, CalendarLayout, DayLayout, DayRoutes, Label, LayoutConfig, MonthLayout,
    YearLayout,
};
pub use normalize::{
    compute_offset, compute_scale, scale_and_offset, CellMargins, ScaleAndOffset,
};
pub use route::Route;

// ============================================================================
// Errors
// ============================================================================

#[derive(Error, Debug)]
pub enum CalendarError {
    #[error("no data for requested date {year}-{month:02}-{day:02}")]
    NoDataForDate { year: i32, month: u32, day: u32 },
    #[error("invalid date {year}-{month:02}-{day:02}")]
    InvalidDate { year: i32, month: u32, day: u32 },
    #[error("column count {0} must be a positive divisor of 12")]
    InvalidColumnCount(u32),
    #[error("duplicate activity starting {start_time}")]
    DuplicateActivity { start_time: NaiveDateTime },
    #[error("route has {lat} latitudes but {long} longitudes")]
    MismatchedRoute { lat: usize, long: usize },
    #[error("invalid activity JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CalendarError>;

// ============================================================================
// Tests
// ============================================================================
