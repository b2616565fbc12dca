//! Parsed activity records and the filters applied before indexing.
//!
//! Records arrive already decoded from FIT/GPX. The JSON shape matches the
//! activity cache written by the parsing side:
//!
//! ```json
//! {
//!   "activities": [
//!     {
//!       "distance": 5012.3,
//!       "elapsed_time": 1534.0,
//!       "start_time": "2024-03-15T07:30:00",
//!       "sport": "running",
//!       "sub_sport": "generic",
//!       "location": { "lat": 51.5, "long": -0.12 },
//!       "route": { "lat": [614000000, 614000100], "long": [-1400000, -1400100] }
//!     }
//!   ]
//! }
//! ```

use chrono::{NaiveDate, NaiveDateTime};
use geo::Coord;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{CalendarError, Result};

/// Start position of an activity, if the device recorded one.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Location {
    pub lat: Option<f64>,
    pub long: Option<f64>,
}

/// Route coordinates as parallel latitude/longitude sequences.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawRoute {
    pub lat: Vec<f64>,
    pub long: Vec<f64>,
}

impl RawRoute {
    pub fn new(lat: Vec<f64>, long: Vec<f64>) -> Result<Self> {
        let route = Self { lat, long };
        route.validate()?;
        Ok(route)
    }

    /// Check that both sequences have the same length.
    pub fn validate(&self) -> Result<()> {
        if self.lat.len() != self.long.len() {
            return Err(CalendarError::MismatchedRoute {
                lat: self.lat.len(),
                long: self.long.len(),
            });
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.lat.len().min(self.long.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Transpose into points with `x` = latitude and `y` = longitude.
    pub fn to_points(&self) -> Vec<Coord> {
        self.lat
            .iter()
            .zip(&self.long)
            .map(|(&x, &y)| Coord { x, y })
            .collect()
    }
}

/// One parsed activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    /// Distance in meters.
    #[serde(default)]
    pub distance: f64,
    /// Elapsed timer time in seconds.
    #[serde(default)]
    pub elapsed_time: f64,
    /// Naive local start time.
    pub start_time: NaiveDateTime,
    #[serde(default)]
    pub sport: Option<String>,
    #[serde(default)]
    pub sub_sport: Option<String>,
    #[serde(default)]
    pub location: Location,
    #[serde(default)]
    pub route: RawRoute,
}

impl ActivityRecord {
    /// Build a record with just a start time and route.
    pub fn new(start_time: NaiveDateTime, route: RawRoute) -> Self {
        Self {
            distance: 0.0,
            elapsed_time: 0.0,
            start_time,
            sport: None,
            sub_sport: None,
            location: Location::default(),
            route,
        }
    }

    /// Calendar date of the start time.
    pub fn date(&self) -> NaiveDate {
        self.start_time.date()
    }

    /// Seconds per meter, or `None` without a usable distance.
    pub fn pace(&self) -> Option<f64> {
        if self.distance > 0.0 {
            Some(self.elapsed_time / self.distance)
        } else {
            None
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let record: Self = serde_json::from_str(json)?;
        record.route.validate()?;
        Ok(record)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// The `{"activities": [...]}` document handed over by the parsing side.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ActivityLog {
    pub activities: Vec<ActivityRecord>,
}

impl ActivityLog {
    pub fn from_json(json: &str) -> Result<Self> {
        let log: Self = serde_json::from_str(json)?;
        for record in &log.activities {
            record.route.validate()?;
        }
        debug!("Parsed activity log with {} records", log.activities.len());
        Ok(log)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

// ============================================================================
// Filters
// ============================================================================

/// Pace window (seconds per meter) assumed for unlabelled runs:
/// roughly 5 to 10 minutes per mile.
pub const RUNNING_PACE_RANGE: (f64, f64) = (0.1875, 0.375);

/// Selects which records go into a calendar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityFilter {
    /// Sport to keep. Default: "running"
    pub sport: Option<String>,
    /// Inclusive lower bound on start time.
    pub start: Option<NaiveDateTime>,
    /// Exclusive upper bound on start time.
    pub end: Option<NaiveDateTime>,
}

impl Default for ActivityFilter {
    fn default() -> Self {
        Self {
            sport: Some("running".to_string()),
            start: None,
            end: None,
        }
    }
}

impl ActivityFilter {
    /// Keep `sport` activities that start within `year`.
    pub fn for_year(sport: &str, year: i32) -> Self {
        let bound = |y: i32| {
            NaiveDate::from_ymd_opt(y, 1, 1).and_then(|d| d.and_hms_opt(0, 0, 0))
        };
        Self {
            sport: Some(sport.to_string()),
            start: bound(year),
            end: bound(year + 1),
        }
    }

    pub fn matches(&self, record: &ActivityRecord) -> bool {
        self.sport.as_deref().map_or(true, |s| is_sport(record, s))
            && self.start.map_or(true, |t| is_after(record, t))
            && self.end.map_or(true, |t| is_before(record, t))
    }
}

/// Does the record belong to `sport`?
///
/// Records without a sport label fall back to a pace check, which only knows
/// about running. Zero-distance unlabelled records never match.
pub fn is_sport(record: &ActivityRecord, sport: &str) -> bool {
    match record.sport.as_deref() {
        Some(label) => label == sport,
        None => {
            let (lo, hi) = if sport == "running" {
                RUNNING_PACE_RANGE
            } else {
                (0.0, 0.0)
            };
            record.pace().map_or(false, |pace| lo < pace && pace < hi)
        }
    }
}

/// Started at or after `start`.
pub fn is_after(record: &ActivityRecord, start: NaiveDateTime) -> bool {
    record.start_time >= start
}

/// Started strictly before `end`.
pub fn is_before(record: &ActivityRecord, end: NaiveDateTime) -> bool {
    record.start_time < end
}
