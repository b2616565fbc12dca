//! # Calendar Grid Mapper
//!
//! Maps a calendar date onto a (day-of-week, week) cell of the mosaic grid.
//!
//! Columns run Sunday (0) through Saturday (6). Rows are ISO weeks, stored
//! negated so later weeks sit further down when drawn with the y axis pointing
//! up. Sunday belongs to the row of the *following* ISO week.
//!
//! The year-boundary handling is a heuristic rather than a linear week count:
//!
//! - January 1st is pinned to `(1, -1)` whatever weekday it falls on.
//! - Other dates add `52 * (iso_year mod year)` to their ISO week. Late-December
//!   dates in ISO week 1 of the next year land on week 53, while early-January
//!   dates still in the previous ISO year land far below the rest of the year.
//!
//! Month layout only relies on rows being contiguous inside a month, so this is
//! kept as is.

use chrono::{Datelike, NaiveDate};
use geo::Coord;

/// Cell of a date in the calendar grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridPosition {
    /// Column in 0..=6, Sunday = 0.
    pub day_of_week: i32,
    /// Negated week row. Never positive for real dates.
    pub week: i32,
}

impl GridPosition {
    pub fn new(day_of_week: i32, week: i32) -> Self {
        Self { day_of_week, week }
    }

    /// Lower-left corner of the cell in grid units.
    #[inline]
    pub fn to_coord(self) -> Coord {
        Coord {
            x: f64::from(self.day_of_week),
            y: f64::from(self.week),
        }
    }
}

impl From<GridPosition> for Coord {
    fn from(pos: GridPosition) -> Self {
        pos.to_coord()
    }
}

/// Map a date to its grid cell.
///
/// # Example
///
/// ```rust
/// use chrono::NaiveDate;
/// use route_calendar::calendar::{grid_position, GridPosition};
///
/// // Friday 15 March 2024 is in ISO week 11.
/// let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
/// assert_eq!(grid_position(date), GridPosition::new(5, -11));
///
/// // January 1st is always pinned.
/// let new_year = NaiveDate::from_ymd_opt(2022, 1, 1).unwrap();
/// assert_eq!(grid_position(new_year), GridPosition::new(1, -1));
/// ```
pub fn grid_position(date: NaiveDate) -> GridPosition {
    if date.month() == 1 && date.day() == 1 {
        return GridPosition::new(1, -1);
    }

    let iso = date.iso_week();
    let mut week = iso.week() as i32;
    if iso.year() != date.year() {
        // Year 0 has no remainder; it keeps the unadjusted ISO week.
        week += 52 * iso.year().checked_rem_euclid(date.year()).unwrap_or(0);
    }

    let weekday = date.weekday().number_from_monday() as i32;
    week += weekday / 7;
    let day_of_week = weekday % 7;

    GridPosition::new(day_of_week, -week)
}

/// Day-of-month label: `"Mar 1"` on the first of a month, `"15"` otherwise.
pub fn day_label(date: NaiveDate) -> String {
    if date.day() == 1 {
        full_label(date)
    } else {
        date.day().to_string()
    }
}

/// Month abbreviation plus day number, e.g. `"Mar 15"`.
pub fn full_label(date: NaiveDate) -> String {
    format!("{} {}", date.format("%b"), date.day())
}

/// Every date of a month in order, or `None` if the month is invalid.
pub fn month_dates(year: i32, month: u32) -> Option<impl Iterator<Item = NaiveDate>> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    Some(first.iter_days().take_while(move |d| d.month() == month && d.year() == year))
}
