//! Month and year layout of the calendar mosaic.
//!
//! A month is a 7-column grid of day cells, one row per week. A year stacks
//! months vertically inside columns and places the columns side by side.
//! Everything returned is in grid units and ready to hand to a drawing backend:
//! route polylines, text labels with anchors, and week separator segments.

use chrono::NaiveDate;
use geo::{Coord, Line, LineString};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::activity::{ActivityFilter, ActivityRecord};
use crate::calendar::{day_label, full_label, grid_position, month_dates};
use crate::day::Day;
use crate::index::{ActivityIndex, IndexConfig};
use crate::normalize::CellMargins;
use crate::{CalendarError, Result};

/// Months in a year, which the column count has to divide.
const MONTHS: u32 = 12;

/// Width of a week separator, leaving a small gap before the next cell.
const SEPARATOR_WIDTH: f64 = 0.95;

/// Lift of day-of-month labels above the bottom of their row.
const LABEL_LIFT: f64 = 0.05;

/// Configuration for the year mosaic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Number of month columns. Must divide 12. Default: 4
    pub n_cols: u32,
    /// Extra rows between stacked months. Default: 0.0
    pub month_gap: f64,
    /// Extra columns between month columns. Default: 0.5
    pub col_gap: f64,
    /// Multiplier on the suggested figure size. Default: 1.0
    pub plot_size: f64,
    /// Title text. `None` uses the year, `Some("")` draws no title.
    pub label: Option<String>,
    /// Target sub-rectangle of each day cell.
    pub margins: CellMargins,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            n_cols: 4,
            month_gap: 0.0,
            col_gap: 0.5,
            plot_size: 1.0,
            label: None,
            margins: CellMargins::default(),
        }
    }
}

impl LayoutConfig {
    /// Reject column counts that would leave months out.
    pub fn validate(&self) -> Result<()> {
        if self.n_cols == 0 || MONTHS % self.n_cols != 0 {
            return Err(CalendarError::InvalidColumnCount(self.n_cols));
        }
        Ok(())
    }

    /// Months stacked in each column.
    pub fn months_per_column(&self) -> u32 {
        MONTHS / self.n_cols.max(1)
    }

    /// Suggested figure size (width, height) in inches.
    pub fn figure_size(&self) -> (f64, f64) {
        let cols = f64::from(self.n_cols.max(1));
        (self.plot_size * 5.0 * cols, self.plot_size * 40.0 / cols)
    }
}

/// A piece of text and where its lower-left corner goes.
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub text: String,
    pub anchor: Coord,
}

/// Route polylines for one day of a month.
#[derive(Debug, Clone, PartialEq)]
pub struct DayRoutes {
    pub date: NaiveDate,
    pub routes: Vec<LineString>,
}

/// A single day drawn on its own.
#[derive(Debug, Clone, PartialEq)]
pub struct DayLayout {
    pub date: NaiveDate,
    pub routes: Vec<LineString>,
    pub label: Label,
}

/// Everything drawn for one month.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthLayout {
    pub year: i32,
    pub month: u32,
    /// Offset subtracted from every grid position in this month.
    pub offset: Coord,
    /// Days with activities, in date order.
    pub days: Vec<DayRoutes>,
    /// One day-of-month label per date.
    pub labels: Vec<Label>,
    /// One underline per week row.
    pub separators: Vec<Line>,
    /// Week row of the last date, before `offset` is applied.
    pub final_week: i32,
}

/// Everything drawn for one year.
#[derive(Debug, Clone, PartialEq)]
pub struct YearLayout {
    pub year: i32,
    pub months: Vec<MonthLayout>,
    pub title: Option<Label>,
    pub figure_size: (f64, f64),
}

impl YearLayout {
    pub fn route_count(&self) -> usize {
        self.months
            .iter()
            .flat_map(|m| &m.days)
            .map(|d| d.routes.len())
            .sum()
    }
}

/// Lays out days, months and years from an [`ActivityIndex`].
#[derive(Debug, Clone)]
pub struct CalendarLayout<'a> {
    index: &'a ActivityIndex,
    config: LayoutConfig,
}

impl<'a> CalendarLayout<'a> {
    pub fn new(index: &'a ActivityIndex, config: LayoutConfig) -> Self {
        Self { index, config }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// One day at its own grid cell, labelled below-left of its routes.
    pub fn day(&self, year: i32, month: u32, day: u32) -> Result<DayLayout> {
        let entry = self.index.day(year, month, day)?;
        let origin = Coord { x: 0.0, y: 0.0 };
        let routes: Vec<LineString> = entry
            .render_with(origin, &self.config.margins)
            .collect();
        let anchor = crate::geo_utils::min_corner(&routes)
            .unwrap_or_else(|| entry.default_offset().to_coord());

        Ok(DayLayout {
            date: entry.date(),
            routes,
            label: Label {
                text: full_label(entry.date()),
                anchor,
            },
        })
    }

    /// One month, with every grid position shifted by `-extra_offset`.
    pub fn month(&self, year: i32, month: u32, extra_offset: Coord) -> Result<MonthLayout> {
        let dates: Vec<NaiveDate> = month_dates(year, month)
            .ok_or(CalendarError::InvalidDate { year, month, day: 1 })?
            .collect();

        let mut labels = Vec::with_capacity(dates.len());
        let mut separators = Vec::new();
        let mut cur_week = 1;
        let mut week_days: Vec<i32> = Vec::with_capacity(7);

        for &date in &dates {
            let pos = grid_position(date);
            if pos.week != cur_week {
                if let Some(line) = week_separator(&week_days, cur_week, extra_offset) {
                    separators.push(line);
                }
                cur_week = pos.week;
                week_days.clear();
            }

            labels.push(Label {
                text: day_label(date),
                anchor: Coord {
                    x: f64::from(pos.day_of_week) - extra_offset.x,
                    y: f64::from(pos.week) + LABEL_LIFT - extra_offset.y,
                },
            });
            week_days.push(pos.day_of_week);
        }

        if let Some(line) = week_separator(&week_days, cur_week, extra_offset) {
            separators.push(line);
        }

        let active: Vec<&Day> = dates
            .iter()
            .filter_map(|d| self.index.day_for(*d))
            .collect();
        let days = self.render_days(&active, extra_offset);

        debug!(
            "Laid out {}-{:02}: {} active days, {} week rows, final week {}",
            year,
            month,
            days.len(),
            separators.len(),
            cur_week
        );

        Ok(MonthLayout {
            year,
            month,
            offset: extra_offset,
            days,
            labels,
            separators,
            final_week: cur_week,
        })
    }

    #[cfg(not(feature = "parallel"))]
    fn render_days(&self, active: &[&Day], extra_offset: Coord) -> Vec<DayRoutes> {
        active
            .iter()
            .map(|day| self.render_day(day, extra_offset))
            .collect()
    }

    /// Days are independent, so each one is normalized on its own thread.
    #[cfg(feature = "parallel")]
    fn render_days(&self, active: &[&Day], extra_offset: Coord) -> Vec<DayRoutes> {
        use rayon::prelude::*;

        active
            .par_iter()
            .map(|day| self.render_day(day, extra_offset))
            .collect()
    }

    fn render_day(&self, day: &Day, extra_offset: Coord) -> DayRoutes {
        DayRoutes {
            date: day.date(),
            routes: day.render_with(extra_offset, &self.config.margins).collect(),
        }
    }

    /// The whole year, months split evenly over `n_cols` columns.
    ///
    /// Column `c` is shifted left by `(7 + col_gap) * c`. Its vertical offset
    /// starts one row below the last week of the previous column's final
    /// month, so each column begins near the top of the mosaic.
    pub fn year(&self, year: i32) -> Result<YearLayout> {
        self.config.validate()?;

        let n_cols = self.config.n_cols;
        let n_rows = self.config.months_per_column();
        let mut months = Vec::with_capacity(MONTHS as usize);
        let mut last_week = 0;

        for col in 0..n_cols {
            let y_offset = last_week + 1;
            for row in 0..n_rows {
                let month = n_rows * col + row + 1;
                let extra_offset = Coord {
                    x: -(7.0 + self.config.col_gap) * f64::from(col),
                    y: f64::from(y_offset) + self.config.month_gap * f64::from(row),
                };
                let layout = self.month(year, month, extra_offset)?;
                last_week = layout.final_week;
                months.push(layout);
            }
        }

        let title_text = self
            .config
            .label
            .clone()
            .unwrap_or_else(|| year.to_string());
        let title = (!title_text.is_empty()).then(|| Label {
            text: title_text,
            anchor: Coord { x: 0.0, y: -1.0 },
        });

        let layout = YearLayout {
            year,
            months,
            title,
            figure_size: self.config.figure_size(),
        };
        info!(
            "Laid out {} in {} columns with {} routes",
            year,
            n_cols,
            layout.route_count()
        );
        Ok(layout)
    }
}

/// Underline for a finished week row, or `None` if the row had no dates.
fn week_separator(week_days: &[i32], week: i32, extra_offset: Coord) -> Option<Line> {
    let min = *week_days.iter().min()?;
    let max = *week_days.iter().max()?;
    let y = f64::from(week) - extra_offset.y;
    Some(Line::new(
        Coord { x: f64::from(min) - extra_offset.x, y },
        Coord { x: f64::from(max) + SEPARATOR_WIDTH - extra_offset.x, y },
    ))
}

/// Filter, index and lay out one year of activities for `sport`.
///
/// # Example
///
/// ```rust
/// use chrono::NaiveDate;
/// use route_calendar::{render_calendar, ActivityRecord, LayoutConfig, RawRoute};
///
/// let start = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap().and_hms_opt(7, 30, 0).unwrap();
/// let mut run = ActivityRecord::new(
///     start,
///     RawRoute::new(vec![0.0, 10.0, 10.0], vec![0.0, 0.0, 5.0]).unwrap(),
/// );
/// run.sport = Some("running".to_string());
///
/// let layout = render_calendar(&[run], 2024, "running", &LayoutConfig::default()).unwrap();
/// assert_eq!(layout.months.len(), 12);
/// assert_eq!(layout.route_count(), 1);
/// assert_eq!(layout.title.unwrap().text, "2024");
/// ```
pub fn render_calendar(
    records: &[ActivityRecord],
    year: i32,
    sport: &str,
    config: &LayoutConfig,
) -> Result<YearLayout> {
    config.validate()?;
    let filter = ActivityFilter::for_year(sport, year);
    let index = ActivityIndex::build(records, &filter, IndexConfig::default())?;
    CalendarLayout::new(&index, config.clone()).year(year)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::{ActivityLog, RawRoute};
    use crate::geo_utils::compute_bounds;
    use std::collections::HashSet;

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    fn zero() -> Coord {
        Coord { x: 0.0, y: 0.0 }
    }

    fn run(y: i32, m: u32, d: u32, h: u32, w: f64, ht: f64) -> ActivityRecord {
        let start = NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(h, 0, 0).unwrap();
        ActivityRecord {
            distance: 1000.0 * f64::from(h),
            sport: Some("running".into()),
            ..ActivityRecord::new(
                start,
                RawRoute::new(vec![0.0, w, w, 0.0], vec![0.0, 0.0, ht, ht]).unwrap(),
            )
        }
    }

    fn sample_index() -> ActivityIndex {
        let mut index = ActivityIndex::default();
        index.add(&run(2024, 3, 15, 7, 10.0, 5.0)).unwrap();
        index.add(&run(2024, 3, 15, 18, 2.0, 2.0)).unwrap();
        index.add(&run(2024, 3, 20, 7, 3.0, 3.0)).unwrap();
        index.add(&run(2024, 4, 2, 7, 3.0, 3.0)).unwrap();
        index
    }

    #[test]
    fn test_config_validation() {
        for n_cols in [1, 2, 3, 4, 6, 12] {
            let config = LayoutConfig { n_cols, ..LayoutConfig::default() };
            assert!(config.validate().is_ok());
        }
        for n_cols in [0, 5, 7, 8, 13] {
            let config = LayoutConfig { n_cols, ..LayoutConfig::default() };
            assert!(matches!(
                config.validate(),
                Err(CalendarError::InvalidColumnCount(n)) if n == n_cols
            ));
        }
    }

    #[test]
    fn test_figure_size() {
        let config = LayoutConfig::default();
        assert_eq!(config.figure_size(), (20.0, 10.0));
        let config = LayoutConfig { n_cols: 2, plot_size: 2.0, ..LayoutConfig::default() };
        assert_eq!(config.figure_size(), (20.0, 40.0));
    }

    #[test]
    fn test_day_layout() {
        let index = sample_index();
        let layout = CalendarLayout::new(&index, LayoutConfig::default());
        let day = layout.day(2024, 3, 15).unwrap();

        assert_eq!(day.routes.len(), 2);
        assert_eq!(day.label.text, "Mar 15");
        assert!(approx_eq(day.label.anchor.x, 5.1, 1e-9));
        assert!(approx_eq(day.label.anchor.y, -10.7, 1e-9));
    }

    #[test]
    fn test_day_layout_missing_date() {
        let index = sample_index();
        let layout = CalendarLayout::new(&index, LayoutConfig::default());
        assert!(matches!(
            layout.day(2024, 3, 16),
            Err(CalendarError::NoDataForDate { .. })
        ));
    }

    #[test]
    fn test_month_rows_and_separators() {
        let index = sample_index();
        let layout = CalendarLayout::new(&index, LayoutConfig::default());
        let march = layout.month(2024, 3, zero()).unwrap();

        // Rows: 1-2, 3-9, 10-16, 17-23, 24-30, 31
        assert_eq!(march.separators.len(), 6);
        assert_eq!(march.final_week, -14);
        assert_eq!(march.labels.len(), 31);

        let first = march.separators[0];
        assert_eq!(first.start, Coord { x: 5.0, y: -9.0 });
        assert!(approx_eq(first.end.x, 6.95, 1e-9));

        let full = march.separators[1];
        assert_eq!(full.start, Coord { x: 0.0, y: -10.0 });
        assert!(approx_eq(full.end.x, 6.95, 1e-9));

        let last = march.separators[5];
        assert_eq!(last.start, Coord { x: 0.0, y: -14.0 });
        assert!(approx_eq(last.end.x, 0.95, 1e-9));
    }

    fn week_rows(year: i32, month: u32) -> Vec<i32> {
        month_dates(year, month)
            .unwrap()
            .map(|d| grid_position(d).week)
            .collect()
    }

    /// Number of runs of equal consecutive rows.
    fn row_runs(rows: &[i32]) -> usize {
        1 + rows.windows(2).filter(|w| w[0] != w[1]).count()
    }

    #[test]
    fn test_separator_count_matches_week_rows() {
        let index = ActivityIndex::default();
        let layout = CalendarLayout::new(&index, LayoutConfig::default());
        for year in [2021, 2024] {
            for month in 1..=12 {
                let m = layout.month(year, month, zero()).unwrap();
                let rows = week_rows(year, month);
                assert_eq!(m.separators.len(), row_runs(&rows), "{}-{}", year, month);

                let distinct: HashSet<i32> = rows.iter().copied().collect();
                if (year, month) != (2021, 1) {
                    assert_eq!(m.separators.len(), distinct.len(), "{}-{}", year, month);
                }
            }
        }
    }

    #[test]
    fn test_year_edge_months() {
        let index = ActivityIndex::default();
        let layout = CalendarLayout::new(&index, LayoutConfig::default());

        // 2024 starts on a Monday, so the pinned 1st agrees with its ISO row.
        let jan = layout.month(2024, 1, zero()).unwrap();
        assert_eq!(jan.separators.len(), 5);
        assert_eq!(jan.final_week, -5);

        // 30 and 31 December 2024 are ISO 2025-W01 and stay on row -53.
        let dec = layout.month(2024, 12, zero()).unwrap();
        assert_eq!(dec.separators.len(), 5);
        assert_eq!(dec.final_week, -53);

        // In 2021 the pinned 1st and the ISO 2020-W53 weekend each get their
        // own row before the 4th returns to row -1: 8 underlines over 7 rows.
        let jan = layout.month(2021, 1, zero()).unwrap();
        let rows = week_rows(2021, 1);
        assert_eq!(rows[0], -1);
        assert_eq!(rows[1], -(53 + 52 * 2020));
        assert_eq!(rows[2], -(54 + 52 * 2020));
        assert_eq!(rows[3], -1);
        assert_eq!(jan.separators.len(), 8);
        assert_eq!(jan.separators[0].start, Coord { x: 1.0, y: -1.0 });
        assert_eq!(jan.final_week, -5);

        let dec = layout.month(2021, 12, zero()).unwrap();
        assert_eq!(dec.separators.len(), 5);
        assert_eq!(dec.final_week, -52);
    }

    #[test]
    fn test_year_zero_month_layout() {
        let json = r#"{"activities": [{
            "start_time": "0000-03-15T07:30:00",
            "route": {"lat": [0, 4, 4], "long": [0, 0, 2]}
        }]}"#;
        let log = ActivityLog::from_json(json).unwrap();
        let index = ActivityIndex::from_log(&log, IndexConfig::default()).unwrap();
        let layout = CalendarLayout::new(&index, LayoutConfig::default());

        let march = layout.month(0, 3, zero()).unwrap();
        assert_eq!(march.days.len(), 1);
        assert_eq!(march.labels.len(), 31);

        let january = layout.month(0, 1, zero()).unwrap();
        assert_eq!(january.labels.len(), 31);

        let day = layout.day(0, 3, 15).unwrap();
        assert_eq!(day.routes.len(), 1);
        assert!(layout.year(0).is_ok());
    }

    #[test]
    fn test_month_labels() {
        let index = sample_index();
        let layout = CalendarLayout::new(&index, LayoutConfig::default());
        let offset = Coord { x: -7.5, y: 2.0 };
        let march = layout.month(2024, 3, offset).unwrap();

        assert_eq!(march.labels[0].text, "Mar 1");
        assert!(approx_eq(march.labels[0].anchor.x, 12.5, 1e-9));
        assert!(approx_eq(march.labels[0].anchor.y, -10.95, 1e-9));
        assert_eq!(march.labels[14].text, "15");
    }

    #[test]
    fn test_month_days_follow_offset() {
        let index = sample_index();
        let layout = CalendarLayout::new(&index, LayoutConfig::default());
        let offset = Coord { x: -7.5, y: 2.0 };
        let march = layout.month(2024, 3, offset).unwrap();

        let dates: Vec<u32> = march
            .days
            .iter()
            .map(|d| chrono::Datelike::day(&d.date))
            .collect();
        assert_eq!(dates, vec![15, 20]);

        // 2024-03-15 sits in cell (5, -11), shifted by (+7.5, -2).
        for line in &march.days[0].routes {
            let b = compute_bounds(&line.0).unwrap();
            assert!(b.min().x >= 12.6 - 1e-9 && b.max().x <= 13.4 + 1e-9);
            assert!(b.min().y >= -12.9 - 1e-9 && b.max().y <= -12.1 + 1e-9);
        }
    }

    #[test]
    fn test_invalid_month() {
        let index = ActivityIndex::default();
        let layout = CalendarLayout::new(&index, LayoutConfig::default());
        assert!(matches!(
            layout.month(2024, 13, zero()),
            Err(CalendarError::InvalidDate { month: 13, .. })
        ));
    }

    #[test]
    fn test_year_columns() {
        let index = sample_index();
        let layout = CalendarLayout::new(&index, LayoutConfig::default());
        let year = layout.year(2024).unwrap();

        assert_eq!(year.months.len(), 12);
        let jan = &year.months[0];
        let mar = &year.months[2];
        let apr = &year.months[3];

        assert_eq!(jan.offset, Coord { x: 0.0, y: 1.0 });
        assert_eq!(mar.offset.x, jan.offset.x);
        assert!(approx_eq(apr.offset.x, -7.5, 1e-9));
        // April's column starts below March's last row.
        assert_eq!(apr.offset.y, f64::from(mar.final_week + 1));
        assert_eq!(year.route_count(), 4);
    }

    #[test]
    fn test_year_month_gap() {
        let index = ActivityIndex::default();
        let config = LayoutConfig { n_cols: 3, month_gap: 1.5, ..LayoutConfig::default() };
        let layout = CalendarLayout::new(&index, config);
        let year = layout.year(2024).unwrap();

        let col0: Vec<f64> = year.months[..4].iter().map(|m| m.offset.y).collect();
        assert_eq!(col0, vec![1.0, 2.5, 4.0, 5.5]);
        assert!(approx_eq(year.months[4].offset.x, -7.5, 1e-9));
        assert!(approx_eq(year.months[8].offset.x, -15.0, 1e-9));
    }

    #[test]
    fn test_year_rejects_bad_columns() {
        let index = ActivityIndex::default();
        let config = LayoutConfig { n_cols: 5, ..LayoutConfig::default() };
        let layout = CalendarLayout::new(&index, config);
        assert!(matches!(layout.year(2024), Err(CalendarError::InvalidColumnCount(5))));
    }

    #[test]
    fn test_title_label() {
        let index = ActivityIndex::default();
        let config = LayoutConfig {
            label: Some("My runs".into()),
            ..LayoutConfig::default()
        };
        let year = CalendarLayout::new(&index, config).year(2024).unwrap();
        let title = year.title.unwrap();
        assert_eq!(title.text, "My runs");
        assert_eq!(title.anchor, Coord { x: 0.0, y: -1.0 });

        let config = LayoutConfig { label: Some(String::new()), ..LayoutConfig::default() };
        let year = CalendarLayout::new(&index, config).year(2024).unwrap();
        assert!(year.title.is_none());
    }

    #[test]
    fn test_render_calendar_filters_other_years() {
        let records = vec![
            run(2023, 6, 1, 7, 3.0, 3.0),
            run(2024, 6, 1, 7, 3.0, 3.0),
            run(2024, 6, 2, 8, 3.0, 1.0),
        ];
        let config = LayoutConfig::default();
        let layout = render_calendar(&records, 2024, "running", &config).unwrap();
        assert_eq!(layout.route_count(), 2);
        assert_eq!(layout.months[5].days.len(), 2);
    }
}
