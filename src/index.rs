//! Activity index: routes bucketed by year, month and day.
//!
//! Days own their routes. Month and year buckets only hold keys, listed in the
//! order each day or month was first seen.

use std::collections::{BTreeMap, HashSet};

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::activity::{ActivityFilter, ActivityLog, ActivityRecord};
use crate::day::Day;
use crate::route::Route;
use crate::{CalendarError, Result};

/// (year, month, day)
pub type DayKey = (i32, u32, u32);

/// (year, month)
pub type MonthKey = (i32, u32);

/// Configuration for index building.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Reject a record whose start time and distance match one already added.
    /// Default: true
    pub reject_duplicates: bool,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            reject_duplicates: true,
        }
    }
}

/// Routes bucketed by date.
#[derive(Debug, Clone, Default)]
pub struct ActivityIndex {
    config: IndexConfig,
    days: BTreeMap<DayKey, Day>,
    months: BTreeMap<MonthKey, Vec<DayKey>>,
    years: BTreeMap<i32, Vec<MonthKey>>,
    seen: HashSet<(NaiveDateTime, u64)>,
}

fn day_key(date: NaiveDate) -> DayKey {
    (date.year(), date.month(), date.day())
}

impl ActivityIndex {
    pub fn new(config: IndexConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Index every record that passes `filter`.
    ///
    /// Duplicates are skipped with a warning rather than failing the build.
    pub fn build<'a, I>(
        records: I,
        filter: &ActivityFilter,
        config: IndexConfig,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = &'a ActivityRecord>,
    {
        let mut index = Self::new(config);
        let mut skipped = 0usize;

        for record in records {
            if !filter.matches(record) {
                debug!("Filtered out activity starting {}", record.start_time);
                skipped += 1;
                continue;
            }
            match index.add(record) {
                Ok(_) => {}
                Err(CalendarError::DuplicateActivity { start_time }) => {
                    warn!("Skipping duplicate activity starting {}", start_time);
                }
                Err(e) => return Err(e),
            }
        }

        info!(
            "Indexed {} routes over {} days ({} records filtered out)",
            index.route_count(),
            index.days.len(),
            skipped
        );
        Ok(index)
    }

    /// Index every record of a parsed activity log, unfiltered.
    pub fn from_log(log: &ActivityLog, config: IndexConfig) -> Result<Self> {
        let filter = ActivityFilter {
            sport: None,
            start: None,
            end: None,
        };
        Self::build(&log.activities, &filter, config)
    }

    /// Add one record, creating its day, month and year buckets as needed.
    pub fn add(&mut self, record: &ActivityRecord) -> Result<DayKey> {
        let route = Route::from_record(record)?;

        if self.config.reject_duplicates
            && !self.seen.insert((record.start_time, record.distance.to_bits()))
        {
            return Err(CalendarError::DuplicateActivity {
                start_time: record.start_time,
            });
        }

        let key = day_key(route.date());
        let month_key = (key.0, key.1);

        match self.days.get_mut(&key) {
            Some(day) => day.add_route(route),
            None => {
                self.days.insert(key, Day::new(route));
                let month = self.months.entry(month_key).or_default();
                if month.is_empty() {
                    self.years.entry(key.0).or_default().push(month_key);
                }
                month.push(key);
            }
        }

        Ok(key)
    }

    /// Look up a day, failing if nothing was recorded on it.
    pub fn day(&self, year: i32, month: u32, day: u32) -> Result<&Day> {
        self.days
            .get(&(year, month, day))
            .ok_or(CalendarError::NoDataForDate { year, month, day })
    }

    pub fn day_for(&self, date: NaiveDate) -> Option<&Day> {
        self.days.get(&day_key(date))
    }

    pub fn days(&self) -> &BTreeMap<DayKey, Day> {
        &self.days
    }

    pub fn months(&self) -> &BTreeMap<MonthKey, Vec<DayKey>> {
        &self.months
    }

    pub fn years(&self) -> &BTreeMap<i32, Vec<MonthKey>> {
        &self.years
    }

    pub fn route_count(&self) -> usize {
        self.days.values().map(Day::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}
