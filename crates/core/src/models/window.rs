use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::errors::CoreError;

/// Day count used when the trend view first opens, before any window is picked.
pub const DEFAULT_WINDOW_DAYS: u32 = 7;

/// A user-facing coarse time-range selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeWindow {
    /// "1D": spans 2 days so there are always at least two points to draw a line.
    OneDay,
    /// "5D"
    FiveDays,
    /// "1M"
    OneMonth,
    /// "1Y"
    OneYear,
    /// "5Y"
    FiveYears,
}

impl TimeWindow {
    pub const ALL: [TimeWindow; 5] = [
        TimeWindow::OneDay,
        TimeWindow::FiveDays,
        TimeWindow::OneMonth,
        TimeWindow::OneYear,
        TimeWindow::FiveYears,
    ];

    /// Number of calendar days this window reaches back from today.
    pub fn day_count(self) -> u32 {
        match self {
            TimeWindow::OneDay => 2,
            TimeWindow::FiveDays => 5,
            TimeWindow::OneMonth => 30,
            TimeWindow::OneYear => 365,
            TimeWindow::FiveYears => 1825,
        }
    }

    /// The short token shown on the selector, e.g. `"1M"`.
    pub fn token(self) -> &'static str {
        match self {
            TimeWindow::OneDay => "1D",
            TimeWindow::FiveDays => "5D",
            TimeWindow::OneMonth => "1M",
            TimeWindow::OneYear => "1Y",
            TimeWindow::FiveYears => "5Y",
        }
    }
}

impl std::fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for TimeWindow {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        TimeWindow::ALL
            .into_iter()
            .find(|w| w.token() == upper)
            .ok_or_else(|| {
                CoreError::Config(format!(
                    "unknown time window '{s}' (expected one of 1D, 5D, 1M, 1Y, 5Y)"
                ))
            })
    }
}

/// An inclusive calendar-date range `[start, end]` with `start = end - days`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Range reaching `days` back from `end`.
    /// Saturates at `NaiveDate::MIN` rather than failing.
    pub fn ending_on(end: NaiveDate, days: u32) -> Self {
        let start = end
            .checked_sub_days(Days::new(u64::from(days)))
            .unwrap_or(NaiveDate::MIN);
        Self { start, end }
    }

    /// Range for a window token ending on `end`.
    pub fn for_window(window: TimeWindow, end: NaiveDate) -> Self {
        Self::ending_on(end, window.day_count())
    }

    /// Number of days between `start` and `end`.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days()
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}..{}",
            self.start.format("%Y-%m-%d"),
            self.end.format("%Y-%m-%d")
        )
    }
}
