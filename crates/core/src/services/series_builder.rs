use chrono::NaiveDate;
use tracing::warn;

use crate::errors::CoreError;
use crate::models::rates::RawRatesByDate;
use crate::models::series::{HistoricalSeries, SeriesPoint};

/// Turns a raw historical response into a chart-ready, date-ordered series.
///
/// Date keys are `yyyy-MM-dd`, so lexicographic order is chronological order.
/// A date that cannot contribute a point (missing target rate, malformed key,
/// non-positive value) is skipped rather than failing the whole build; the
/// remaining points are indexed densely from 0.
pub struct SeriesBuilder;

impl SeriesBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Build the `from_code → to_code` series, reading `to_code` out of every date.
    pub fn build(&self, raw: &RawRatesByDate, from_code: &str, to_code: &str) -> HistoricalSeries {
        let target = to_code.to_uppercase();

        let mut dates: Vec<&String> = raw.keys().collect();
        dates.sort();

        let points = dates
            .into_iter()
            .filter_map(|date| match Self::extract(raw, date, &target) {
                Ok(value) => Some((date, value)),
                Err(e) => {
                    warn!(error = %e, "skipping series point");
                    None
                }
            })
            .enumerate()
            .map(|(index, (date, value))| SeriesPoint {
                index,
                label: date.clone(),
                value,
            })
            .collect();

        HistoricalSeries {
            from_code: from_code.to_uppercase(),
            to_code: target,
            points,
        }
    }

    /// The target rate for one date, or `MissingTargetRate` when it cannot be used.
    fn extract(raw: &RawRatesByDate, date: &str, target: &str) -> Result<f64, CoreError> {
        let missing = || CoreError::MissingTargetRate {
            date: date.to_string(),
            currency: target.to_string(),
        };

        // Only canonical zero-padded dates sort chronologically.
        let parsed = NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| missing())?;
        if parsed.format("%Y-%m-%d").to_string() != date {
            return Err(missing());
        }

        let value = raw
            .get(date)
            .and_then(|rates| {
                rates
                    .get(target)
                    .or_else(|| {
                        rates
                            .iter()
                            .find(|(code, _)| code.eq_ignore_ascii_case(target))
                            .map(|(_, v)| v)
                    })
                    .copied()
            })
            .ok_or_else(missing)?;

        if !value.is_finite() || value <= 0.0 {
            return Err(missing());
        }
        Ok(value)
    }
}

impl Default for SeriesBuilder {
    fn default() -> Self {
        Self::new()
    }
}
