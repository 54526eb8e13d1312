use serde::{Deserialize, Serialize};

/// One (position, date, rate) sample of a historical trend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    /// Dense 0-based position in the series (the chart's x value).
    pub index: usize,
    /// Date label in `yyyy-MM-dd` form.
    pub label: String,
    pub value: f64,
}

/// A date-ordered rate history for one currency pair.
///
/// The core computes all the numbers; the frontend only renders.
/// Points are ordered by `label` ascending with `index` running 0, 1, 2, ...
/// A series is never edited; a newer fetch produces a new one.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HistoricalSeries {
    pub from_code: String,
    pub to_code: String,
    pub points: Vec<SeriesPoint>,
}

impl HistoricalSeries {
    /// Dataset title, e.g. `"USD → EUR"`.
    pub fn title(&self) -> String {
        format!("{} → {}", self.from_code, self.to_code)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&SeriesPoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&SeriesPoint> {
        self.points.last()
    }

    /// X-axis label for a chart position. Out-of-range positions get an empty label.
    pub fn label_at(&self, index: usize) -> &str {
        self.points
            .get(index)
            .map(|p| p.label.as_str())
            .unwrap_or("")
    }

    /// Marker text for a chart position, rounded to 2 decimals.
    pub fn value_label(&self, index: usize) -> Option<String> {
        self.points.get(index).map(|p| format!("{:.2}", p.value))
    }

    /// Lowest value in the series.
    pub fn min_value(&self) -> Option<f64> {
        self.points.iter().map(|p| p.value).reduce(f64::min)
    }

    /// Highest value in the series.
    pub fn max_value(&self) -> Option<f64> {
        self.points.iter().map(|p| p.value).reduce(f64::max)
    }

    /// Relative change from the first to the last point, in percent.
    pub fn change_percent(&self) -> Option<f64> {
        let first = self.first()?.value;
        let last = self.last()?.value;
        if self.len() < 2 || first == 0.0 {
            return None;
        }
        Some((last - first) / first * 100.0)
    }
}
