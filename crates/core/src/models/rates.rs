use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;

use crate::errors::CoreError;

/// Raw historical rates as returned by a provider: date (`yyyy-MM-dd`) → (currency code → rate).
///
/// Key order is whatever the provider decoded; `SeriesBuilder` is responsible for ordering.
pub type RawRatesByDate = HashMap<String, HashMap<String, f64>>;

/// A complete set of current exchange rates relative to one base currency.
///
/// Every rate means "units of that currency per 1 unit of base".
/// Built only through [`RateSnapshot::new`], which enforces:
/// - at least one rate is present
/// - every rate is finite and strictly positive
///
/// Immutable once built; a newer fetch replaces it wholesale.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateSnapshot {
    base: String,
    rates: HashMap<String, f64>,
    fetched_at: DateTime<Utc>,
}

impl RateSnapshot {
    /// Validate and build a snapshot. Codes are uppercased.
    pub fn new(base: impl Into<String>, rates: HashMap<String, f64>) -> Result<Self, CoreError> {
        let base = base.into().to_uppercase();

        if rates.is_empty() {
            return Err(CoreError::SnapshotParseError(format!(
                "no rates returned for base {base}"
            )));
        }

        let mut normalized = HashMap::with_capacity(rates.len());
        for (code, rate) in rates {
            if !rate.is_finite() || rate <= 0.0 {
                return Err(CoreError::SnapshotParseError(format!(
                    "rate for {code} must be a positive number, got {rate}"
                )));
            }
            normalized.insert(code.to_uppercase(), rate);
        }

        Ok(Self {
            base,
            rates: normalized,
            fetched_at: Utc::now(),
        })
    }

    /// The base currency every rate is relative to.
    pub fn base(&self) -> &str {
        &self.base
    }

    /// When this snapshot was built.
    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    /// Rate for a currency code (case-insensitive).
    pub fn rate(&self, code: &str) -> Option<f64> {
        self.rates.get(&code.to_uppercase()).copied()
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// All currency codes in this snapshot, sorted alphabetically (for currency pickers).
    pub fn currencies(&self) -> Vec<String> {
        let mut codes: Vec<String> = self.rates.keys().cloned().collect();
        codes.sort();
        codes
    }
}
