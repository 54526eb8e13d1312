use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

use super::traits::{RateCapability, RateProvider};
use crate::errors::CoreError;
use crate::models::rates::{RateSnapshot, RawRatesByDate};
use crate::models::settings::DEFAULT_FRANKFURTER_URL;
use crate::models::window::DateRange;

const PROVIDER: &str = "Frankfurter";

/// Frankfurter API provider for fiat currency exchange rates.
///
/// - **Free**: No API key, no rate limits, open-source.
/// - **Source**: European Central Bank (ECB) data, published on working days only.
/// - **Endpoints**: `/latest`, `/{start}..{end}`
///
/// Weekends and holidays are simply absent from time series responses.
pub struct FrankfurterProvider {
    client: Client,
    base_url: String,
}

impl FrankfurterProvider {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_FRANKFURTER_URL, Duration::from_secs(30))
    }

    pub fn with_base_url(base_url: &str, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_else(|_| Client::new()),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

impl Default for FrankfurterProvider {
    fn default() -> Self {
        Self::new()
    }
}

// ── Frankfurter API response types ──────────────────────────────────

#[derive(Deserialize)]
struct LatestResponse {
    base: String,
    rates: HashMap<String, f64>,
}

#[derive(Deserialize)]
struct TimeSeriesResponse {
    rates: HashMap<String, HashMap<String, f64>>,
}

/// Every calendar day in `range` mapped to `{code: 1.0}`.
fn flat_series(code: &str, range: DateRange) -> RawRatesByDate {
    let mut rates = RawRatesByDate::new();
    let mut d: NaiveDate = range.start;
    while d <= range.end {
        rates.insert(
            d.format("%Y-%m-%d").to_string(),
            HashMap::from([(code.to_string(), 1.0)]),
        );
        match d.succ_opt() {
            Some(next) => d = next,
            None => break,
        }
    }
    rates
}

#[async_trait]
impl RateProvider for FrankfurterProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    fn capabilities(&self) -> Vec<RateCapability> {
        vec![RateCapability::Snapshot, RateCapability::History]
    }

    async fn fetch_current_rates(&self, base: &str) -> Result<RateSnapshot, CoreError> {
        let base = base.to_uppercase();
        let url = format!("{}/latest?from={base}", self.base_url);
        debug!(provider = PROVIDER, %base, "fetching current rates");

        let resp = self.client.get(&url).send().await?.error_for_status()?;
        let body: LatestResponse = resp.json().await.map_err(|e| {
            CoreError::SnapshotParseError(format!("{PROVIDER}: invalid response for {base}: {e}"))
        })?;

        // Frankfurter omits the base itself from `rates`.
        let mut rates = body.rates;
        rates.insert(body.base.to_uppercase(), 1.0);
        RateSnapshot::new(body.base, rates)
    }

    async fn fetch_history(
        &self,
        from: &str,
        to: &str,
        range: DateRange,
    ) -> Result<RawRatesByDate, CoreError> {
        let from = from.to_uppercase();
        let to = to.to_uppercase();

        // Same currency → rate is 1.0 every day; the API rejects from == to.
        if from == to {
            return Ok(flat_series(&to, range));
        }

        let url = format!("{}/{range}?from={from}&to={to}", self.base_url);
        debug!(provider = PROVIDER, %from, %to, %range, "fetching time series");

        let resp = self.client.get(&url).send().await?.error_for_status()?;
        let body: TimeSeriesResponse = resp.json().await.map_err(|e| CoreError::Api {
            provider: PROVIDER.into(),
            message: format!("Failed to parse time series for {from}/{to}: {e}"),
        })?;

        Ok(body.rates)
    }
}
