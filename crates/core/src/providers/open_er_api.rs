use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

use super::traits::{RateCapability, RateProvider};
use crate::errors::CoreError;
use crate::models::rates::{RateSnapshot, RawRatesByDate};
use crate::models::settings::DEFAULT_OPEN_ER_API_URL;
use crate::models::window::DateRange;

const PROVIDER: &str = "ExchangeRate-API";

/// open.er-api.com provider for current exchange rates.
///
/// - **Free**: No API key; data refreshes once a day.
/// - **Coverage**: ~160 currencies in one response.
/// - **Endpoints**: `/latest/{base}`
///
/// The open endpoint has no historical data, so this provider only serves snapshots.
pub struct OpenErApiProvider {
    client: Client,
    base_url: String,
}

impl OpenErApiProvider {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_OPEN_ER_API_URL, Duration::from_secs(30))
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

impl Default for OpenErApiProvider {
    fn default() -> Self {
        Self::new()
    }
}

// ── open.er-api response types ──────────────────────────────────────

#[derive(Deserialize)]
struct LatestResponse {
    result: String,
    #[serde(default)]
    base_code: Option<String>,
    #[serde(default, rename = "error-type")]
    error_type: Option<String>,
    #[serde(default)]
    rates: Option<HashMap<String, f64>>,
}

#[async_trait]
impl RateProvider for OpenErApiProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    fn capabilities(&self) -> Vec<RateCapability> {
        vec![RateCapability::Snapshot]
    }

    async fn fetch_current_rates(&self, base: &str) -> Result<RateSnapshot, CoreError> {
        let base = base.to_uppercase();
        let url = format!("{}/latest/{base}", self.base_url);
        debug!(provider = PROVIDER, %base, "fetching current rates");

        let resp = self.client.get(&url).send().await?.error_for_status()?;
        let body: LatestResponse = resp.json().await.map_err(|e| {
            CoreError::SnapshotParseError(format!("{PROVIDER}: invalid response for {base}: {e}"))
        })?;

        if body.result != "success" {
            return Err(CoreError::Api {
                provider: PROVIDER.into(),
                message: format!(
                    "request for {base} failed: {}",
                    body.error_type.as_deref().unwrap_or(&body.result)
                ),
            });
        }

        let rates = body.rates.ok_or_else(|| {
            CoreError::SnapshotParseError(format!("{PROVIDER}: response has no rates"))
        })?;
        RateSnapshot::new(body.base_code.unwrap_or(base), rates)
    }

    async fn fetch_history(
        &self,
        _from: &str,
        _to: &str,
        _range: DateRange,
    ) -> Result<RawRatesByDate, CoreError> {
        Err(CoreError::NoProvider(format!(
            "{PROVIDER} does not serve {}",
            RateCapability::History
        )))
    }
}
