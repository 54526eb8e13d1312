use async_trait::async_trait;
use std::time::Duration;
use tracing::warn;

use super::frankfurter::FrankfurterProvider;
use super::open_er_api::OpenErApiProvider;
use super::traits::{RateCapability, RateProvider};
use crate::errors::CoreError;
use crate::models::rates::{RateSnapshot, RawRatesByDate};
use crate::models::settings::Settings;
use crate::models::window::DateRange;

/// Registry of all available rate providers.
///
/// Routes each request to the providers advertising the matching
/// `RateCapability`, in registration order. If the first one fails
/// (API down, bad response), the next one is tried.
///
/// The registry is itself a `RateProvider`, so sessions and window
/// controllers never need to know how many sources sit behind it.
pub struct RateProviderRegistry {
    providers: Vec<Box<dyn RateProvider>>,
}

impl RateProviderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    /// Create a registry with the default providers, using endpoints from `settings`.
    pub fn new_with_defaults(settings: &Settings) -> Self {
        let timeout = Duration::from_secs(settings.request_timeout_secs);
        let mut registry = Self::new();

        // open.er-api: widest currency coverage for snapshots
        registry.register(Box::new(OpenErApiProvider::with_base_url(
            &settings.providers.open_er_api_url,
            timeout,
        )));

        // Frankfurter: snapshot fallback and the only history source
        registry.register(Box::new(FrankfurterProvider::with_base_url(
            &settings.providers.frankfurter_url,
            timeout,
        )));

        registry
    }

    /// Register a new rate provider. Earlier registrations take priority.
    pub fn register(&mut self, provider: Box<dyn RateProvider>) {
        self.providers.push(provider);
    }

    /// Return all providers that support `capability`, ordered by registration priority.
    pub fn get_providers_for(&self, capability: RateCapability) -> Vec<&dyn RateProvider> {
        self.providers
            .iter()
            .filter(|p| p.capabilities().contains(&capability))
            .map(|p| p.as_ref())
            .collect()
    }
}

impl Default for RateProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RateProvider for RateProviderRegistry {
    fn name(&self) -> &str {
        "Registry"
    }

    fn capabilities(&self) -> Vec<RateCapability> {
        [RateCapability::Snapshot, RateCapability::History]
            .into_iter()
            .filter(|c| !self.get_providers_for(*c).is_empty())
            .collect()
    }

    async fn fetch_current_rates(&self, base: &str) -> Result<RateSnapshot, CoreError> {
        let providers = self.get_providers_for(RateCapability::Snapshot);
        let mut last_error = None;

        for provider in &providers {
            match provider.fetch_current_rates(base).await {
                Ok(snapshot) => return Ok(snapshot),
                Err(e) => {
                    warn!(provider = provider.name(), error = %e, "snapshot fetch failed, trying next provider");
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| CoreError::NoProvider(RateCapability::Snapshot.to_string())))
    }

    async fn fetch_history(
        &self,
        from: &str,
        to: &str,
        range: DateRange,
    ) -> Result<RawRatesByDate, CoreError> {
        let providers = self.get_providers_for(RateCapability::History);
        let mut last_error = None;

        for provider in &providers {
            match provider.fetch_history(from, to, range).await {
                Ok(rates) => return Ok(rates),
                Err(e) => {
                    warn!(provider = provider.name(), error = %e, "history fetch failed, trying next provider");
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| CoreError::NoProvider(RateCapability::History.to_string())))
    }
}
