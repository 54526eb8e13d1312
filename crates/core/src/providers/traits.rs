use async_trait::async_trait;

use crate::errors::CoreError;
use crate::models::rates::{RateSnapshot, RawRatesByDate};
use crate::models::window::DateRange;

/// What a rate provider can be asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RateCapability {
    /// Current rates for every currency relative to a base.
    Snapshot,
    /// Daily rates between two currencies over a date range.
    History,
}

impl std::fmt::Display for RateCapability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RateCapability::Snapshot => write!(f, "current rates"),
            RateCapability::History => write!(f, "historical rates"),
        }
    }
}

/// Trait abstraction for exchange-rate data sources.
///
/// Each remote API implements this trait and decodes its own wire format
/// into the typed structures below. The session and window controller only
/// ever see `RateSnapshot` and `RawRatesByDate`.
#[async_trait]
pub trait RateProvider: Send + Sync {
    /// Human-readable name of this provider (for logs/errors).
    fn name(&self) -> &str;

    /// Which requests this provider can serve.
    fn capabilities(&self) -> Vec<RateCapability>;

    /// Current rates for all currencies relative to `base`.
    async fn fetch_current_rates(&self, base: &str) -> Result<RateSnapshot, CoreError>;

    /// Daily `from → to` rates over `range`, keyed by `yyyy-MM-dd`.
    /// Each per-date map exposes at least the `to` rate when the provider has it.
    async fn fetch_history(
        &self,
        from: &str,
        to: &str,
        range: DateRange,
    ) -> Result<RawRatesByDate, CoreError>;
}
