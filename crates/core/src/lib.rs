pub mod errors;
pub mod logging;
pub mod models;
pub mod providers;
pub mod services;

use std::sync::Arc;

use models::{
    conversion::{ConversionRequest, ConversionResult, CurrencyPair},
    rates::RateSnapshot,
    settings::Settings,
    window::TimeWindow,
};
use providers::{registry::RateProviderRegistry, traits::RateProvider};
use services::{
    conversion_engine::ConversionEngine,
    window_controller::{Clock, FetchTicket, WindowController},
};
use tracing::info;

use errors::CoreError;

/// Main entry point for the currency-converter core library.
///
/// Holds the current rate snapshot, the selected currency pair and the
/// window controller driving the trend view. Create one per screen and
/// drop it when the screen goes away; nothing is kept in global state.
#[must_use]
pub struct ConversionSession {
    settings: Settings,
    provider: Arc<dyn RateProvider>,
    engine: ConversionEngine,
    windows: WindowController,
    snapshot: Option<RateSnapshot>,
    selection: CurrencyPair,
}

impl std::fmt::Debug for ConversionSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversionSession")
            .field("provider", &self.provider.name())
            .field("base", &self.settings.base_currency)
            .field("currencies", &self.snapshot.as_ref().map_or(0, |s| s.len()))
            .field("selection", &self.selection)
            .finish()
    }
}

impl ConversionSession {
    /// Create a session backed by the default HTTP providers.
    pub fn new(settings: Settings) -> Result<Self, CoreError> {
        settings.validate()?;
        let registry = RateProviderRegistry::new_with_defaults(&settings);
        Ok(Self::with_provider(settings, Arc::new(registry)))
    }

    /// Create a session backed by any rate provider.
    pub fn with_provider(settings: Settings, provider: Arc<dyn RateProvider>) -> Self {
        let selection = CurrencyPair::new(&settings.default_from, &settings.default_to);
        let windows = WindowController::new(Arc::clone(&provider));
        Self {
            settings,
            provider,
            engine: ConversionEngine::new(),
            windows,
            snapshot: None,
            selection,
        }
    }

    /// Use `clock` as the source of "today" for window ranges.
    ///
    /// Replaces the window controller, so call it before selecting any window.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.windows = WindowController::with_clock(Arc::clone(&self.provider), clock);
        self
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    // ── Snapshot ────────────────────────────────────────────────────

    /// Fetch current rates for the configured base currency.
    ///
    /// On success the held snapshot is replaced wholesale. On failure the
    /// previous snapshot (if any) is kept and the error is returned.
    pub async fn load_snapshot(&mut self) -> Result<&RateSnapshot, CoreError> {
        let base = self.settings.base_currency.clone();
        let snapshot = self
            .provider
            .fetch_current_rates(&base)
            .await
            .map_err(CoreError::into_snapshot_error)?;

        info!(base = %snapshot.base(), currencies = snapshot.len(), "exchange rates loaded");
        let snapshot: &RateSnapshot = self.snapshot.insert(snapshot);
        Ok(snapshot)
    }

    #[must_use]
    pub fn snapshot(&self) -> Option<&RateSnapshot> {
        self.snapshot.as_ref()
    }

    /// Currency codes available for selection (sorted). Empty before the first load.
    #[must_use]
    pub fn available_currencies(&self) -> Vec<String> {
        self.snapshot
            .as_ref()
            .map(RateSnapshot::currencies)
            .unwrap_or_default()
    }

    // ── Conversion ──────────────────────────────────────────────────

    /// Convert using the held snapshot.
    pub fn convert(&self, request: &ConversionRequest) -> Result<ConversionResult, CoreError> {
        self.engine.convert(self.snapshot.as_ref(), request)
    }

    /// Convert raw amount text using the currently selected pair.
    pub fn convert_amount(&self, amount_text: &str) -> Result<ConversionResult, CoreError> {
        let request =
            ConversionRequest::parse(&self.selection.from, &self.selection.to, amount_text)?;
        self.convert(&request)
    }

    // ── Selection ───────────────────────────────────────────────────

    #[must_use]
    pub fn selection(&self) -> &CurrencyPair {
        &self.selection
    }

    pub fn select_currencies(&mut self, from: &str, to: &str) {
        self.selection = CurrencyPair::new(from, to);
    }

    /// Exchange the selected from/to currencies.
    pub fn swap_selection(&mut self) {
        self.selection = self.selection.swapped();
    }

    // ── Trend ───────────────────────────────────────────────────────

    /// The controller publishing trend results; subscribe to it for updates.
    #[must_use]
    pub fn windows(&self) -> &WindowController {
        &self.windows
    }

    /// Fetch the trend for `window` using the selected pair.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn select_window(&self, window: TimeWindow) -> FetchTicket {
        self.windows
            .select_window(window, &self.selection.from, &self.selection.to)
    }

    /// Fetch the opening trend range using the selected pair.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn select_default_window(&self) -> FetchTicket {
        self.windows
            .select_default(&self.selection.from, &self.selection.to)
    }
}
