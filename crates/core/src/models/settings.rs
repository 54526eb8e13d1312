use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::errors::CoreError;

/// Default endpoint for current-rate snapshots.
pub const DEFAULT_OPEN_ER_API_URL: &str = "https://open.er-api.com/v6";
/// Default endpoint for historical time series.
pub const DEFAULT_FRANKFURTER_URL: &str = "https://api.frankfurter.app";

/// User-configurable settings for a conversion session.
///
/// Every field has a default, so a config file only needs the keys it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Currency all snapshot rates are fetched relative to (e.g., "USD").
    pub base_currency: String,

    /// Pair selected when a session starts.
    pub default_from: String,
    pub default_to: String,

    /// Per-request HTTP timeout for provider calls.
    pub request_timeout_secs: u64,

    /// Provider endpoints. Overridable so tests and mirrors can point elsewhere.
    pub providers: ProviderSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProviderSettings {
    pub open_er_api_url: String,
    pub frankfurter_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_currency: "USD".to_string(),
            default_from: "USD".to_string(),
            default_to: "EUR".to_string(),
            request_timeout_secs: 30,
            providers: ProviderSettings::default(),
        }
    }
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            open_er_api_url: DEFAULT_OPEN_ER_API_URL.to_string(),
            frankfurter_url: DEFAULT_FRANKFURTER_URL.to_string(),
        }
    }
}

impl Settings {
    /// Parse settings from a JSON document and validate them.
    pub fn from_json_str(json: &str) -> Result<Self, CoreError> {
        let settings: Settings = serde_json::from_str(json)
            .map_err(|e| CoreError::Config(format!("Invalid settings: {e}")))?;
        settings.validate()?;
        Ok(settings.normalized())
    }

    /// Load settings from a JSON file on disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            CoreError::Config(format!("Failed to read {}: {e}", path.display()))
        })?;
        Self::from_json_str(&contents)
    }

    /// Reject values no session could work with.
    pub fn validate(&self) -> Result<(), CoreError> {
        for (field, code) in [
            ("base_currency", &self.base_currency),
            ("default_from", &self.default_from),
            ("default_to", &self.default_to),
        ] {
            if code.trim().is_empty() {
                return Err(CoreError::Config(format!("{field} must not be empty")));
            }
        }
        if self.request_timeout_secs == 0 {
            return Err(CoreError::Config(
                "request_timeout_secs must be greater than 0".into(),
            ));
        }
        for (field, url) in [
            ("providers.open_er_api_url", &self.providers.open_er_api_url),
            ("providers.frankfurter_url", &self.providers.frankfurter_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(CoreError::Config(format!(
                    "{field} must be an http(s) URL, got '{url}'"
                )));
            }
        }
        Ok(())
    }

    fn normalized(mut self) -> Self {
        self.base_currency = self.base_currency.trim().to_uppercase();
        self.default_from = self.default_from.trim().to_uppercase();
        self.default_to = self.default_to.trim().to_uppercase();
        let trim_slash = |url: &mut String| {
            while url.ends_with('/') {
                url.pop();
            }
        };
        trim_slash(&mut self.providers.open_er_api_url);
        trim_slash(&mut self.providers.frankfurter_url);
        self
    }
}
