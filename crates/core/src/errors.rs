use thiserror::Error;

/// Unified error type for the entire currency-converter-core library.
/// Every public function returns `Result<T, CoreError>`.
///
/// All variants carry owned strings, so errors can be cloned into the
/// state published to window subscribers.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    // ── Conversion ──────────────────────────────────────────────────
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Unknown currency: {0}")]
    UnknownCurrency(String),

    // ── Snapshot ────────────────────────────────────────────────────
    #[error("Exchange rates not loaded: {0}")]
    SnapshotUnavailable(String),

    #[error("Failed to parse exchange rates: {0}")]
    SnapshotParseError(String),

    // ── History ─────────────────────────────────────────────────────
    #[error("No {currency} rate for {date}")]
    MissingTargetRate { date: String, currency: String },

    #[error("Failed to fetch historical data: {0}")]
    HistoryFetchFailed(String),

    // ── API / Network ───────────────────────────────────────────────
    #[error("API error ({provider}): {message}")]
    Api { provider: String, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("No provider available for: {0}")]
    NoProvider(String),

    // ── Configuration ───────────────────────────────────────────────
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CoreError {
    /// Re-tag a failure from the current-rates path.
    /// Parse failures keep their own tag; everything else means no snapshot.
    pub(crate) fn into_snapshot_error(self) -> Self {
        match self {
            e @ (CoreError::SnapshotParseError(_) | CoreError::SnapshotUnavailable(_)) => e,
            other => CoreError::SnapshotUnavailable(other.to_string()),
        }
    }

    /// Re-tag a failure from the history path.
    pub(crate) fn into_history_error(self) -> Self {
        match self {
            e @ CoreError::HistoryFetchFailed(_) => e,
            other => CoreError::HistoryFetchFailed(other.to_string()),
        }
    }
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        // reqwest errors often contain full URLs; keep the query string out of messages.
        let msg = e.to_string();
        let sanitized = if let Some(idx) = msg.find('?') {
            format!("{}?<query redacted>", &msg[..idx])
        } else {
            msg
        };
        CoreError::Network(sanitized)
    }
}
