use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    filter::Targets, fmt, prelude::__tracing_subscriber_SubscriberExt, util::SubscriberInitExt,
    EnvFilter,
};

use crate::errors::CoreError;

/// Install a global `tracing` subscriber.
///
/// `verbose` turns on debug output for this crate and for `extra_targets`
/// (e.g. the binary's own crate name). `RUST_LOG` still applies on top.
/// Fails if a global subscriber is already installed.
pub fn init_logging(verbose: bool, extra_targets: &[&str]) -> Result<(), CoreError> {
    let (level_filter, level) = if verbose {
        (LevelFilter::DEBUG, "debug")
    } else {
        (LevelFilter::WARN, "warn")
    };

    let app_filter = extra_targets.iter().fold(
        Targets::new().with_target("currency_converter_core", level_filter),
        |targets, target| targets.with_target(*target, level_filter),
    );
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().without_time())
        .with(app_filter)
        .with(env_filter)
        .try_init()
        .map_err(|e| CoreError::Config(format!("Failed to initialise logging: {e}")))
}
