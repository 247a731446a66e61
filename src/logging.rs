//! Logging initialization driven by the resolved settings.
//!
//! `log_level` uses the historical level names (DEBUG, INFO, WARNING,
//! ERROR), mapped onto `tracing` levels; `log_format` selects the
//! formatter. An explicit `RUST_LOG` always wins over the configured
//! level.

use crate::config::Settings;
use tracing_subscriber::EnvFilter;

/// Map a configured level name onto a `tracing` filter directive.
///
/// Unrecognized names fall back to `info`.
fn level_directive(level: &str) -> &'static str {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => "trace",
        "debug" => "debug",
        "warn" | "warning" => "warn",
        "error" | "critical" => "error",
        _ => "info",
    }
}

/// Install the global tracing subscriber from `log_level` and
/// `log_format`.
///
/// Does nothing if a subscriber is already installed, so tests and
/// embedding applications can call it freely.
pub fn init(settings: &Settings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_directive(&settings.log_level)));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let _ = match settings.log_format.trim().to_ascii_lowercase().as_str() {
        "json" => builder.json().try_init(),
        "compact" => builder.compact().try_init(),
        _ => builder.try_init(),
    };
}
