//! Document loading and settings resolution.
//!
//! The loader half parses a single YAML file into a mapping, routing
//! every scalar through placeholder interpolation and normalizing
//! absent, unreadable, and malformed files to an empty mapping. The
//! resolution half probes a fixed list of candidate files, merges the
//! first one that exists over defaults and environment bindings, and
//! validates the result.

use super::interp;
use super::merge;
use super::types::Settings;
use crate::error::ConfigError;
use serde_yaml::{Mapping, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Configuration directory: `BOXARR_DATA_DIRECTORY` when set and
/// non-empty, otherwise the relative `config` directory.
pub fn data_directory() -> PathBuf {
    std::env::var("BOXARR_DATA_DIRECTORY")
        .ok()
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config"))
}

/// Candidate config files in precedence order.
///
/// Resolution loads the first candidate that exists and never
/// consults the rest; there is no cross-file merging. The last two
/// entries are container volume mounts.
pub fn candidate_paths(data_dir: &Path) -> Vec<PathBuf> {
    vec![
        data_dir.join("local.yaml"),
        data_dir.join("config.yaml"),
        PathBuf::from("config/local.yaml"),
        PathBuf::from("config/default.yaml"),
        PathBuf::from("/config/local.yaml"),
        PathBuf::from("/config/config.yaml"),
    ]
}

/// Parse a YAML document from `path` with placeholder interpolation.
///
/// Every scalar containing `${...}` is resolved against the live
/// environment before the document is handed back. A file that is
/// missing, unreadable, or fails to parse yields an empty mapping,
/// never an error.
pub fn load_document(path: &Path) -> Value {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(error) => {
            debug!(path = %path.display(), %error, "config file not readable");
            return Value::Mapping(Mapping::new());
        }
    };
    match serde_yaml::from_str::<Value>(&content) {
        Ok(document @ Value::Mapping(_)) => interpolated(document),
        Ok(Value::Null) => Value::Mapping(Mapping::new()),
        Ok(_) => {
            warn!(path = %path.display(), "config file is not a mapping; ignoring");
            Value::Mapping(Mapping::new())
        }
        Err(error) => {
            warn!(path = %path.display(), %error, "ignoring malformed config file");
            Value::Mapping(Mapping::new())
        }
    }
}

fn interpolated(value: Value) -> Value {
    match value {
        Value::String(s) if interp::contains_placeholder(&s) => {
            Value::String(interp::interpolate(&s))
        }
        Value::Sequence(items) => {
            Value::Sequence(items.into_iter().map(interpolated).collect())
        }
        Value::Mapping(entries) => Value::Mapping(
            entries
                .into_iter()
                .map(|(key, value)| (interpolated(key), interpolated(value)))
                .collect(),
        ),
        other => other,
    }
}

impl Settings {
    /// Resolve settings for the directory named by
    /// `BOXARR_DATA_DIRECTORY`, defaulting to `config`.
    pub fn resolve() -> Result<Self, ConfigError> {
        Self::resolve_from(&data_directory())
    }

    /// Resolve settings against an explicit data directory.
    ///
    /// Layering order: built-in defaults, then generic environment
    /// bindings, then the first existing candidate file, then the
    /// dedicated `RADARR_API_KEY` fallback for a still-empty key.
    /// The result is normalized and validated before it is returned.
    pub fn resolve_from(data_dir: &Path) -> Result<Self, ConfigError> {
        let mut settings = Settings::default();
        merge::apply_env_bindings(&mut settings);
        settings.boxarr_data_directory = data_dir.to_path_buf();

        for candidate in candidate_paths(data_dir) {
            if candidate.exists() {
                info!(path = %candidate.display(), "loading configuration file");
                let document = load_document(&candidate);
                merge::apply_document(&mut settings, &document);
                break;
            }
        }

        if settings.radarr_api_key.is_empty()
            && let Ok(key) = std::env::var("RADARR_API_KEY")
            && !key.is_empty()
        {
            settings.radarr_api_key = key;
        }

        settings.normalize();
        settings.validate()?;
        Ok(settings)
    }
}
