//! Settings model: the fully resolved, validated configuration.
//!
//! All fields live in one flat namespace; the `radarr_` / `boxarr_`
//! prefixes carry the logical grouping that the YAML file expresses
//! through nesting. Construction never touches the filesystem;
//! directory creation is an explicit, separate operation.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// UI color theme.
///
/// The legacy `purple` and `blue` values are accepted on input and
/// coerced to `Light`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Light,
    Dark,
    Auto,
}

impl Theme {
    /// Parse a theme name, mapping the legacy `purple`/`blue` values
    /// to `Light`. Returns `None` for anything unrecognized.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "light" | "purple" | "blue" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            "auto" => Some(Self::Auto),
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for Theme {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Self::parse(&value).ok_or_else(|| {
            serde::de::Error::unknown_variant(&value, &["light", "dark", "auto"])
        })
    }
}

/// What Radarr monitors when a movie is added.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MonitorOption {
    #[default]
    MovieOnly,
    MovieAndCollection,
    None,
}

/// Release stage gating when a movie becomes eligible for acquisition.
///
/// The deprecated `preDb` stage is accepted on input and coerced to
/// `Announced`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MinimumAvailability {
    #[default]
    Announced,
    InCinemas,
    Released,
}

impl MinimumAvailability {
    /// Parse a wire value, remapping the deprecated `preDb` stage to
    /// `Announced`. Returns `None` for anything unrecognized.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "announced" => Some(Self::Announced),
            "inCinemas" => Some(Self::InCinemas),
            "released" => Some(Self::Released),
            "preDb" => Some(Self::Announced),
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for MinimumAvailability {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Self::parse(&value).ok_or_else(|| {
            serde::de::Error::unknown_variant(&value, &["announced", "inCinemas", "released"])
        })
    }
}

/// A single genre → root folder routing rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RootFolderMapping {
    /// Genres this rule matches, compared case-insensitively.
    pub genres: Vec<String>,
    /// Destination root folder for matching movies.
    pub root_folder: String,
    /// Stored rule weight, kept for data fidelity and export.
    /// Selection is strictly list-order and never reads this.
    #[serde(default)]
    pub priority: i64,
}

/// Genre based root folder routing configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RootFolderConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Rules in evaluation order; the first match wins.
    #[serde(default)]
    pub mappings: Vec<RootFolderMapping>,
}

/// Cards-per-row counts keyed by UI breakpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CardsPerRow {
    pub mobile: u8,
    pub tablet: u8,
    pub desktop: u8,
    #[serde(rename = "4k")]
    pub four_k: u8,
}

/// The resolved application configuration.
///
/// Built by [`Settings::resolve`], which layers an optional YAML file
/// and environment bindings over these defaults. Field invariants are
/// enforced by [`Settings::validate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Radarr connection
    /// Base URL of the Radarr instance.
    pub radarr_url: String,
    /// Radarr API key. Empty means unconfigured; `RADARR_API_KEY`
    /// fills it during resolution.
    pub radarr_api_key: String,
    /// Base root folder for movies in Radarr.
    pub radarr_root_folder: PathBuf,
    /// Quality profile assigned to new movies.
    pub radarr_quality_profile_default: String,
    /// Quality profile used when upgrading.
    pub radarr_quality_profile_upgrade: String,
    pub radarr_monitor_option: MonitorOption,
    /// Whether a minimum availability is sent when adding movies.
    pub radarr_minimum_availability_enabled: bool,
    pub radarr_minimum_availability: MinimumAvailability,
    /// Trigger a search right after adding a movie.
    pub radarr_search_for_movie: bool,
    /// Genre based root folder routing; replaced wholesale when the
    /// config file carries a `root_folder_config` section.
    pub radarr_root_folder_config: RootFolderConfig,
    /// In-memory TTL for the Radarr library/profile cache (10..=3600 s).
    pub radarr_cache_ttl_seconds: u64,

    // Server
    /// Host the web server binds to.
    pub boxarr_host: String,
    /// Web interface port.
    pub boxarr_port: u16,
    /// API server port; must differ from the web port.
    pub boxarr_api_port: u16,
    /// URL base path for reverse proxies, stored without surrounding
    /// slashes (`boxarr` for `/boxarr/`).
    pub boxarr_url_base: String,

    // Scheduler
    pub boxarr_scheduler_enabled: bool,
    /// Cron expression for scheduled updates.
    pub boxarr_scheduler_cron: String,
    pub boxarr_scheduler_timezone: String,

    // UI
    pub boxarr_ui_theme: Theme,
    /// Cards per row on mobile (1..=3).
    pub boxarr_ui_cards_per_row_mobile: u8,
    /// Cards per row on tablet (2..=4).
    pub boxarr_ui_cards_per_row_tablet: u8,
    /// Cards per row on desktop (3..=6).
    pub boxarr_ui_cards_per_row_desktop: u8,
    /// Cards per row on 4K displays (4..=8).
    pub boxarr_ui_cards_per_row_4k: u8,
    pub boxarr_ui_show_descriptions: bool,

    // Feature flags
    /// Automatically add box-office movies to Radarr.
    pub boxarr_features_auto_add: bool,
    pub boxarr_features_quality_upgrade: bool,
    pub boxarr_features_notifications: bool,
    pub boxarr_features_auto_tag_enabled: bool,
    /// Tag applied to movies added to Radarr: a single word, at most
    /// 20 characters.
    pub boxarr_features_auto_tag_text: String,
    /// Maximum number of movies to auto-add per run (1..=10).
    pub boxarr_features_auto_add_limit: u8,
    pub boxarr_features_auto_add_genre_filter_enabled: bool,
    /// `whitelist` or `blacklist`.
    pub boxarr_features_auto_add_genre_filter_mode: String,
    pub boxarr_features_auto_add_genre_whitelist: Vec<String>,
    pub boxarr_features_auto_add_genre_blacklist: Vec<String>,
    pub boxarr_features_auto_add_rating_filter_enabled: bool,
    pub boxarr_features_auto_add_rating_whitelist: Vec<String>,
    /// Skip movies released before (selected year - 1).
    pub boxarr_features_auto_add_ignore_rereleases: bool,

    // Data
    /// Days of history to retain (7..=365).
    pub boxarr_data_history_retention_days: u16,
    /// Box-office cache TTL (60..=86400 s).
    pub boxarr_data_cache_ttl_seconds: u64,
    /// Data storage directory. Resolution overrides this with
    /// `BOXARR_DATA_DIRECTORY`, defaulting to `config`.
    pub boxarr_data_directory: PathBuf,

    // Logging
    /// Minimum log level (DEBUG, INFO, WARNING, ERROR).
    pub log_level: String,
    /// Log formatter: `full`, `compact`, or `json`.
    pub log_format: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            radarr_url: "http://localhost:7878".to_string(),
            radarr_api_key: String::new(),
            radarr_root_folder: PathBuf::from("/movies"),
            radarr_quality_profile_default: "HD-1080p".to_string(),
            radarr_quality_profile_upgrade: "Ultra-HD".to_string(),
            radarr_monitor_option: MonitorOption::MovieOnly,
            radarr_minimum_availability_enabled: false,
            radarr_minimum_availability: MinimumAvailability::Announced,
            radarr_search_for_movie: true,
            radarr_root_folder_config: RootFolderConfig::default(),
            radarr_cache_ttl_seconds: 120,
            boxarr_host: "0.0.0.0".to_string(),
            boxarr_port: 8888,
            boxarr_api_port: 8889,
            boxarr_url_base: String::new(),
            boxarr_scheduler_enabled: true,
            boxarr_scheduler_cron: "0 23 * * 2".to_string(),
            boxarr_scheduler_timezone: "America/New_York".to_string(),
            boxarr_ui_theme: Theme::Light,
            boxarr_ui_cards_per_row_mobile: 1,
            boxarr_ui_cards_per_row_tablet: 3,
            boxarr_ui_cards_per_row_desktop: 5,
            boxarr_ui_cards_per_row_4k: 5,
            boxarr_ui_show_descriptions: true,
            boxarr_features_auto_add: false,
            boxarr_features_quality_upgrade: true,
            boxarr_features_notifications: false,
            boxarr_features_auto_tag_enabled: true,
            boxarr_features_auto_tag_text: "boxarr".to_string(),
            boxarr_features_auto_add_limit: 10,
            boxarr_features_auto_add_genre_filter_enabled: false,
            boxarr_features_auto_add_genre_filter_mode: "blacklist".to_string(),
            boxarr_features_auto_add_genre_whitelist: Vec::new(),
            boxarr_features_auto_add_genre_blacklist: Vec::new(),
            boxarr_features_auto_add_rating_filter_enabled: false,
            boxarr_features_auto_add_rating_whitelist: Vec::new(),
            boxarr_features_auto_add_ignore_rereleases: false,
            boxarr_data_history_retention_days: 90,
            boxarr_data_cache_ttl_seconds: 3600,
            boxarr_data_directory: PathBuf::from("/config"),
            log_level: "INFO".to_string(),
            log_format: "full".to_string(),
        }
    }
}

fn check_range<T>(field: &'static str, value: T, min: T, max: T) -> Result<(), ConfigError>
where
    T: PartialOrd + Copy + std::fmt::Display,
{
    if value < min || value > max {
        return Err(ConfigError::validation(
            field,
            format!("{value} is outside the allowed range {min}..={max}"),
        ));
    }
    Ok(())
}

impl Settings {
    /// Normalize fields that accept sloppy input: strip surrounding
    /// slashes from the URL base and trim the auto-tag text, falling
    /// back to the default tag when it trims to nothing.
    pub fn normalize(&mut self) {
        self.boxarr_url_base = self.boxarr_url_base.trim_matches('/').to_string();
        let tag = self.boxarr_features_auto_tag_text.trim().to_string();
        self.boxarr_features_auto_tag_text = if tag.is_empty() {
            "boxarr".to_string()
        } else {
            tag
        };
    }

    /// Enforce field invariants.
    ///
    /// Never touches the filesystem; see [`Settings::ensure_directories`]
    /// for the explicit directory creation step.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.radarr_url.starts_with("http://") && !self.radarr_url.starts_with("https://") {
            return Err(ConfigError::validation(
                "radarr_url",
                format!("`{}` is not an http(s) URL", self.radarr_url),
            ));
        }
        if self.boxarr_port == 0 {
            return Err(ConfigError::validation(
                "boxarr_port",
                "port must be between 1 and 65535",
            ));
        }
        if self.boxarr_api_port == 0 {
            return Err(ConfigError::validation(
                "boxarr_api_port",
                "port must be between 1 and 65535",
            ));
        }
        if self.boxarr_api_port == self.boxarr_port {
            return Err(ConfigError::validation(
                "boxarr_api_port",
                "API port must be different from web port",
            ));
        }

        let tag = &self.boxarr_features_auto_tag_text;
        if tag.is_empty() {
            return Err(ConfigError::validation(
                "boxarr_features_auto_tag_text",
                "auto tag must not be empty",
            ));
        }
        if tag.chars().any(char::is_whitespace) {
            return Err(ConfigError::validation(
                "boxarr_features_auto_tag_text",
                "auto tag must be a single word without spaces",
            ));
        }
        if tag.chars().count() > 20 {
            return Err(ConfigError::validation(
                "boxarr_features_auto_tag_text",
                "auto tag must be at most 20 characters",
            ));
        }

        check_range(
            "boxarr_ui_cards_per_row_mobile",
            self.boxarr_ui_cards_per_row_mobile,
            1,
            3,
        )?;
        check_range(
            "boxarr_ui_cards_per_row_tablet",
            self.boxarr_ui_cards_per_row_tablet,
            2,
            4,
        )?;
        check_range(
            "boxarr_ui_cards_per_row_desktop",
            self.boxarr_ui_cards_per_row_desktop,
            3,
            6,
        )?;
        check_range(
            "boxarr_ui_cards_per_row_4k",
            self.boxarr_ui_cards_per_row_4k,
            4,
            8,
        )?;
        check_range(
            "boxarr_features_auto_add_limit",
            self.boxarr_features_auto_add_limit,
            1,
            10,
        )?;
        check_range(
            "boxarr_data_history_retention_days",
            self.boxarr_data_history_retention_days,
            7,
            365,
        )?;
        check_range(
            "boxarr_data_cache_ttl_seconds",
            self.boxarr_data_cache_ttl_seconds,
            60,
            86_400,
        )?;
        check_range(
            "radarr_cache_ttl_seconds",
            self.radarr_cache_ttl_seconds,
            10,
            3_600,
        )?;

        Ok(())
    }

    /// Whether the minimum configuration for talking to Radarr exists.
    pub fn is_configured(&self) -> bool {
        !self.radarr_api_key.is_empty()
    }

    /// Cards-per-row counts for every breakpoint.
    pub fn cards_per_row(&self) -> CardsPerRow {
        CardsPerRow {
            mobile: self.boxarr_ui_cards_per_row_mobile,
            tablet: self.boxarr_ui_cards_per_row_tablet,
            desktop: self.boxarr_ui_cards_per_row_desktop,
            four_k: self.boxarr_ui_cards_per_row_4k,
        }
    }

    /// History storage directory under the data directory.
    ///
    /// The directory is not created here; call
    /// [`Settings::ensure_directories`] when it is actually needed.
    pub fn history_path(&self) -> PathBuf {
        self.boxarr_data_directory.join("history")
    }

    /// Create the data directory tree.
    ///
    /// The only operation in this crate with filesystem side effects.
    pub fn ensure_directories(&self) -> Result<(), ConfigError> {
        for dir in [
            self.boxarr_data_directory.clone(),
            self.boxarr_data_directory.join("history"),
            self.boxarr_data_directory.join("logs"),
            self.boxarr_data_directory.join("weekly_pages"),
        ] {
            std::fs::create_dir_all(&dir)
                .map_err(|source| ConfigError::CreateDirectory { path: dir.clone(), source })?;
        }
        Ok(())
    }

    /// Export every field as a JSON object.
    ///
    /// The API key is masked as `***` unless `include_sensitive` is
    /// set; an empty key exports as an empty string either way.
    pub fn to_value(&self, include_sensitive: bool) -> serde_json::Value {
        let mut value = serde_json::to_value(self).unwrap_or(serde_json::Value::Null);
        if !include_sensitive
            && let Some(key) = value.get_mut("radarr_api_key")
        {
            *key = serde_json::Value::from(if self.radarr_api_key.is_empty() {
                ""
            } else {
                "***"
            });
        }
        value
    }

    /// Destination root folder for a movie's genres.
    ///
    /// Falls back to `default`, or to the base Radarr root folder when
    /// no default is given. See [`crate::routing::resolve_root_folder`]
    /// for the matching rules.
    pub fn root_folder_for_genres(&self, genres: &[String], default: Option<&str>) -> String {
        let base = self.radarr_root_folder.to_string_lossy();
        let fallback = default.unwrap_or_else(|| base.as_ref());
        crate::routing::resolve_root_folder(&self.radarr_root_folder_config, genres, fallback)
            .to_string()
    }
}
