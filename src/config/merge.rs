//! Merge engine: maps a parsed document onto the flat settings fields.
//!
//! Walks the document's top-level sections and assigns each leaf to
//! the settings field its path names (`radarr.url` → `radarr_url`,
//! `boxarr.ui.theme` → `boxarr_ui_theme`, ...). Unknown keys at any
//! level are skipped silently so old and new config files keep
//! loading, and a leaf whose value does not fit its field's type
//! leaves the field untouched.

use super::types::{MinimumAvailability, RootFolderConfig, Settings, Theme};
use serde_yaml::{Mapping, Value};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::OnceLock;
use tracing::{debug, warn};

/// Apply a parsed configuration document to `settings`.
///
/// Non-mapping documents are ignored; the loader already normalizes
/// absent and malformed files to an empty mapping.
pub fn apply_document(settings: &mut Settings, doc: &Value) {
    let Value::Mapping(sections) = doc else {
        return;
    };
    for (key, value) in sections {
        let Some(section) = key.as_str() else {
            continue;
        };
        match section {
            // Schema marker, carried by shipped config files.
            "version" => {}
            "radarr" => apply_radarr_section(settings, value),
            "boxarr" => apply_boxarr_section(settings, value),
            other => apply_field(settings, other, value),
        }
    }
}

fn apply_radarr_section(settings: &mut Settings, section: &Value) {
    let Value::Mapping(entries) = section else {
        return;
    };
    for (key, value) in entries {
        let Some(key) = key.as_str() else {
            continue;
        };
        match key {
            "root_folder_config" if value.is_mapping() => {
                // Replaced wholesale: absent sub-keys fall back to the
                // section defaults, not to the previous value.
                match serde_yaml::from_value::<RootFolderConfig>(value.clone()) {
                    Ok(config) => settings.radarr_root_folder_config = config,
                    Err(error) => {
                        warn!(%error, "ignoring invalid root_folder_config section");
                    }
                }
            }
            "minimum_availability" => {
                // Deprecated stages are remapped; an unparseable stage
                // leaves the previous value in place.
                if let Some(stage) = value.as_str().and_then(MinimumAvailability::parse) {
                    settings.radarr_minimum_availability = stage;
                }
            }
            _ => apply_field(settings, &format!("radarr_{key}"), value),
        }
    }
}

fn apply_boxarr_section(settings: &mut Settings, section: &Value) {
    let Value::Mapping(entries) = section else {
        return;
    };
    for (key, value) in entries {
        let Some(key) = key.as_str() else {
            continue;
        };
        match (key, value) {
            ("scheduler", Value::Mapping(sub)) => {
                apply_flat(settings, "boxarr_scheduler", sub);
            }
            ("features", Value::Mapping(sub)) => {
                for (feature, feature_value) in sub {
                    let Some(feature) = feature.as_str() else {
                        continue;
                    };
                    if feature == "auto_add_options"
                        && let Value::Mapping(options) = feature_value
                    {
                        apply_flat(settings, "boxarr_features_auto_add", options);
                    } else {
                        apply_field(
                            settings,
                            &format!("boxarr_features_{feature}"),
                            feature_value,
                        );
                    }
                }
            }
            ("ui", Value::Mapping(sub)) => {
                for (ui_key, ui_value) in sub {
                    let Some(ui_key) = ui_key.as_str() else {
                        continue;
                    };
                    if ui_key == "cards_per_row"
                        && let Value::Mapping(devices) = ui_value
                    {
                        for (device, count) in devices {
                            let Some(device) = device.as_str() else {
                                continue;
                            };
                            // The `4k` token gets an underscore prefix;
                            // the rewritten name goes through the same
                            // unknown-key rule as any other lookup.
                            let name = format!(
                                "boxarr_ui_cards_per_row_{}",
                                device.replace("4k", "_4k")
                            );
                            apply_field(settings, &name, count);
                        }
                    } else {
                        apply_field(settings, &format!("boxarr_ui_{ui_key}"), ui_value);
                    }
                }
            }
            ("data", Value::Mapping(sub)) => {
                apply_flat(settings, "boxarr_data", sub);
            }
            _ => apply_field(settings, &format!("boxarr_{key}"), value),
        }
    }
}

fn apply_flat(settings: &mut Settings, prefix: &str, entries: &Mapping) {
    for (key, value) in entries {
        if let Some(key) = key.as_str() {
            apply_field(settings, &format!("{prefix}_{key}"), value);
        }
    }
}

/// Assign a leaf value to the flat field `name`.
///
/// Interpolated scalars arrive as strings, so numeric and boolean
/// fields also accept stringly values.
pub(crate) fn apply_field(settings: &mut Settings, name: &str, value: &Value) {
    let applied = match name {
        "radarr_url" => coerce_string(value).map(|v| settings.radarr_url = v),
        "radarr_api_key" => coerce_string(value).map(|v| settings.radarr_api_key = v),
        "radarr_root_folder" => {
            coerce_string(value).map(|v| settings.radarr_root_folder = PathBuf::from(v))
        }
        "radarr_quality_profile_default" => {
            coerce_string(value).map(|v| settings.radarr_quality_profile_default = v)
        }
        "radarr_quality_profile_upgrade" => {
            coerce_string(value).map(|v| settings.radarr_quality_profile_upgrade = v)
        }
        "radarr_monitor_option" => serde_yaml::from_value(value.clone())
            .ok()
            .map(|v| settings.radarr_monitor_option = v),
        "radarr_minimum_availability_enabled" => {
            coerce_bool(value).map(|v| settings.radarr_minimum_availability_enabled = v)
        }
        "radarr_minimum_availability" => value
            .as_str()
            .and_then(MinimumAvailability::parse)
            .map(|v| settings.radarr_minimum_availability = v),
        "radarr_search_for_movie" => {
            coerce_bool(value).map(|v| settings.radarr_search_for_movie = v)
        }
        "radarr_root_folder_config" => serde_yaml::from_value(value.clone())
            .ok()
            .map(|v| settings.radarr_root_folder_config = v),
        "radarr_cache_ttl_seconds" => {
            coerce_u64(value).map(|v| settings.radarr_cache_ttl_seconds = v)
        }
        "boxarr_host" => coerce_string(value).map(|v| settings.boxarr_host = v),
        "boxarr_port" => coerce_u16(value).map(|v| settings.boxarr_port = v),
        "boxarr_api_port" => coerce_u16(value).map(|v| settings.boxarr_api_port = v),
        "boxarr_url_base" => coerce_string(value).map(|v| settings.boxarr_url_base = v),
        "boxarr_scheduler_enabled" => {
            coerce_bool(value).map(|v| settings.boxarr_scheduler_enabled = v)
        }
        "boxarr_scheduler_cron" => {
            coerce_string(value).map(|v| settings.boxarr_scheduler_cron = v)
        }
        "boxarr_scheduler_timezone" => {
            coerce_string(value).map(|v| settings.boxarr_scheduler_timezone = v)
        }
        "boxarr_ui_theme" => value
            .as_str()
            .and_then(Theme::parse)
            .map(|v| settings.boxarr_ui_theme = v),
        "boxarr_ui_cards_per_row_mobile" => {
            coerce_u8(value).map(|v| settings.boxarr_ui_cards_per_row_mobile = v)
        }
        "boxarr_ui_cards_per_row_tablet" => {
            coerce_u8(value).map(|v| settings.boxarr_ui_cards_per_row_tablet = v)
        }
        "boxarr_ui_cards_per_row_desktop" => {
            coerce_u8(value).map(|v| settings.boxarr_ui_cards_per_row_desktop = v)
        }
        "boxarr_ui_cards_per_row_4k" => {
            coerce_u8(value).map(|v| settings.boxarr_ui_cards_per_row_4k = v)
        }
        "boxarr_ui_show_descriptions" => {
            coerce_bool(value).map(|v| settings.boxarr_ui_show_descriptions = v)
        }
        "boxarr_features_auto_add" => {
            coerce_bool(value).map(|v| settings.boxarr_features_auto_add = v)
        }
        "boxarr_features_quality_upgrade" => {
            coerce_bool(value).map(|v| settings.boxarr_features_quality_upgrade = v)
        }
        "boxarr_features_notifications" => {
            coerce_bool(value).map(|v| settings.boxarr_features_notifications = v)
        }
        "boxarr_features_auto_tag_enabled" => {
            coerce_bool(value).map(|v| settings.boxarr_features_auto_tag_enabled = v)
        }
        "boxarr_features_auto_tag_text" => {
            coerce_string(value).map(|v| settings.boxarr_features_auto_tag_text = v)
        }
        "boxarr_features_auto_add_limit" => {
            coerce_u8(value).map(|v| settings.boxarr_features_auto_add_limit = v)
        }
        "boxarr_features_auto_add_genre_filter_enabled" => {
            coerce_bool(value).map(|v| settings.boxarr_features_auto_add_genre_filter_enabled = v)
        }
        "boxarr_features_auto_add_genre_filter_mode" => {
            coerce_string(value).map(|v| settings.boxarr_features_auto_add_genre_filter_mode = v)
        }
        "boxarr_features_auto_add_genre_whitelist" => coerce_string_list(value)
            .map(|v| settings.boxarr_features_auto_add_genre_whitelist = v),
        "boxarr_features_auto_add_genre_blacklist" => coerce_string_list(value)
            .map(|v| settings.boxarr_features_auto_add_genre_blacklist = v),
        "boxarr_features_auto_add_rating_filter_enabled" => {
            coerce_bool(value).map(|v| settings.boxarr_features_auto_add_rating_filter_enabled = v)
        }
        "boxarr_features_auto_add_rating_whitelist" => coerce_string_list(value)
            .map(|v| settings.boxarr_features_auto_add_rating_whitelist = v),
        "boxarr_features_auto_add_ignore_rereleases" => {
            coerce_bool(value).map(|v| settings.boxarr_features_auto_add_ignore_rereleases = v)
        }
        "boxarr_data_history_retention_days" => {
            coerce_u16(value).map(|v| settings.boxarr_data_history_retention_days = v)
        }
        "boxarr_data_cache_ttl_seconds" => {
            coerce_u64(value).map(|v| settings.boxarr_data_cache_ttl_seconds = v)
        }
        "boxarr_data_directory" => {
            coerce_string(value).map(|v| settings.boxarr_data_directory = PathBuf::from(v))
        }
        "log_level" => coerce_string(value).map(|v| settings.log_level = v),
        "log_format" => coerce_string(value).map(|v| settings.log_format = v),
        _ => {
            debug!(field = name, "skipping unknown configuration key");
            return;
        }
    };
    if applied.is_none() {
        warn!(field = name, "skipping value that does not fit the field");
    }
}

/// Apply generic environment bindings.
///
/// A variable whose lower-cased name reaches a settings field is
/// assigned, with `__` accepted as a section delimiter: `RADARR_URL`
/// and `RADARR__URL` both land on `radarr_url`. Values parse as YAML
/// scalars so numbers and booleans coerce; anything else stays a
/// string.
pub(crate) fn apply_env_bindings(settings: &mut Settings) {
    for (name, raw) in std::env::vars() {
        let field = name.to_ascii_lowercase().replace("__", "_");
        if !is_known_field(&field) {
            continue;
        }
        let value = match serde_yaml::from_str::<Value>(&raw) {
            Ok(Value::Null) | Err(_) => Value::String(raw),
            Ok(parsed) => parsed,
        };
        apply_field(settings, &field, &value);
    }
}

/// Field-name registry derived from the serialized form of the
/// defaults, so it cannot drift from the struct definition.
fn is_known_field(name: &str) -> bool {
    static FIELDS: OnceLock<HashSet<String>> = OnceLock::new();
    FIELDS
        .get_or_init(|| match serde_json::to_value(Settings::default()) {
            Ok(serde_json::Value::Object(map)) => map.keys().cloned().collect(),
            _ => HashSet::new(),
        })
        .contains(name)
}

fn coerce_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn coerce_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Some(true),
            "false" | "0" | "no" | "off" => Some(false),
            _ => None,
        },
        Value::Number(n) => match n.as_u64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
        _ => None,
    }
}

fn coerce_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn coerce_u16(value: &Value) -> Option<u16> {
    coerce_u64(value).and_then(|v| u16::try_from(v).ok())
}

fn coerce_u8(value: &Value) -> Option<u8> {
    coerce_u64(value).and_then(|v| u8::try_from(v).ok())
}

fn coerce_string_list(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::Sequence(items) => items.iter().map(coerce_string).collect(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::MonitorOption;
    use crate::test_env::with_vars;

    fn doc(yaml: &str) -> Value {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_radarr_section_maps_to_prefixed_fields() {
        let mut settings = Settings::default();
        apply_document(
            &mut settings,
            &doc(r#"
radarr:
  url: http://radarr:7878
  api_key: abc123
  root_folder: /data/movies
  monitor_option: movieAndCollection
  search_for_movie: false
"#),
        );
        assert_eq!(settings.radarr_url, "http://radarr:7878");
        assert_eq!(settings.radarr_api_key, "abc123");
        assert_eq!(settings.radarr_root_folder, PathBuf::from("/data/movies"));
        assert_eq!(settings.radarr_monitor_option, MonitorOption::MovieAndCollection);
        assert!(!settings.radarr_search_for_movie);
    }

    #[test]
    fn test_root_folder_config_replaced_wholesale() {
        let mut settings = Settings::default();
        settings.radarr_root_folder_config.enabled = true;
        apply_document(
            &mut settings,
            &doc(r#"
radarr:
  root_folder_config:
    mappings:
      - genres: [horror]
        root_folder: /movies/horror
        priority: 3
"#),
        );
        // `enabled` was absent from the section, so it reset to the
        // section default rather than keeping the previous value.
        assert!(!settings.radarr_root_folder_config.enabled);
        assert_eq!(settings.radarr_root_folder_config.mappings.len(), 1);
        assert_eq!(
            settings.radarr_root_folder_config.mappings[0].root_folder,
            "/movies/horror"
        );
        assert_eq!(settings.radarr_root_folder_config.mappings[0].priority, 3);
    }

    #[test]
    fn test_deprecated_minimum_availability_remapped() {
        let mut settings = Settings::default();
        settings.radarr_minimum_availability = MinimumAvailability::Released;
        apply_document(&mut settings, &doc("radarr:\n  minimum_availability: preDb\n"));
        assert_eq!(
            settings.radarr_minimum_availability,
            MinimumAvailability::Announced
        );
    }

    #[test]
    fn test_invalid_minimum_availability_keeps_previous_value() {
        let mut settings = Settings::default();
        settings.radarr_minimum_availability = MinimumAvailability::Released;
        apply_document(
            &mut settings,
            &doc("radarr:\n  minimum_availability: whenever\n"),
        );
        assert_eq!(
            settings.radarr_minimum_availability,
            MinimumAvailability::Released
        );
    }

    #[test]
    fn test_boxarr_nested_sections_flatten() {
        let mut settings = Settings::default();
        apply_document(
            &mut settings,
            &doc(r#"
boxarr:
  host: 127.0.0.1
  port: 9000
  scheduler:
    enabled: false
    cron: "0 8 * * 1"
  features:
    auto_add: true
    auto_add_options:
      limit: 5
      ignore_rereleases: true
  ui:
    theme: dark
    show_descriptions: false
    cards_per_row:
      mobile: 2
      desktop: 6
  data:
    history_retention_days: 30
"#),
        );
        assert_eq!(settings.boxarr_host, "127.0.0.1");
        assert_eq!(settings.boxarr_port, 9000);
        assert!(!settings.boxarr_scheduler_enabled);
        assert_eq!(settings.boxarr_scheduler_cron, "0 8 * * 1");
        assert!(settings.boxarr_features_auto_add);
        assert_eq!(settings.boxarr_features_auto_add_limit, 5);
        assert!(settings.boxarr_features_auto_add_ignore_rereleases);
        assert_eq!(settings.boxarr_ui_theme, Theme::Dark);
        assert!(!settings.boxarr_ui_show_descriptions);
        assert_eq!(settings.boxarr_ui_cards_per_row_mobile, 2);
        assert_eq!(settings.boxarr_ui_cards_per_row_desktop, 6);
        assert_eq!(settings.boxarr_data_history_retention_days, 30);
    }

    #[test]
    fn test_cards_per_row_4k_device_is_dropped() {
        // The literal `4k` → `_4k` rewrite produces a name with a
        // doubled underscore, which matches no field, so the
        // unknown-key rule swallows it.
        let mut settings = Settings::default();
        apply_document(
            &mut settings,
            &doc("boxarr:\n  ui:\n    cards_per_row:\n      \"4k\": 8\n"),
        );
        assert_eq!(settings.boxarr_ui_cards_per_row_4k, 5);
    }

    #[test]
    fn test_legacy_theme_coerced_at_merge() {
        let mut settings = Settings::default();
        apply_document(&mut settings, &doc("boxarr:\n  ui:\n    theme: purple\n"));
        assert_eq!(settings.boxarr_ui_theme, Theme::Light);
    }

    #[test]
    fn test_version_and_unknown_keys_ignored() {
        let mut settings = Settings::default();
        apply_document(
            &mut settings,
            &doc(r#"
version: 2
radarr:
  url: http://radarr:7878
  brand_new_option: 42
boxarr:
  experimental:
    nested: true
sonarr:
  url: http://sonarr:8989
"#),
        );
        assert_eq!(settings.radarr_url, "http://radarr:7878");
        // Everything else left at defaults.
        assert_eq!(settings.boxarr_port, 8888);
    }

    #[test]
    fn test_top_level_field_names_apply_directly() {
        let mut settings = Settings::default();
        apply_document(&mut settings, &doc("log_level: DEBUG\nlog_format: json\n"));
        assert_eq!(settings.log_level, "DEBUG");
        assert_eq!(settings.log_format, "json");
    }

    #[test]
    fn test_stringly_scalars_coerce() {
        // Interpolated placeholders always yield strings; numeric and
        // boolean fields must still accept them.
        let mut settings = Settings::default();
        apply_document(
            &mut settings,
            &doc("boxarr:\n  port: \"9001\"\n  scheduler:\n    enabled: \"false\"\n"),
        );
        assert_eq!(settings.boxarr_port, 9001);
        assert!(!settings.boxarr_scheduler_enabled);
    }

    #[test]
    fn test_mistyped_value_leaves_field_untouched() {
        let mut settings = Settings::default();
        apply_document(&mut settings, &doc("boxarr:\n  port: [1, 2]\n"));
        assert_eq!(settings.boxarr_port, 8888);
    }

    #[test]
    fn test_non_mapping_document_is_ignored() {
        let mut settings = Settings::default();
        apply_document(&mut settings, &doc("- just\n- a\n- list\n"));
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_env_bindings_reach_flat_fields() {
        with_vars(
            &[
                ("RADARR_URL", Some("http://env:7878")),
                ("BOXARR__PORT", Some("9100")),
                ("BOXARR_SCHEDULER_ENABLED", Some("false")),
                ("UNRELATED_VARIABLE", Some("ignored")),
            ],
            || {
                let mut settings = Settings::default();
                apply_env_bindings(&mut settings);
                assert_eq!(settings.radarr_url, "http://env:7878");
                assert_eq!(settings.boxarr_port, 9100);
                assert!(!settings.boxarr_scheduler_enabled);
            },
        );
    }
}
