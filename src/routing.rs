//! Genre based root folder routing.
//!
//! Rules are evaluated strictly in their stored order and the first
//! rule whose genre set intersects the movie's genres wins. The
//! numeric `priority` carried by each rule is stored data only and is
//! never consulted here; list position is the sole tie-break.

use crate::config::RootFolderConfig;
use std::collections::HashSet;

/// Resolve the destination root folder for a movie's genres.
///
/// Returns `fallback` when routing is disabled or no rule matches.
/// Genre names are trimmed and compared case-insensitively.
pub fn resolve_root_folder<'a>(
    config: &'a RootFolderConfig,
    genres: &[String],
    fallback: &'a str,
) -> &'a str {
    if !config.enabled {
        return fallback;
    }

    let movie_genres: HashSet<String> = genres
        .iter()
        .map(|genre| genre.trim().to_lowercase())
        .collect();

    for mapping in &config.mappings {
        let matches = mapping
            .genres
            .iter()
            .any(|genre| movie_genres.contains(&genre.trim().to_lowercase()));
        if matches {
            return &mapping.root_folder;
        }
    }

    fallback
}
