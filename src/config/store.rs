//! Cached access to the resolved settings.
//!
//! Resolution reads disk and environment once; afterwards every caller
//! gets the same shared instance until it is explicitly invalidated.
//! There is no file watching; invalidate-then-get (or `reload`) is
//! the only reload mechanism.

use super::types::Settings;
use crate::error::ConfigError;
use arc_swap::ArcSwapOption;
use std::sync::{Arc, Mutex, OnceLock};

/// Caches the resolved [`Settings`] behind an atomic pointer.
///
/// Reads are lock-free; first-access construction takes a mutex so
/// concurrent callers resolve exactly once and observe the same
/// instance.
#[derive(Default)]
pub struct SettingsStore {
    cached: ArcSwapOption<Settings>,
    init: Mutex<()>,
}

impl SettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The resolved settings, constructed on first access.
    pub fn get(&self) -> Result<Arc<Settings>, ConfigError> {
        if let Some(settings) = self.cached.load_full() {
            return Ok(settings);
        }
        let _guard = self
            .init
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        // A racing caller may have filled the cache while we waited.
        if let Some(settings) = self.cached.load_full() {
            return Ok(settings);
        }
        let settings = Arc::new(Settings::resolve()?);
        self.cached.store(Some(Arc::clone(&settings)));
        Ok(settings)
    }

    /// Drop the cached instance so the next [`SettingsStore::get`]
    /// re-resolves from disk and environment.
    pub fn invalidate(&self) {
        self.cached.store(None);
    }

    /// Re-resolve immediately and return the fresh instance.
    ///
    /// Callers holding an `Arc` from an earlier `get` keep the old
    /// snapshot; nothing is mutated in place.
    pub fn reload(&self) -> Result<Arc<Settings>, ConfigError> {
        self.invalidate();
        self.get()
    }
}

/// The process-wide settings store.
pub fn shared() -> &'static SettingsStore {
    static STORE: OnceLock<SettingsStore> = OnceLock::new();
    STORE.get_or_init(SettingsStore::new)
}

/// Resolved settings from the process-wide store.
pub fn settings() -> Result<Arc<Settings>, ConfigError> {
    shared().get()
}
