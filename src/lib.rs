//! Configuration core for Boxarr.
//!
//! Resolves a single validated [`Settings`] instance from layered
//! sources (built-in defaults, an optional YAML file with `${VAR}`
//! environment interpolation, and process environment variables) and
//! exposes the genre based root folder router used when adding movies.
//!
//! The crate performs no network I/O and persists nothing: consumers
//! hand it a configuration directory and an environment, and get back
//! a typed, validated configuration object.

pub mod config;
pub mod error;
pub mod logging;
pub mod routing;

pub use config::{
    MinimumAvailability, MonitorOption, RootFolderConfig, RootFolderMapping, Settings,
    SettingsStore, Theme, settings,
};
pub use error::ConfigError;

#[cfg(test)]
pub(crate) mod test_env {
    use std::sync::{Mutex, MutexGuard, OnceLock};

    fn lock() -> MutexGuard<'static, ()> {
        static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        LOCK.get_or_init(Mutex::default)
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Run `f` with the given variables set (`Some`) or removed
    /// (`None`), restoring the previous values afterwards. Tests that
    /// touch the environment serialize on a shared lock.
    pub(crate) fn with_vars<R>(vars: &[(&str, Option<&str>)], f: impl FnOnce() -> R) -> R {
        let _guard = lock();
        let saved: Vec<(String, Option<String>)> = vars
            .iter()
            .map(|(name, value)| {
                let previous = std::env::var(name).ok();
                match value {
                    Some(value) => unsafe { std::env::set_var(name, value) },
                    None => unsafe { std::env::remove_var(name) },
                }
                (name.to_string(), previous)
            })
            .collect();

        let result = f();

        for (name, previous) in saved {
            match previous {
                Some(value) => unsafe { std::env::set_var(&name, value) },
                None => unsafe { std::env::remove_var(&name) },
            }
        }
        result
    }
}
