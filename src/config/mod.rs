//! Layered settings resolution.
//!
//! A [`Settings`] instance is resolved in four layers:
//! 1. **Defaults** - built into [`Settings::default`]
//! 2. **Environment bindings** - any variable whose name reaches a
//!    field (`RADARR_URL`, `BOXARR__PORT`, ...)
//! 3. **Config file** - the first existing candidate from the search
//!    list, with `${VAR}` / `${VAR:default}` scalars interpolated at
//!    load time
//! 4. **`RADARR_API_KEY`** - fills the API key when it is still empty
//!
//! Exactly one file wins; candidates after the first hit are never
//! read. Unknown keys are skipped at every level so old and new
//! config files keep loading.
//!
//! ## Search order
//! - `<data dir>/local.yaml`
//! - `<data dir>/config.yaml`
//! - `config/local.yaml`
//! - `config/default.yaml`
//! - `/config/local.yaml`
//! - `/config/config.yaml`
//!
//! The data directory comes from `BOXARR_DATA_DIRECTORY` (default
//! `config`).

mod interp;
mod loader;
mod merge;
mod store;
mod types;

pub use interp::interpolate;
pub use loader::{candidate_paths, data_directory, load_document};
pub use merge::apply_document;
pub use store::{SettingsStore, settings, shared};
pub use types::*;
