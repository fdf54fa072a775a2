// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Quotio Store
//!
//! Persistence for the Quotio daemon: account credentials, configuration,
//! and the file-system layout they share.
//!
//! This crate provides:
//!
//! - **`AuthStore`**: one JSON file per account under `<config-dir>/auth/`,
//!   written atomically with an explicit fsync before rename.
//! - **`Config`**: the daemon's `<config-dir>/config.json` key/value document.
//! - **`persistence`**: shared file I/O helpers (secure directories, atomic
//!   JSON read/write) both of the above build on.
//! - **`keychain`**: system-keychain-backed storage for opaque API keys.

pub mod auth_store;
pub mod config;
pub mod error;
pub mod keychain;
pub mod persistence;

pub use auth_store::AuthStore;
pub use config::Config;
pub use error::StoreError;
pub use persistence::{
    default_cache_dir, default_cache_path, default_config_dir, default_settings_path,
    ensure_dir, load_json, load_json_or_default, save_json, save_json_fsync,
};

#[cfg(test)]
mod persistence_tests;
