//! Settings persistence.
//! Reads and writes `Settings` as TOML in the platform config directory.

mod service;

pub use service::{project_dirs, SettingsService};
