//! Persisted settings for the desktop shell.
//!
//! The settings document is a flat JSON object with camelCase keys.
//! Missing keys fall back to defaults and a broken file never stops the
//! app from starting.

pub mod error;
pub mod instances;
pub mod settings;
pub mod store;

pub use error::SettingsError;
pub use instances::InstanceRegistry;
pub use settings::Settings;
pub use store::{SettingsStore, default_settings_path};
