//! # vigia-settings
//!
//! Configuration management with layered sources for the Vigia backend.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults** — [`VigiaSettings::default()`]
//! 2. **User file** — `~/.vigia/settings.json` (deep-merged over defaults)
//! 3. **Environment variables** — `VIGIA_*` overrides (highest priority)
//!
//! # Usage
//!
//! ```no_run
//! use vigia_settings::{get_settings, VigiaSettings};
//!
//! let settings = get_settings();
//! println!("HTTP port: {}", settings.server.port);
//! ```

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{deep_merge, load_settings, load_settings_from_path, settings_path};
pub use types::*;

use std::sync::OnceLock;

/// Global settings singleton.
///
/// Initialized on first access via [`get_settings`]. The settings are loaded
/// from `~/.vigia/settings.json` with env var overrides, or fall back to
/// compiled defaults if loading fails.
static SETTINGS: OnceLock<VigiaSettings> = OnceLock::new();

/// Get the global settings instance.
///
/// On first call, loads settings from `~/.vigia/settings.json` with env var
/// overrides. On subsequent calls, returns the cached value. If loading
/// fails, returns compiled defaults.
pub fn get_settings() -> &'static VigiaSettings {
    SETTINGS.get_or_init(|| load_settings().unwrap_or_default())
}

/// Initialize the global settings with a specific value.
///
/// # Errors
///
/// Returns the provided settings back if the global was already initialized.
#[allow(clippy::result_large_err)]
pub fn init_settings(settings: VigiaSettings) -> std::result::Result<(), VigiaSettings> {
    SETTINGS.set(settings)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
