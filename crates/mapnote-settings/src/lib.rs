//! Mapnote Settings Crate
//!
//! Editor configuration: provider endpoint and token, search region,
//! debounce periods, capture and overlay tuning. Loaded from TOML or JSON.

pub mod config;
pub mod error;

pub use config::{
    CaptureSettings, Config, DrawingSettings, GeocodingSettings, OverlaySettings, RegionSettings,
    SearchSettings, TOKEN_ENV_VAR,
};
pub use error::{SettingsError, SettingsResult};
