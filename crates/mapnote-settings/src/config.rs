//! Configuration structures and file I/O.
//!
//! Every section has serde defaults, so a config file only needs the keys
//! it changes. The geocoding token can also come from the environment.

use mapnote_core::constants::{
    CAPTURE_SETTLE_DELAY_MS, FIT_PADDING_PX, LIVE_UPDATE_DEBOUNCE_MS, MIN_SEARCH_QUERY_LEN,
    PLACEHOLDER_HEIGHT, PLACEHOLDER_WIDTH, SEARCH_DEBOUNCE_MS, SEARCH_RESULT_LIMIT, SEARCH_ZOOM,
};
use mapnote_core::BoundingBox;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{SettingsError, SettingsResult};

/// Environment variable that overrides `geocoding.access_token`.
pub const TOKEN_ENV_VAR: &str = "MAPNOTE_GEOCODING_TOKEN";

/// Geocoding provider settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocodingSettings {
    /// Provider base URL, without trailing slash.
    pub base_url: String,
    /// Provider access token. Without one, resolution reports
    /// "geocoding not configured".
    pub access_token: Option<String>,
    /// Result types requested for reverse lookups.
    pub reverse_types: String,
    /// Result limit for reverse lookups.
    pub reverse_limit: usize,
}

impl Default for GeocodingSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.mapbox.com".to_string(),
            access_token: None,
            reverse_types: "address".to_string(),
            reverse_limit: 1,
        }
    }
}

/// Region that search results are confined to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionSettings {
    /// `[west, south, east, north]` hint sent with every query.
    pub bbox: [f64; 4],
    /// Short region code matched against result context, e.g. `US-MN`.
    pub region_code: String,
    /// Region name matched against result context, e.g. `Minnesota`.
    pub region_name: String,
}

impl Default for RegionSettings {
    fn default() -> Self {
        Self {
            bbox: [-97.2392, 43.4994, -89.4919, 49.3845],
            region_code: "US-MN".to_string(),
            region_name: "Minnesota".to_string(),
        }
    }
}

impl RegionSettings {
    pub fn bounding_box(&self) -> BoundingBox {
        let [west, south, east, north] = self.bbox;
        BoundingBox::new(west, south, east, north)
    }
}

/// Location search settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Quiet period after the last keystroke (ms).
    pub debounce_ms: u64,
    /// Shorter queries clear suggestions without a request.
    pub min_query_len: usize,
    /// Suggestions requested per query.
    pub limit: usize,
    pub region: RegionSettings,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            debounce_ms: SEARCH_DEBOUNCE_MS,
            min_query_len: MIN_SEARCH_QUERY_LEN,
            limit: SEARCH_RESULT_LIMIT,
            region: RegionSettings::default(),
        }
    }
}

impl SearchSettings {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// Drawing settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrawingSettings {
    /// Quiet period before a live polygon edit is committed (ms).
    pub live_update_debounce_ms: u64,
}

impl Default for DrawingSettings {
    fn default() -> Self {
        Self {
            live_update_debounce_ms: LIVE_UPDATE_DEBOUNCE_MS,
        }
    }
}

impl DrawingSettings {
    pub fn live_update_debounce(&self) -> Duration {
        Duration::from_millis(self.live_update_debounce_ms)
    }
}

/// Preview capture settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureSettings {
    /// Delay between the engine going idle and the pixel read (ms).
    pub settle_delay_ms: u64,
    pub placeholder_width: u32,
    pub placeholder_height: u32,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            settle_delay_ms: CAPTURE_SETTLE_DELAY_MS,
            placeholder_width: PLACEHOLDER_WIDTH,
            placeholder_height: PLACEHOLDER_HEIGHT,
        }
    }
}

impl CaptureSettings {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

/// Camera settings for overlays
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlaySettings {
    /// Padding when fitting to a polygon (px).
    pub fit_padding_px: f64,
    /// Zoom level after selecting a search suggestion.
    pub search_zoom: f64,
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            fit_padding_px: FIT_PADDING_PX,
            search_zoom: SEARCH_ZOOM,
        }
    }
}

/// Complete editor configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub geocoding: GeocodingSettings,
    pub search: SearchSettings,
    pub drawing: DrawingSettings,
    pub capture: CaptureSettings,
    pub overlay: OverlaySettings,
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Platform config file location, e.g. `~/.config/mapnote/config.toml`.
    pub fn default_path() -> SettingsResult<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("mapnote").join("config.toml"))
            .ok_or_else(|| {
                SettingsError::ConfigDirectory("no platform config directory".to_string())
            })
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let content = std::fs::read_to_string(path)?;

        let config: Self = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content)?
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            toml::from_str(&content)?
        } else {
            return Err(unsupported(path));
        };

        config.validate()?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load from the default path, or defaults when no file exists there.
    pub fn load_or_default() -> SettingsResult<Self> {
        let path = Self::default_path()?;
        if path.exists() {
            Self::load_from_file(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::to_string_pretty(self)?
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            toml::to_string_pretty(self)?
        } else {
            return Err(unsupported(path));
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Applies `MAPNOTE_GEOCODING_TOKEN` when set and non-empty.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(token) = std::env::var(TOKEN_ENV_VAR) {
            self.apply_token_override(&token);
        }
    }

    fn apply_token_override(&mut self, token: &str) {
        let token = token.trim();
        if !token.is_empty() {
            self.geocoding.access_token = Some(token.to_string());
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> SettingsResult<()> {
        if self.geocoding.base_url.trim().is_empty() {
            return Err(SettingsError::invalid("geocoding.base_url", "must not be empty"));
        }
        if self.geocoding.reverse_limit == 0 {
            return Err(SettingsError::invalid("geocoding.reverse_limit", "must be > 0"));
        }

        if self.search.debounce_ms == 0 {
            return Err(SettingsError::invalid("search.debounce_ms", "must be > 0"));
        }
        if self.search.min_query_len == 0 {
            return Err(SettingsError::invalid("search.min_query_len", "must be > 0"));
        }
        if self.search.limit == 0 {
            return Err(SettingsError::invalid("search.limit", "must be > 0"));
        }
        let [west, south, east, north] = self.search.region.bbox;
        if !(west < east && south < north) {
            return Err(SettingsError::invalid(
                "search.region.bbox",
                "must be [west, south, east, north] with west < east and south < north",
            ));
        }

        if self.drawing.live_update_debounce_ms == 0 {
            return Err(SettingsError::invalid(
                "drawing.live_update_debounce_ms",
                "must be > 0",
            ));
        }

        if self.capture.placeholder_width == 0 || self.capture.placeholder_height == 0 {
            return Err(SettingsError::invalid(
                "capture.placeholder",
                "dimensions must be > 0",
            ));
        }

        let padding = self.overlay.fit_padding_px;
        if padding.is_nan() || padding < 0.0 {
            return Err(SettingsError::invalid("overlay.fit_padding_px", "must be >= 0"));
        }

        Ok(())
    }
}

fn unsupported(path: &Path) -> SettingsError {
    SettingsError::UnsupportedFormat(
        path.extension()
            .map(|ext| ext.to_string_lossy().into_owned())
            .unwrap_or_else(|| "(none)".to_string()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.search.debounce(), Duration::from_millis(300));
        assert_eq!(
            config.drawing.live_update_debounce(),
            Duration::from_millis(100)
        );
        assert_eq!(config.search.min_query_len, 2);
        assert_eq!(config.geocoding.reverse_limit, 1);
    }

    #[test]
    fn test_validate_rejects_inverted_bbox() {
        let mut config = Config::default();
        config.search.region.bbox = [-89.0, 43.0, -97.0, 49.0];
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("search.region.bbox"));
    }

    #[test]
    fn test_validate_rejects_zero_min_query() {
        let mut config = Config::default();
        config.search.min_query_len = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_token_override() {
        let mut config = Config::default();
        config.apply_token_override("   ");
        assert!(config.geocoding.access_token.is_none());
        config.apply_token_override(" pk.abc ");
        assert_eq!(config.geocoding.access_token.as_deref(), Some("pk.abc"));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str("[search]\nlimit = 8\n").unwrap();
        assert_eq!(config.search.limit, 8);
        assert_eq!(config.search.debounce_ms, 300);
        assert_eq!(config.search.region.region_code, "US-MN");
    }
}
