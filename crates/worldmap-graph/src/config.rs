//! Map configuration.
//!
//! Every field has a default, so a config file only needs the keys it
//! changes. Visual layer toggles never affect data or layout.

use crate::error::{WorldMapError, WorldMapResult};
use serde::{Deserialize, Serialize};

/// Default world pixels per grid cell.
pub const DEFAULT_CELL_SIZE: f32 = 40.0;

/// Hard upper zoom bound.
pub const DEFAULT_MAX_ZOOM: f32 = 2.0;

/// Zoom factor per wheel notch.
pub const DEFAULT_ZOOM_STEP: f32 = 1.1;

/// Independently switchable visual layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerToggles {
    /// Soft radial aura behind each zone.
    pub zone_glow: bool,
    /// Dashed zone bounding outline.
    pub zone_outline: bool,
    /// Zone name labels (above the label zoom threshold).
    pub zone_labels: bool,
    /// Glow beneath room glyphs at high zoom.
    pub room_glow: bool,
}

impl Default for LayerToggles {
    fn default() -> Self {
        Self {
            zone_glow: true,
            zone_outline: true,
            zone_labels: true,
            room_glow: true,
        }
    }
}

/// Complete map configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub layers: LayerToggles,
    /// World pixels per grid cell, horizontally.
    pub cell_width: f32,
    /// World pixels per grid cell, vertically.
    pub cell_height: f32,
    /// Content API base URL.
    pub api_base_url: String,
    pub max_zoom: f32,
    /// Multiplicative zoom per wheel notch (> 1).
    pub zoom_step: f32,
    /// Screen pixels added around the viewport before culling.
    pub cull_buffer_px: f32,
    /// Seconds after the last pan/zoom during which interaction counts as active.
    pub interaction_cooldown_secs: f64,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            layers: LayerToggles::default(),
            cell_width: DEFAULT_CELL_SIZE,
            cell_height: DEFAULT_CELL_SIZE,
            api_base_url: "http://localhost:4000".to_string(),
            max_zoom: DEFAULT_MAX_ZOOM,
            zoom_step: DEFAULT_ZOOM_STEP,
            cull_buffer_px: 100.0,
            interaction_cooldown_secs: 0.15,
        }
    }
}

impl MapConfig {
    /// Parse and validate a YAML config.
    pub fn from_yaml_str(src: &str) -> WorldMapResult<Self> {
        let config: Self =
            serde_yaml::from_str(src).map_err(|e| WorldMapError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a JSON config.
    pub fn from_json_str(src: &str) -> WorldMapResult<Self> {
        let config: Self =
            serde_json::from_str(src).map_err(|e| WorldMapError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read a config file; `.json` is parsed as JSON, anything else as YAML.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_path(path: &std::path::Path) -> WorldMapResult<Self> {
        let src = std::fs::read_to_string(path)
            .map_err(|e| WorldMapError::Config(format!("{}: {}", path.display(), e)))?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&src),
            _ => Self::from_yaml_str(&src),
        }
    }

    pub fn validate(&self) -> WorldMapResult<()> {
        if !(self.cell_width > 0.0 && self.cell_height > 0.0) {
            return Err(WorldMapError::Config(format!(
                "cell size must be positive, got {}x{}",
                self.cell_width, self.cell_height
            )));
        }
        if !(self.zoom_step > 1.0) {
            return Err(WorldMapError::Config(format!(
                "zoom_step must be > 1, got {}",
                self.zoom_step
            )));
        }
        if !(self.max_zoom > 0.0) {
            return Err(WorldMapError::Config(format!(
                "max_zoom must be positive, got {}",
                self.max_zoom
            )));
        }
        if self.cull_buffer_px < 0.0 || self.interaction_cooldown_secs < 0.0 {
            return Err(WorldMapError::Config(
                "cull buffer and cooldown must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = MapConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_zoom, 2.0);
        assert!(config.layers.zone_glow);
        assert!(config.layers.room_glow);
    }

    #[test]
    fn yaml_partial_override() {
        let config = MapConfig::from_yaml_str(
            "cell_width: 32\nlayers:\n  zone_glow: false\n  room_glow: false\n",
        )
        .unwrap();
        assert_eq!(config.cell_width, 32.0);
        assert_eq!(config.cell_height, DEFAULT_CELL_SIZE);
        assert!(!config.layers.zone_glow);
        assert!(config.layers.zone_outline);
        assert!(!config.layers.room_glow);
    }

    #[test]
    fn json_config() {
        let config = MapConfig::from_json_str(r#"{"zoom_step": 1.25}"#).unwrap();
        assert_eq!(config.zoom_step, 1.25);
    }

    #[test]
    fn invalid_config_rejected() {
        assert!(matches!(
            MapConfig::from_yaml_str("cell_width: 0"),
            Err(WorldMapError::Config(_))
        ));
        assert!(matches!(
            MapConfig::from_json_str(r#"{"zoom_step": 0.9}"#),
            Err(WorldMapError::Config(_))
        ));
        assert!(MapConfig::from_yaml_str("cell_width: [").is_err());
    }

    #[test]
    fn missing_file_is_config_error() {
        let err = MapConfig::from_path(std::path::Path::new("/nonexistent/map.yaml")).unwrap_err();
        assert!(matches!(err, WorldMapError::Config(_)));
        assert!(!err.is_recoverable());
    }
}
