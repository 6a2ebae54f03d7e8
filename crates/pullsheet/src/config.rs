//! Sheet configuration
//!
//! Every field has a default, so a TOML file only needs the values it
//! overrides:
//!
//! ```toml
//! dismissable = false
//! max_width = 600.0
//! sizes = [{ fixed = 320.0 }, "full_screen"]
//!
//! [overlay_color]
//! r = 0.0
//! g = 0.0
//! b = 0.0
//! a = 0.5
//!
//! [timing]
//! resize_ms = 250.0
//! ```

use std::fs;
use std::path::Path;

use pullsheet_core::{Result, SheetError, SheetSize};
use serde::{Deserialize, Serialize};

/// RGBA color, components in `[0, 1]`
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Gray level `white` with the given alpha
    pub const fn white(white: f32, alpha: f32) -> Self {
        Self::rgba(white, white, white, alpha)
    }

    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.a = alpha;
        self
    }
}

/// Size of the drag handle and the pull bar strip around it
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandleMetrics {
    pub width: f32,
    pub height: f32,
    pub top_inset: f32,
    pub bottom_inset: f32,
}

impl HandleMetrics {
    /// Height of the pull bar strip at the top of the sheet
    pub fn strip_height(&self) -> f32 {
        self.top_inset + self.height + self.bottom_inset
    }
}

impl Default for HandleMetrics {
    fn default() -> Self {
        Self {
            width: 50.0,
            height: 6.0,
            top_inset: 9.0,
            bottom_inset: 9.0,
        }
    }
}

/// Fixed animation durations in milliseconds
///
/// Drag releases compute their own duration from the release velocity.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timing {
    pub present_ms: f32,
    pub resize_ms: f32,
    pub restore_ms: f32,
    pub close_ms: f32,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            present_ms: 300.0,
            resize_ms: 200.0,
            restore_ms: 300.0,
            close_ms: 300.0,
        }
    }
}

/// Host-facing sheet configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetConfig {
    /// Whether the sheet may be dismissed by dragging down or tapping outside
    pub dismissable: bool,
    /// The sheet is centered and never wider than this
    pub max_width: f32,
    pub top_corner_radius: f32,
    pub handle_color: Color,
    /// Color of the dimming overlay behind the sheet
    pub overlay_color: Color,
    pub handle: HandleMetrics,
    pub timing: Timing,
    /// Initial snap points; empty means the sheet sizes itself to its content
    pub sizes: Vec<SheetSize>,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            dismissable: true,
            max_width: 540.0,
            top_corner_radius: 3.0,
            handle_color: Color::white(0.868, 1.0),
            overlay_color: Color::white(0.0, 0.7),
            handle: HandleMetrics::default(),
            timing: Timing::default(),
            sizes: Vec::new(),
        }
    }
}

impl SheetConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(input: &str) -> Result<Self> {
        toml::from_str(input).map_err(|e| SheetError::InvalidConfig(e.to_string()))
    }

    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), "loaded sheet config");
        Ok(config)
    }

    /// Serialize to a TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| SheetError::InvalidConfig(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SheetConfig::default();
        assert!(config.dismissable);
        assert_eq!(config.max_width, 540.0);
        assert_eq!(config.top_corner_radius, 3.0);
        assert_eq!(config.handle.strip_height(), 24.0);
        assert_eq!(config.overlay_color, Color::rgba(0.0, 0.0, 0.0, 0.7));
        assert!(config.sizes.is_empty());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = SheetConfig::from_toml_str(
            r#"
            dismissable = false
            sizes = [{ fixed = 320.0 }, "full_screen"]

            [timing]
            resize_ms = 250.0
            "#,
        )
        .unwrap();

        assert!(!config.dismissable);
        assert_eq!(config.sizes, vec![SheetSize::Fixed(320.0), SheetSize::FullScreen]);
        assert_eq!(config.timing.resize_ms, 250.0);
        assert_eq!(config.timing.close_ms, 300.0);
        assert_eq!(config.max_width, 540.0);
    }

    #[test]
    fn test_invalid_toml() {
        let err = SheetConfig::from_toml_str("dismissable = 3").unwrap_err();
        assert!(matches!(err, SheetError::InvalidConfig(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = SheetConfig::load(Path::new("/nonexistent/pullsheet.toml")).unwrap_err();
        assert!(matches!(err, SheetError::ConfigIo(_)));
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = SheetConfig {
            sizes: vec![SheetSize::Fixed(200.0)],
            ..Default::default()
        };
        let text = config.to_toml().unwrap();
        assert_eq!(SheetConfig::from_toml_str(&text).unwrap(), config);
    }
}
