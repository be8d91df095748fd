//! Engine configuration
//!
//! Tunable constants of the canvas engine: page gap, creation thresholds,
//! default text box geometry, duplicate offset and zoom limits. Configuration
//! can be loaded from a JSON file, environment variables, or created
//! programmatically.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Configuration for the canvas engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Vertical gap between stacked pages, in document units
    pub page_gap: f32,
    /// Minimum width and height of a dragged-out shape
    pub min_shape_size: f32,
    /// Width of the editor box opened for new text
    pub default_text_width: f32,
    /// New text box height as a multiple of the font size
    pub text_line_height_factor: f32,
    /// Offset applied to duplicated and pasted elements (both axes)
    pub duplicate_offset: f32,
    pub default_font_size: f32,
    pub default_font_family: String,
    pub default_stroke_width: f32,
    pub min_zoom: f32,
    pub max_zoom: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            page_gap: 20.0,
            min_shape_size: 5.0,
            default_text_width: 200.0,
            text_line_height_factor: 1.5,
            duplicate_offset: 20.0,
            default_font_size: 16.0,
            default_font_family: "Arial".to_string(),
            default_stroke_width: 2.0,
            min_zoom: 0.25,
            max_zoom: 4.0,
        }
    }
}

impl EngineConfig {
    /// Sets the inter-page gap.
    pub fn with_page_gap(mut self, gap: f32) -> Self {
        self.page_gap = gap.max(0.0);
        self
    }

    /// Sets the minimum accepted shape size.
    pub fn with_min_shape_size(mut self, size: f32) -> Self {
        self.min_shape_size = size.max(0.0);
        self
    }

    /// Sets the duplicate/paste offset.
    pub fn with_duplicate_offset(mut self, offset: f32) -> Self {
        self.duplicate_offset = offset;
        self
    }

    /// Sets the default font size for new text.
    pub fn with_default_font_size(mut self, size: f32) -> Self {
        self.default_font_size = size;
        self
    }

    /// Sets the zoom limits.
    pub fn with_zoom_range(mut self, min: f32, max: f32) -> Self {
        self.min_zoom = min.min(max);
        self.max_zoom = max.max(min);
        self
    }

    /// Clamp a requested zoom factor into the configured range
    pub fn clamp_zoom(&self, zoom: f32) -> f32 {
        if zoom.is_finite() {
            zoom.clamp(self.min_zoom, self.max_zoom)
        } else {
            1.0_f32.clamp(self.min_zoom, self.max_zoom)
        }
    }

    /// Returns the default configuration file location.
    ///
    /// - macOS: ~/Library/Application Support/pdf-canvas/config.json
    /// - Linux: ~/.config/pdf-canvas/config.json
    /// - Windows: %APPDATA%\pdf-canvas\config.json
    pub fn default_config_path() -> PathBuf {
        if let Some(config_dir) = dirs::config_dir() {
            config_dir.join("pdf-canvas").join("config.json")
        } else {
            PathBuf::from("pdf-canvas.json")
        }
    }

    /// Loads configuration from environment variables.
    ///
    /// Environment variables:
    /// - `PDF_CANVAS_PAGE_GAP`: inter-page gap (default: 20)
    /// - `PDF_CANVAS_MIN_SHAPE_SIZE`: minimum shape size (default: 5)
    /// - `PDF_CANVAS_DUPLICATE_OFFSET`: duplicate/paste offset (default: 20)
    /// - `PDF_CANVAS_DEFAULT_FONT_SIZE`: font size for new text (default: 16)
    ///
    /// # Errors
    /// Returns an error if any environment variable contains an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_env_overrides()
    }

    /// Apply environment overrides on top of this configuration.
    pub fn with_env_overrides(mut self) -> Result<Self, ConfigError> {
        if let Some(val) = env_f32("PDF_CANVAS_PAGE_GAP")? {
            self.page_gap = val;
        }
        if let Some(val) = env_f32("PDF_CANVAS_MIN_SHAPE_SIZE")? {
            self.min_shape_size = val;
        }
        if let Some(val) = env_f32("PDF_CANVAS_DUPLICATE_OFFSET")? {
            self.duplicate_offset = val;
        }
        if let Some(val) = env_f32("PDF_CANVAS_DEFAULT_FONT_SIZE")? {
            self.default_font_size = val;
        }
        self.validate()?;
        Ok(self)
    }

    /// Loads configuration from a JSON file. Missing keys take their defaults.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Saves configuration to a JSON file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be written.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path.as_ref(), json)?;
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.page_gap.is_finite() && self.page_gap >= 0.0) {
            return Err(ConfigError::InvalidValue("page_gap".to_string()));
        }
        if !(self.min_shape_size.is_finite() && self.min_shape_size >= 0.0) {
            return Err(ConfigError::InvalidValue("min_shape_size".to_string()));
        }
        if !(self.default_font_size.is_finite() && self.default_font_size > 0.0) {
            return Err(ConfigError::InvalidValue("default_font_size".to_string()));
        }
        if !(self.min_zoom > 0.0 && self.min_zoom <= self.max_zoom) {
            return Err(ConfigError::InvalidValue("min_zoom".to_string()));
        }
        Ok(())
    }
}

fn env_f32(key: &str) -> Result<Option<f32>, ConfigError> {
    match std::env::var(key) {
        Ok(val) => val
            .trim()
            .parse::<f32>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        Err(_) => Ok(None),
    }
}

/// Errors that can occur during configuration operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Invalid value for a configuration parameter
    #[error("invalid value for configuration key: {0}")]
    InvalidValue(String),
    /// I/O error reading or writing configuration file
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("malformed configuration: {0}")]
    Parse(#[from] serde_json::Error),
}
