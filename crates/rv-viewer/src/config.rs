//! Viewer configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Configuration for a viewer instance, persisted as RON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewerConfig {
    /// Up-axis specifier, e.g. "+Y", "-Z", "z".
    pub up_axis: String,
    /// Whether the shadow ground plane is displayed and repositioned.
    pub show_shadow: bool,
    /// Render tick interval in milliseconds.
    pub tick_interval_ms: u64,
    /// Color for geometry without a material (RGBA).
    pub default_color: [f32; 4],
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            up_axis: "+Y".to_string(),
            show_shadow: true,
            tick_interval_ms: 16,
            default_color: [0.7, 0.7, 0.7, 1.0],
        }
    }
}

/// Configuration error types.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Serialization error: {0}")]
    Serialize(String),
    #[error("Deserialization error: {0}")]
    Deserialize(String),
}

impl ViewerConfig {
    /// Loads configuration from a RON file, falling back to defaults when
    /// the file is missing or unreadable.
    pub fn load_or_default(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match ron::from_str(&content) {
                Ok(config) => {
                    tracing::info!("Loaded viewer config from {:?}", path);
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse viewer config: {}", e);
                    Self::default()
                }
            },
            Err(_) => {
                tracing::info!("No viewer config at {:?}, using defaults", path);
                Self::default()
            }
        }
    }

    /// Saves configuration as pretty-printed RON.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Io(e.to_string()))?;
        }

        let content = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| ConfigError::Serialize(e.to_string()))?;

        std::fs::write(path, &content).map_err(|e| ConfigError::Io(e.to_string()))?;
        Ok(())
    }
}
