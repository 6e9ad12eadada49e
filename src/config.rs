use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::components::lighting::{DEFAULT_RANGE, MIN_RANGE};
use crate::components::{LightKind, LightSettings, ReflectMode};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config value: {0}")]
    Invalid(String),
}

/// Configuration loaded from a TOML file. Every section is optional.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct LumiereConfig {
    #[serde(default)]
    pub light: LightConfig,
    #[serde(default)]
    pub sun: SunConfig,
    #[serde(default)]
    pub camera: CameraConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LightConfig {
    #[serde(default = "default_range")]
    pub range: f64,
    #[serde(default)]
    pub reflect_mode: ReflectMode,
    #[serde(default)]
    pub kind: LightKind,
}

fn default_range() -> f64 {
    DEFAULT_RANGE
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            range: DEFAULT_RANGE,
            reflect_mode: ReflectMode::default(),
            kind: LightKind::default(),
        }
    }
}

impl LightConfig {
    pub fn settings(&self) -> LightSettings {
        LightSettings {
            range: self.range,
            reflect_mode: self.reflect_mode,
            target: None,
            kind: self.kind,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SunConfig {
    pub latitude: f64,
    pub longitude: f64,
    /// Distance of the sun lamp from the scene origin.
    pub distance: f64,
}

impl Default for SunConfig {
    fn default() -> Self {
        // Paris
        Self {
            latitude: 48.87,
            longitude: 2.67,
            distance: 10.0,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct CameraConfig {
    pub position: [f64; 3],
    pub target: [f64; 3],
    /// Vertical field of view in degrees.
    pub fov: f64,
    pub viewport: [f64; 2],
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: [0.0, -9.0, 5.0],
            target: [0.0, 0.0, 1.5],
            fov: 45.0,
            viewport: [1280.0, 720.0],
        }
    }
}

impl LumiereConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&text)?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.light.range.is_nan() || self.light.range < MIN_RANGE {
            return Err(ConfigError::Invalid(format!(
                "light.range must be at least {MIN_RANGE}, got {}",
                self.light.range
            )));
        }
        let [w, h] = self.camera.viewport;
        if !(w > 0.0 && h > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "camera.viewport must be positive, got {w}x{h}"
            )));
        }
        if !(self.camera.fov > 0.0 && self.camera.fov < 180.0) {
            return Err(ConfigError::Invalid(format!(
                "camera.fov must be within (0, 180), got {}",
                self.camera.fov
            )));
        }
        Ok(())
    }
}
