//! Router configuration, loaded from TOML

use crate::joystick::JoystickSettings;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info, Level};

const CONFIG_DIR: &str = "input-router";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to access config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct RouterConfig {
    /// Joystick sampling period of the demo loop.
    pub poll_interval_ms: u64,
    pub log_level: String,
    pub joystick: JoystickSettings,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 16,
            log_level: "info".to_string(),
            joystick: JoystickSettings::default(),
        }
    }
}

impl RouterConfig {
    /// `<config dir>/input-router/config.toml`, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        debug!("Loaded config from {}: {:?}", path.display(), config);
        Ok(config)
    }

    /// Loads `path`, or the default path when `None`.
    ///
    /// A missing file yields the defaults; a broken one is an error.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path.map(Path::to_path_buf).or_else(Self::default_path) else {
            info!("No config directory available, using default config");
            return Ok(Self::default());
        };
        match Self::load(&path) {
            Err(ConfigError::Io { source, .. }) if source.kind() == ErrorKind::NotFound => {
                info!("No config at {}, using default config", path.display());
                Ok(Self::default())
            }
            other => other,
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let io_error = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).map_err(io_error)?;
        info!("Saved config to {}", path.display());
        Ok(())
    }

    pub fn level(&self) -> Result<Level, ConfigError> {
        Level::from_str(&self.log_level)
            .map_err(|_| ConfigError::Invalid(format!("unknown log level {:?}", self.log_level)))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.level()?;
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid("poll_interval_ms must be positive".to_string()));
        }
        let joystick = &self.joystick;
        if joystick.precision_epsilon.is_nan() || joystick.precision_epsilon < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "precision_epsilon must not be negative, got {}",
                joystick.precision_epsilon
            )));
        }
        let deadzones = std::iter::once(("default".to_string(), joystick.default_deadzone)).chain(
            joystick
                .deadzones
                .iter()
                .map(|entry| (entry.axis.to_string(), entry.deadzone)),
        );
        for (axis, deadzone) in deadzones {
            if !(0.0..1.0).contains(&deadzone) {
                return Err(ConfigError::Invalid(format!(
                    "deadzone for {} must be in [0, 1), got {}",
                    axis, deadzone
                )));
            }
        }
        Ok(())
    }
}
