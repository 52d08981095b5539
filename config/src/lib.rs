//! Configuration for the WOPR decryptor.
//!
//! Raw user input lives in [`Options`] (every field optional, deserialized from
//! TOML or built in code). [`Options::resolve`] turns it into a [`Config`]
//! against the immutable [`DEFAULTS`], recovering from bad dates with
//! [`ResolveWarning`]s instead of failing.

mod options;
mod resolved;

pub use options::{
    AudioOptions, Options, ProbabilityOptions, StreamOptions, TimingOptions, UiOptions,
};
pub use resolved::{
    AudioConfig, Config, DEFAULT_CHARSET, DEFAULT_CODE, DEFAULT_DURATION, DEFAULT_TICK_INTERVAL,
    DEFAULTS, MAX_BLINK_DURATION, MAX_STREAM_EXTENT, ProbabilityConfig, ResolveWarning, Resolved,
    StreamConfig, TimingConfig, UiConfig, parse_instant,
};

use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl ConfigError {
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => path,
        }
    }
}

impl Options {
    /// Load `~/.wopr/config.toml`. `Ok(None)` when there is no file.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        let Some(path) = config_path() else {
            return Ok(None);
        };
        if !path.exists() {
            return Ok(None);
        }
        Self::load_from(&path).map(Some)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read config at {:?}: {}", path, err);
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
        };

        match toml::from_str(&content) {
            Ok(options) => Ok(options),
            Err(err) => {
                tracing::warn!("Failed to parse config at {:?}: {}", path, err);
                Err(ConfigError::Parse {
                    path: path.to_path_buf(),
                    source: err,
                })
            }
        }
    }
}

#[must_use]
pub fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".wopr"))
}

#[must_use]
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use wopr_types::Direction;

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "direction = \"random\"\ncycles = 4\n").unwrap();

        let options = Options::load_from(&path).unwrap();
        assert_eq!(options.direction, Some(Direction::Random));
        assert_eq!(options.cycles, Some(4));
    }

    #[test]
    fn missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let err = Options::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
        assert_eq!(err.path(), path.as_path());
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "cycles = \"many\"").unwrap();
        let err = Options::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("failed to parse config"));
    }

    #[test]
    fn config_path_is_under_dot_wopr() {
        if let Some(path) = config_path() {
            assert!(path.ends_with(".wopr/config.toml"));
        }
    }
}
