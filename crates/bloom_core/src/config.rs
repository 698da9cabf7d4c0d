//! On-disk core configuration.
//!
//! # Invariants
//! - A missing config file yields defaults; missing keys are defaulted and
//!   unknown keys ignored.
//! - `validate` rejects a zero autosave delay and unknown log levels.

use crate::logging::{default_log_level, LogLevel};
use directories::{ProjectDirs, UserDirs};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

const APP_QUALIFIER: &str = "app";
const APP_ORGANIZATION: &str = "bloom";
const APP_NAME: &str = "Bloom";
const CONFIG_FILE_NAME: &str = "config.json";
const PREFERENCES_FILE_NAME: &str = "preferences.json";
const STORAGE_DIR_NAME: &str = "Bloom";

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    Invalid(String),
    /// No platform config directory could be resolved.
    NoConfigDir,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "config I/O failed at `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "invalid config file `{}`: {source}", path.display())
            }
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
            Self::NoConfigDir => write!(f, "could not determine config directory"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::Invalid(_) | Self::NoConfigDir => None,
        }
    }
}

/// Core runtime settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Directory holding one `.bloom` file per document.
    pub storage_dir: PathBuf,
    /// Preference file; `None` means `preferences.json` inside `storage_dir`.
    pub preferences_file: Option<PathBuf>,
    /// Quiet period before autosave, in milliseconds.
    pub autosave_delay_ms: u64,
    pub log_level: String,
    /// Log directory; `None` means the platform data directory.
    pub log_dir: Option<PathBuf>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            storage_dir: default_storage_dir(),
            preferences_file: None,
            autosave_delay_ms: 1500,
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl CoreConfig {
    /// Platform config file location.
    pub fn default_path() -> ConfigResult<PathBuf> {
        project_dirs()
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Loads from the platform config file.
    pub fn load() -> ConfigResult<Self> {
        Self::load_from(&Self::default_path()?)
    }

    /// Loads and validates `path`; a missing file yields defaults.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        let config: Self = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let text = serde_json::to_string_pretty(self).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, text).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.autosave_delay_ms == 0 {
            return Err(ConfigError::Invalid(
                "autosave_delay_ms must be greater than zero".to_string(),
            ));
        }
        if LogLevel::parse(&self.log_level).is_none() {
            return Err(ConfigError::Invalid(format!(
                "unsupported log_level `{}`",
                self.log_level
            )));
        }
        if self.storage_dir.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("storage_dir cannot be empty".to_string()));
        }
        Ok(())
    }

    pub fn autosave_delay(&self) -> Duration {
        Duration::from_millis(self.autosave_delay_ms)
    }

    pub fn preferences_path(&self) -> PathBuf {
        self.preferences_file
            .clone()
            .unwrap_or_else(|| self.storage_dir.join(PREFERENCES_FILE_NAME))
    }

    /// Configured log directory, else the platform data directory, else
    /// `logs` under the storage directory.
    pub fn log_path(&self) -> PathBuf {
        if let Some(dir) = &self.log_dir {
            return dir.clone();
        }
        project_dirs()
            .map(|dirs| dirs.data_local_dir().join("logs"))
            .unwrap_or_else(|| self.storage_dir.join("logs"))
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
}

fn default_storage_dir() -> PathBuf {
    let Some(user_dirs) = UserDirs::new() else {
        return PathBuf::from(STORAGE_DIR_NAME);
    };
    user_dirs
        .document_dir()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| user_dirs.home_dir().join("Documents"))
        .join(STORAGE_DIR_NAME)
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, CoreConfig};
    use std::fs;
    use std::time::Duration;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = CoreConfig::load_from(&dir.path().join("absent.json")).expect("defaults");
        assert_eq!(config, CoreConfig::default());
        assert_eq!(config.autosave_delay(), Duration::from_millis(1500));
        assert!(config.storage_dir.ends_with("Bloom"));
    }

    #[test]
    fn partial_file_keeps_defaults_and_ignores_unknown_keys() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{"storage_dir": "/tmp/bloom-docs", "autosave_delay_ms": 300, "theme": "dark"}"#,
        )
        .expect("write config");

        let config = CoreConfig::load_from(&path).expect("valid config");
        assert_eq!(config.autosave_delay_ms, 300);
        assert_eq!(
            config.preferences_path(),
            std::path::Path::new("/tmp/bloom-docs").join("preferences.json")
        );
    }

    #[test]
    fn zero_delay_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"autosave_delay_ms": 0}"#).expect("write config");
        let err = CoreConfig::load_from(&path).expect_err("zero delay rejected");
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn save_then_load_preserves_values() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("config.json");
        let config = CoreConfig {
            log_level: "warn".to_string(),
            log_dir: Some(dir.path().join("logs")),
            ..CoreConfig::default()
        };
        config.save_to(&path).expect("save");
        assert_eq!(CoreConfig::load_from(&path).expect("load"), config);
    }
}
