//! Key/value preference storage port and adapters.
//!
//! # Invariants
//! - Keys and values are opaque strings; callers own their encoding.
//! - `JsonFilePreferenceStore` rewrites the whole file on every change.

use log::debug;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

pub type PreferenceResult<T> = Result<T, PreferenceError>;

/// Preference storage failure.
#[derive(Debug)]
pub enum PreferenceError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Backing file exists but is not a JSON object of strings.
    Corrupt {
        path: PathBuf,
        message: String,
    },
}

impl Display for PreferenceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "preference I/O failed at `{}`: {source}", path.display())
            }
            Self::Corrupt { path, message } => {
                write!(f, "preference file `{}` is corrupt: {message}", path.display())
            }
        }
    }
}

impl Error for PreferenceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Corrupt { .. } => None,
        }
    }
}

/// String key/value store standing in for browser-style local storage.
pub trait PreferenceStore: Send + Sync {
    fn get(&self, key: &str) -> PreferenceResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> PreferenceResult<()>;
    fn remove(&self, key: &str) -> PreferenceResult<()>;
}

impl<T: PreferenceStore + ?Sized> PreferenceStore for Arc<T> {
    fn get(&self, key: &str) -> PreferenceResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> PreferenceResult<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> PreferenceResult<()> {
        (**self).remove(key)
    }
}

#[derive(Debug, Default)]
pub struct MemoryPreferenceStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn get(&self, key: &str) -> PreferenceResult<Option<String>> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> PreferenceResult<()> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> PreferenceResult<()> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }
}

/// Preferences persisted as one flat JSON object on disk.
#[derive(Debug)]
pub struct JsonFilePreferenceStore {
    path: PathBuf,
    guard: Mutex<()>,
}

impl JsonFilePreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            guard: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> PreferenceResult<Map<String, Value>> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Map::new()),
            Err(source) => {
                return Err(PreferenceError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        if text.trim().is_empty() {
            return Ok(Map::new());
        }
        match serde_json::from_str::<Value>(&text) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(PreferenceError::Corrupt {
                path: self.path.clone(),
                message: "top-level value is not an object".to_string(),
            }),
            Err(err) => Err(PreferenceError::Corrupt {
                path: self.path.clone(),
                message: err.to_string(),
            }),
        }
    }

    fn write_all(&self, map: Map<String, Value>) -> PreferenceResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| PreferenceError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let text = Value::Object(map).to_string();
        fs::write(&self.path, text).map_err(|source| PreferenceError::Io {
            path: self.path.clone(),
            source,
        })?;
        debug!("event=prefs_write module=prefs status=ok");
        Ok(())
    }
}

impl PreferenceStore for JsonFilePreferenceStore {
    fn get(&self, key: &str) -> PreferenceResult<Option<String>> {
        let _guard = self.guard.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(match self.read_all()?.remove(key) {
            Some(Value::String(value)) => Some(value),
            _ => None,
        })
    }

    fn set(&self, key: &str, value: &str) -> PreferenceResult<()> {
        let _guard = self.guard.lock().unwrap_or_else(PoisonError::into_inner);
        let mut map = self.read_all()?;
        map.insert(key.to_string(), Value::String(value.to_string()));
        self.write_all(map)
    }

    fn remove(&self, key: &str) -> PreferenceResult<()> {
        let _guard = self.guard.lock().unwrap_or_else(PoisonError::into_inner);
        let mut map = self.read_all()?;
        if map.remove(key).is_none() {
            return Ok(());
        }
        self.write_all(map)
    }
}
