//! Configuration loading for ink.
//! Merges a global defaults file with a user override file and resolves
//! dotted keys such as `app.servers.0.host` against the result.

use crate::error::{Error, Result};
use crate::locate::Layout;
use log::debug;
use serde_yaml::{Mapping, Value};
use std::fs;
use std::path::{Path, PathBuf};

/// Anything able to produce the current configuration mapping.
///
/// Implementations are asked again on every lookup, so edits to the backing
/// files show up without restarting.
pub trait ConfigSource {
    fn load(&self) -> Result<Mapping>;
}

/// A fixed configuration snapshot.
impl ConfigSource for Mapping {
    fn load(&self) -> Result<Mapping> {
        Ok(self.clone())
    }
}

/// File-backed configuration service.
///
/// One instance is built at startup and passed to whatever needs it.
#[derive(Debug, Clone)]
pub struct Config {
    global: PathBuf,
    user: PathBuf,
}

impl Config {
    pub fn new<G: Into<PathBuf>, U: Into<PathBuf>>(global: G, user: U) -> Self {
        Self { global: global.into(), user: user.into() }
    }

    /// Uses the default file locations of `layout`.
    pub fn from_layout(layout: &Layout) -> Self {
        Self::new(layout.config_global(), layout.config_user())
    }

    pub fn global_path(&self) -> &Path {
        &self.global
    }

    pub fn user_path(&self) -> &Path {
        &self.user
    }

    /// Loads the configuration and resolves a dotted key in it.
    ///
    /// # Errors
    /// * `Error::KeyInvalid` if the key does not resolve
    /// * Any error raised by [`ConfigSource::load`]
    pub fn lookup(&self, key: &str) -> Result<Value> {
        let config = Value::Mapping(self.load()?);
        resolve_dotted(&config, key)
    }
}

impl ConfigSource for Config {
    /// Reads both files and merges them key-by-key at the top level.
    ///
    /// The global file is required; a missing user file counts as empty.
    fn load(&self) -> Result<Mapping> {
        let mut merged = read_mapping(&self.global)?;
        if self.user.exists() {
            for (key, value) in read_mapping(&self.user)? {
                merged.insert(key, value);
            }
        } else {
            debug!("No user configuration at {}", self.user.display());
        }
        Ok(merged)
    }
}

fn read_mapping(path: &Path) -> Result<Mapping> {
    debug!("Loading configuration from {}", path.display());
    let content = fs::read_to_string(path)?;
    match serde_yaml::from_str::<Value>(&content)? {
        Value::Mapping(map) => Ok(map),
        Value::Null => Ok(Mapping::new()),
        _ => Err(Error::ConfigError(format!(
            "{} must contain a mapping at the top level",
            path.display()
        ))),
    }
}

/// Walks `value` along the dot-separated segments of `key`.
///
/// Each segment is first tried literally as a mapping key, then as an
/// integer: a sequence index (negative counts from the end) or an integer
/// mapping key. Strings are never descended into.
///
/// # Errors
/// * `Error::KeyInvalid` if any segment fails to resolve
pub fn resolve_dotted(value: &Value, key: &str) -> Result<Value> {
    let invalid = || Error::KeyInvalid { key: key.to_string() };

    let mut current = value;
    for segment in key.split('.') {
        if current.is_string() {
            return Err(invalid());
        }
        current = match current.get(segment) {
            Some(found) => found,
            None => {
                let index: i64 = segment.parse().map_err(|_| invalid())?;
                lookup_index(current, index).ok_or_else(invalid)?
            }
        };
    }
    Ok(current.clone())
}

fn lookup_index(value: &Value, index: i64) -> Option<&Value> {
    match value {
        Value::Sequence(items) => {
            let len = i64::try_from(items.len()).ok()?;
            let position = if index < 0 { index + len } else { index };
            usize::try_from(position).ok().and_then(|position| items.get(position))
        }
        Value::Mapping(map) => map.get(&Value::Number(index.into())),
        _ => None,
    }
}
