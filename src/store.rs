//! File-backed storage for the sunrise setting.
//!
//! The file holds a single line: `HH:MM`/`HHMM`, `demo` or `off`. Only the
//! first line is read; writes replace the whole file.

use crate::schedule::{ConfigError, SunriseConfig};
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Location used when `DAWN_CONFIG` is not set.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/dawn/dawn.conf";

/// Environment variable overriding the configuration file location.
pub const CONFIG_PATH_ENV: &str = "DAWN_CONFIG";

/// Errors reading or writing the configuration file.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("could not access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{} is not UTF-8 text", .path.display())]
    NotText {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid sunrise setting in {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ConfigError,
    },
}

/// The configuration file.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `$DAWN_CONFIG`, or [`DEFAULT_CONFIG_PATH`].
    pub fn from_env() -> Self {
        Self::from_var(std::env::var_os(CONFIG_PATH_ENV))
    }

    fn from_var(value: Option<OsString>) -> Self {
        match value {
            Some(path) if !path.is_empty() => Self::new(path),
            _ => Self::new(DEFAULT_CONFIG_PATH),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads and parses the first line.
    pub fn read(&self) -> Result<SunriseConfig, StoreError> {
        let content = fs::read_to_string(&self.path).map_err(|source| {
            let path = self.path.clone();
            match source.kind() {
                io::ErrorKind::InvalidData => StoreError::NotText { path, source },
                _ => StoreError::Io { path, source },
            }
        })?;

        let line = content.lines().next().unwrap_or_default();
        SunriseConfig::parse(line).map_err(|source| StoreError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    /// Replaces the file content with `value`, verbatim.
    ///
    /// The value is not validated; a bad value shows up on the next read.
    pub fn write(&self, value: &str) -> Result<(), StoreError> {
        fs::write(&self.path, value).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_defaults_when_unset_or_empty() {
        let unset = ConfigStore::from_var(None);
        let empty = ConfigStore::from_var(Some(OsString::new()));
        assert_eq!(unset.path(), Path::new(DEFAULT_CONFIG_PATH));
        assert_eq!(empty.path(), Path::new(DEFAULT_CONFIG_PATH));
    }

    #[test]
    fn path_override_is_used() {
        let store = ConfigStore::from_var(Some(OsString::from("/tmp/sunrise.conf")));
        assert_eq!(store.path(), Path::new("/tmp/sunrise.conf"));
    }
}
