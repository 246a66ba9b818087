//! Viewer configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use xrviewer_session::BusyPolicy;

use crate::error::CoreError;
use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path to the consent database; `None` keeps consent in memory only
    pub database_path: Option<PathBuf>,
    /// Handling of permission requests that arrive while a dialog is open
    pub busy_policy: BusyPolicy,
}

impl Config {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            database_path: Some(data_dir.join("xrviewer.db")),
            busy_policy: BusyPolicy::default(),
        }
    }

    /// Consent lives for the lifetime of the process
    pub fn in_memory() -> Self {
        Self {
            database_path: None,
            busy_policy: BusyPolicy::default(),
        }
    }

    pub fn data_dir() -> PathBuf {
        dirs::data_local_dir()
            .map(|d| d.join("XRViewer"))
            .unwrap_or_else(|| PathBuf::from(".xrviewer"))
    }

    /// Read a JSON config file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        serde_json::from_str(&contents)
            .map_err(|e| CoreError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Self::data_dir())
    }
}

mod dirs {
    use std::path::PathBuf;

    pub fn data_local_dir() -> Option<PathBuf> {
        #[cfg(target_os = "windows")]
        {
            std::env::var("LOCALAPPDATA").ok().map(PathBuf::from)
        }
        #[cfg(target_os = "macos")]
        {
            std::env::var("HOME")
                .ok()
                .map(|h| PathBuf::from(h).join("Library/Application Support"))
        }
        #[cfg(target_os = "linux")]
        {
            std::env::var("XDG_DATA_HOME")
                .ok()
                .map(PathBuf::from)
                .or_else(|| {
                    std::env::var("HOME")
                        .ok()
                        .map(|h| PathBuf::from(h).join(".local/share"))
                })
        }
        #[cfg(not(any(target_os = "windows", target_os = "macos", target_os = "linux")))]
        {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_places_database_in_data_dir() {
        let config = Config::new(PathBuf::from("/tmp/xr"));
        assert_eq!(config.database_path, Some(PathBuf::from("/tmp/xr/xrviewer.db")));
        assert_eq!(config.busy_policy, BusyPolicy::Queue);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = Config {
            busy_policy: BusyPolicy::Reject,
            ..Config::new(dir.path().to_path_buf())
        };
        config.save(&path).unwrap();

        assert_eq!(Config::load(&path).unwrap(), config);
    }

    #[test]
    fn test_load_partial_and_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        std::fs::write(&path, r#"{ "busy_policy": "reject" }"#).unwrap();
        let config = Config::load(&path).unwrap();
        assert_eq!(config.busy_policy, BusyPolicy::Reject);
        assert!(config.database_path.is_some());

        std::fs::write(&path, r#"{ "busy_policy": "sometimes" }"#).unwrap();
        assert!(matches!(Config::load(&path), Err(CoreError::Config(_))));
    }
}
