// Application settings.
//
// Settings file: `<config dir>/license-keeper/config.json`
// Default store: `<data dir>/license-keeper/licenses.db`

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Folder name used under the platform config/data directories
pub const APP_DIR: &str = "license-keeper";

/// Environment variable that overrides the database location
pub const DB_ENV_VAR: &str = "LICENSE_KEEPER_DB";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to access settings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse settings file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Settings persisted between runs
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Catalog database location; the platform data dir when unset
    pub database_path: Option<PathBuf>,
    /// Folder the export dialog opens in; updated after each export
    pub export_dir: Option<PathBuf>,
}

/// `<data dir>/license-keeper`
fn data_root() -> PathBuf {
    dirs::data_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

impl AppConfig {
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.json"))
    }

    /// Load the settings file. Missing or unreadable files give defaults.
    pub fn load() -> Self {
        let Some(path) = Self::config_path().filter(|p| p.exists()) else {
            return Self::default();
        };
        Self::load_from(&path).unwrap_or_else(|err| {
            warn!(path = %path.display(), %err, "ignoring settings file");
            Self::default()
        })
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::config_path().ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "could not determine the config directory",
            )
        })?;
        self.save_to(&path)
    }

    /// Save to a specific path (creates parent directories)
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Database location: environment override, then settings, then default
    pub fn database_path(&self) -> PathBuf {
        self.database_path_with(std::env::var_os(DB_ENV_VAR))
    }

    fn database_path_with(&self, env_override: Option<OsString>) -> PathBuf {
        env_override
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
            .or_else(|| self.database_path.clone())
            .unwrap_or_else(|| data_root().join("licenses.db"))
    }

    /// Starting folder for the export dialog
    pub fn export_dir(&self) -> PathBuf {
        self.export_dir
            .clone()
            .unwrap_or_else(|| data_root().join("exports"))
    }

    /// Remember the folder of the last export and persist the settings
    pub fn remember_export(&mut self, exported: &Path) {
        let Some(dir) = exported.parent() else {
            return;
        };
        if self.export_dir.as_deref() == Some(dir) {
            return;
        }
        self.export_dir = Some(dir.to_path_buf());
        if let Err(err) = self.save() {
            warn!(%err, "could not save settings");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "export_dir": "/tmp/reports" }"#).unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.database_path, None);
        assert_eq!(config.export_dir(), PathBuf::from("/tmp/reports"));
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = AppConfig {
            database_path: Some(PathBuf::from("/data/licenses.db")),
            export_dir: None,
        };

        config.save_to(&path).unwrap();
        assert_eq!(AppConfig::load_from(&path).unwrap(), config);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(AppConfig::load_from(&path), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn environment_overrides_database_path() {
        let config = AppConfig {
            database_path: Some(PathBuf::from("/from/settings.db")),
            export_dir: None,
        };
        assert_eq!(
            config.database_path_with(Some(OsString::from("/from/env.db"))),
            PathBuf::from("/from/env.db")
        );
        assert_eq!(
            config.database_path_with(Some(OsString::new())),
            PathBuf::from("/from/settings.db")
        );
        assert!(AppConfig::default()
            .database_path_with(None)
            .ends_with(Path::new(APP_DIR).join("licenses.db")));
    }
}
