//! Settings persistence.
//!
//! The default location is managed by `confy` (`<config dir>/oscr/settings.toml`).
//! Explicit paths are read and written with `toml` directly.

use std::fs;
use std::path::{Path, PathBuf};

use oscr_types::Settings;
use thiserror::Error;
use tracing::debug;

const APP_NAME: &str = "oscr";
const CONFIG_NAME: &str = "settings";

/// Errors that can occur while loading or storing settings
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings store error: {0}")]
    Store(#[from] confy::ConfyError),

    #[error("IO error reading {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Parse error in {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Serialize error for {path:?}: {source}")]
    Serialize {
        path: PathBuf,
        source: toml::ser::Error,
    },
}

/// Load settings from the default location, creating it with defaults if
/// missing. Column lists are normalized to the current column sets.
pub fn load_settings() -> Result<Settings, SettingsError> {
    let mut settings: Settings = confy::load(APP_NAME, CONFIG_NAME)?;
    settings.normalize();
    Ok(settings)
}

pub fn store_settings(settings: &Settings) -> Result<(), SettingsError> {
    confy::store(APP_NAME, CONFIG_NAME, settings)?;
    Ok(())
}

/// Path of the default settings file.
pub fn settings_path() -> Result<PathBuf, SettingsError> {
    Ok(confy::get_configuration_file_path(APP_NAME, CONFIG_NAME)?)
}

/// Load settings from a TOML file
pub fn load_from_path(path: &Path) -> Result<Settings, SettingsError> {
    let contents = fs::read_to_string(path).map_err(|e| SettingsError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut settings: Settings = toml::from_str(&contents).map_err(|e| SettingsError::Parse {
        path: path.to_path_buf(),
        source: e,
    })?;
    settings.normalize();
    debug!(path = %path.display(), "Loaded settings");
    Ok(settings)
}

/// Save settings to a TOML file
pub fn save_to_path(path: &Path, settings: &Settings) -> Result<(), SettingsError> {
    let contents = toml::to_string_pretty(settings).map_err(|e| SettingsError::Serialize {
        path: path.to_path_buf(),
        source: e,
    })?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| SettingsError::Io {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }
    fs::write(path, contents).map_err(|e| SettingsError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Default directory for analysis exports and live replay files.
pub fn default_data_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join(APP_NAME))
}
