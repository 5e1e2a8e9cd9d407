use std::env;
use std::fs;
use std::io;
use std::path::PathBuf;

pub const CONFIG_ENV: &str = "COMANDA_RELAY_CONFIG";
pub const STATE_ENV: &str = "COMANDA_RELAY_STATE";

const APP_DIR: &str = "comanda-relay";

/// Platform-specific path resolution for comanda-relay.
pub struct Paths;

#[derive(Debug, thiserror::Error)]
pub enum PathError {
    #[error("Failed to create directory {path}: {source}")]
    CreateDirectory { path: PathBuf, source: io::Error },
}

impl Paths {
    /// Returns the configuration directory path.
    /// - Linux: ~/.config/comanda-relay/
    /// - macOS: ~/Library/Application Support/comanda-relay/
    /// - Override: COMANDA_RELAY_CONFIG env var (directory derived from file path)
    pub fn config_dir() -> PathBuf {
        if let Ok(path) = env::var(CONFIG_ENV) {
            let path = PathBuf::from(path);
            return path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(PathBuf::from)
                .unwrap_or(path);
        }

        dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(APP_DIR)
    }

    /// Returns the full config file path.
    pub fn config_file() -> PathBuf {
        if let Ok(path) = env::var(CONFIG_ENV) {
            return PathBuf::from(path);
        }
        Self::config_dir().join("config.toml")
    }

    /// Returns the state directory path, used for the optional log file.
    /// - Linux: ~/.local/state/comanda-relay/
    /// - Elsewhere: the config directory
    /// - Override: COMANDA_RELAY_STATE env var
    pub fn state_dir() -> PathBuf {
        if let Ok(path) = env::var(STATE_ENV) {
            return PathBuf::from(path);
        }

        #[cfg(target_os = "linux")]
        {
            dirs::state_dir()
                .or_else(|| dirs::home_dir().map(|home| home.join(".local/state")))
                .unwrap_or_else(|| PathBuf::from(".local/state"))
                .join(APP_DIR)
        }

        #[cfg(not(target_os = "linux"))]
        {
            Self::config_dir()
        }
    }

    /// Ensures the config directory exists, creating it if necessary.
    pub fn ensure_config_dir() -> Result<PathBuf, PathError> {
        let dir = Self::config_dir();
        fs::create_dir_all(&dir).map_err(|source| PathError::CreateDirectory {
            path: dir.clone(),
            source,
        })?;
        Ok(dir)
    }

    /// Ensures the state directory exists, creating it if necessary.
    pub fn ensure_state_dir() -> Result<PathBuf, PathError> {
        let dir = Self::state_dir();
        fs::create_dir_all(&dir).map_err(|source| PathError::CreateDirectory {
            path: dir.clone(),
            source,
        })?;
        Ok(dir)
    }
}
