use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::paths::Paths;
use crate::config::schema::Config;

/// Environment variables understood by the relay, as used by existing deployments.
pub const ENV_PORT: &str = "PORT";
pub const ENV_LOG_LEVEL: &str = "LOG_LEVEL";
pub const ENV_STORE_URL: &str = "DATABASE_URL";
pub const ENV_STORE_KEY: &str = "DATABASE_KEY";
pub const ENV_SERVICE_ACCOUNT: &str = "SERVICE_ACCOUNT";
pub const ENV_MAIL_USER: &str = "MAIL";
pub const ENV_MAIL_PASSWORD: &str = "PASSWORD";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("Configuration syntax error in {path}: {message}")]
    Syntax { path: PathBuf, message: String },

    #[error("Configuration value error in {path}: {message}")]
    Value { path: PathBuf, message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidEnv { key: &'static str, value: String },
}

/// Where the effective configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    Defaults(PathBuf),
}

/// Loads the config file (or defaults) and applies process environment overrides.
pub fn load_config(path: Option<&Path>) -> Result<(Config, ConfigSource), ConfigError> {
    let path = path.map(PathBuf::from).unwrap_or_else(Paths::config_file);
    let (mut config, source) = load_file(&path)?;
    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    Ok((config, source))
}

/// Reads a TOML config file; a missing file yields defaults.
pub fn load_file(path: &Path) -> Result<(Config, ConfigSource), ConfigError> {
    if !path.exists() {
        info!(path = %path.display(), "No config file found, using defaults");
        return Ok((Config::default(), ConfigSource::Defaults(path.to_path_buf())));
    }

    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config = parse_config(path, &contents)?;
    debug!(path = %path.display(), "Loaded config file");
    Ok((config, ConfigSource::File(path.to_path_buf())))
}

fn parse_config(path: &Path, contents: &str) -> Result<Config, ConfigError> {
    // Syntax problems are reported separately from well-formed TOML with wrong types.
    if let Err(err) = contents.parse::<toml::Table>() {
        return Err(ConfigError::Syntax {
            path: path.to_path_buf(),
            message: err.to_string(),
        });
    }
    toml::from_str(contents).map_err(|err| ConfigError::Value {
        path: path.to_path_buf(),
        message: err.to_string(),
    })
}

/// Applies overrides from a key lookup; empty values are ignored.
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

    if let Some(port) = get(ENV_PORT) {
        config.server.port = port
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidEnv {
                key: ENV_PORT,
                value: port.clone(),
            })?;
    }
    if let Some(level) = get(ENV_LOG_LEVEL) {
        config.server.log_level = level;
    }
    if let Some(url) = get(ENV_STORE_URL) {
        config.store.url = url;
    }
    if let Some(key) = get(ENV_STORE_KEY) {
        config.store.api_key = key;
    }
    if let Some(path) = get(ENV_SERVICE_ACCOUNT) {
        config.push.service_account_path = Some(PathBuf::from(path));
    }
    if let Some(user) = get(ENV_MAIL_USER) {
        config.mail.username = user;
    }
    if let Some(password) = get(ENV_MAIL_PASSWORD) {
        config.mail.password = password;
    }
    Ok(())
}
