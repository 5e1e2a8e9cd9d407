//! Configuration management module.

pub mod loader;
pub mod paths;
pub mod schema;
pub mod validation;

pub use loader::{ConfigError, ConfigSource, apply_env_overrides, load_config, load_file};
pub use paths::{PathError, Paths};
pub use schema::{Config, MailConfig, PushConfig, ServerConfig, StoreConfig};
pub use validation::{ValidationError, ValidationResult, ValidationWarning, validate_config};
