use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration for comanda-relay.
///
/// Example:
/// ```toml
/// [server]
/// port = 3000
///
/// [store]
/// url = "https://project.supabase.co"
///
/// [push]
/// service_account_path = "/etc/comanda/firebase.json"
///
/// [mail]
/// username = "relay@example.com"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// HTTP server and logging configuration.
    /// Example: [server]
    pub server: ServerConfig,
    /// Device token store configuration.
    /// Example: [store]
    pub store: StoreConfig,
    /// Push provider configuration.
    /// Example: [push]
    pub push: PushConfig,
    /// SMTP relay configuration.
    /// Example: [mail]
    pub mail: MailConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address.
    /// Example: bind = "0.0.0.0"
    pub bind: String,
    /// Listen port. Overridden by `PORT`.
    /// Example: port = 3000
    pub port: u16,
    /// Log level (trace, debug, info, warn, error). Overridden by `LOG_LEVEL`.
    /// Example: log_level = "info"
    pub log_level: String,
    /// Emit JSON log lines instead of the human format.
    /// Example: json_logs = false
    pub json_logs: bool,
    /// Also append logs to `server.log` in the state directory.
    /// Example: log_to_file = false
    pub log_to_file: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            json_logs: false,
            log_to_file: false,
        }
    }
}

/// PostgREST token store configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StoreConfig {
    /// Base URL of the store. Overridden by `DATABASE_URL`.
    /// Example: url = "https://project.supabase.co"
    pub url: String,
    /// API key sent as `apikey` and bearer token. Overridden by `DATABASE_KEY`.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub api_key: String,
    /// Table holding device tokens.
    /// Example: table = "device_tokens"
    pub table: String,
    /// Column holding the token string.
    /// Example: token_column = "token"
    pub token_column: String,
    /// Columns that may be used in an equality filter.
    /// Example: filter_columns = ["user_id", "role"]
    pub filter_columns: Vec<String>,
    /// Column used for role fan-out.
    /// Example: role_column = "role"
    pub role_column: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            api_key: String::new(),
            table: "device_tokens".to_string(),
            token_column: "token".to_string(),
            filter_columns: vec!["user_id".to_string(), "role".to_string()],
            role_column: "role".to_string(),
        }
    }
}

/// Firebase Cloud Messaging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PushConfig {
    /// Service account JSON file. Overridden by `SERVICE_ACCOUNT`.
    /// Example: service_account_path = "/etc/comanda/firebase.json"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_account_path: Option<PathBuf>,
    /// FCM API base URL.
    /// Example: api_base = "https://fcm.googleapis.com"
    pub api_base: String,
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            service_account_path: None,
            api_base: "https://fcm.googleapis.com".to_string(),
        }
    }
}

/// SMTP relay configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MailConfig {
    /// SMTP server host.
    /// Example: host = "smtp.gmail.com"
    pub host: String,
    /// SMTP server port.
    /// Example: port = 465
    pub port: u16,
    /// Use STARTTLS instead of implicit TLS.
    /// Example: starttls = false
    pub starttls: bool,
    /// SMTP account. Overridden by `MAIL`.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub username: String,
    /// SMTP password. Overridden by `PASSWORD`.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub password: String,
    /// Display name of the sender.
    /// Example: from_name = "Mi Comanda"
    pub from_name: String,
    /// Sender address.
    /// Example: from_address = "comandaferrero@gmail.com"
    pub from_address: String,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            host: "smtp.gmail.com".to_string(),
            port: 465,
            starttls: false,
            username: String::new(),
            password: String::new(),
            from_name: "Mi Comanda".to_string(),
            from_address: "comandaferrero@gmail.com".to_string(),
        }
    }
}
