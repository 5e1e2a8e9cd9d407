use crate::config::schema::Config;

#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

#[derive(Debug)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

#[derive(Debug)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
}

pub fn validate_config(config: &Config) -> ValidationResult {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    validate_log_level(&config.server.log_level, &mut errors);

    if config.server.port == 0 {
        errors.push(ValidationError {
            field: "server.port".to_string(),
            message: "HTTP port must be between 1 and 65535".to_string(),
            suggestion: Some("Set server.port or the PORT variable".to_string()),
        });
    }

    if config.store.url.trim().is_empty() {
        warnings.push(ValidationWarning {
            field: "store.url".to_string(),
            message: "Token store URL not set; role lookups will return no recipients"
                .to_string(),
        });
    } else if !is_http_url(&config.store.url) {
        errors.push(ValidationError {
            field: "store.url".to_string(),
            message: "Token store URL must start with http:// or https://".to_string(),
            suggestion: None,
        });
    }

    if config.store.api_key.trim().is_empty() {
        warnings.push(ValidationWarning {
            field: "store.api_key".to_string(),
            message: "Token store key not set (DATABASE_KEY)".to_string(),
        });
    }

    if config.store.filter_columns.is_empty() {
        errors.push(ValidationError {
            field: "store.filter_columns".to_string(),
            message: "At least one filterable column is required".to_string(),
            suggestion: Some("Use filter_columns = [\"user_id\", \"role\"]".to_string()),
        });
    } else if !config
        .store
        .filter_columns
        .iter()
        .any(|column| column == &config.store.role_column)
    {
        errors.push(ValidationError {
            field: "store.role_column".to_string(),
            message: format!(
                "Role column '{}' is not listed in store.filter_columns",
                config.store.role_column
            ),
            suggestion: None,
        });
    }

    match &config.push.service_account_path {
        None => errors.push(ValidationError {
            field: "push.service_account_path".to_string(),
            message: "Push provider credentials are not configured".to_string(),
            suggestion: Some(
                "Set push.service_account_path or the SERVICE_ACCOUNT variable".to_string(),
            ),
        }),
        Some(path) if !path.exists() => errors.push(ValidationError {
            field: "push.service_account_path".to_string(),
            message: format!("Service account file not found: {}", path.display()),
            suggestion: None,
        }),
        Some(_) => {}
    }

    if !is_http_url(&config.push.api_base) {
        errors.push(ValidationError {
            field: "push.api_base".to_string(),
            message: "Push API base must start with http:// or https://".to_string(),
            suggestion: None,
        });
    }

    if config.mail.host.trim().is_empty() {
        errors.push(ValidationError {
            field: "mail.host".to_string(),
            message: "SMTP host cannot be empty".to_string(),
            suggestion: Some("Use mail.host = \"smtp.gmail.com\"".to_string()),
        });
    }

    if config.mail.username.trim().is_empty() || config.mail.password.is_empty() {
        warnings.push(ValidationWarning {
            field: "mail.username".to_string(),
            message: "SMTP credentials not set (MAIL/PASSWORD); decision emails will fail"
                .to_string(),
        });
    }

    if !config.mail.from_address.contains('@') {
        errors.push(ValidationError {
            field: "mail.from_address".to_string(),
            message: format!("Invalid sender address: {}", config.mail.from_address),
            suggestion: None,
        });
    }

    ValidationResult { errors, warnings }
}

fn validate_log_level(level: &str, errors: &mut Vec<ValidationError>) {
    let level = level.trim().to_lowercase();
    let valid = ["trace", "debug", "info", "warn", "error"];
    if !valid.iter().any(|value| *value == level) {
        errors.push(ValidationError {
            field: "server.log_level".to_string(),
            message: format!("Invalid log level: {level}"),
            suggestion: Some(format!("Valid levels: {}", valid.join(", "))),
        });
    }
}

fn is_http_url(value: &str) -> bool {
    let value = value.trim();
    value.starts_with("http://") || value.starts_with("https://")
}
