use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};

use crate::config::{Config, ConfigSource, Paths, ValidationResult, load_config, validate_config};

const REDACTED: &str = "********";

pub async fn handle_init(force: bool, custom_path: Option<PathBuf>) -> anyhow::Result<()> {
    let config_path = custom_path.unwrap_or_else(Paths::config_file);

    if config_path.exists() && !force && !confirm_overwrite(&config_path)? {
        println!("Aborted.");
        return Ok(());
    }

    if let Some(parent) = config_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
        set_dir_permissions(parent);
    }

    fs::write(&config_path, generate_default_config_toml())
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    set_file_permissions(&config_path);

    println!("\x1b[32mConfig created at {}\x1b[0m", config_path.display());
    println!("Check it with: comanda-relay config validate");

    Ok(())
}

pub async fn handle_show(path: Option<&Path>) -> anyhow::Result<()> {
    let (config, source) = load_config(path)?;
    if let ConfigSource::Defaults(path) = &source {
        eprintln!(
            "No config file at {}. Using default configuration.",
            path.display()
        );
    }

    let rendered = toml::to_string_pretty(&redact(config))
        .context("Failed to render configuration")?;
    print!("{rendered}");
    Ok(())
}

pub async fn handle_validate(path: Option<&Path>) -> anyhow::Result<()> {
    let (config, source) = match load_config(path) {
        Ok(loaded) => loaded,
        Err(err) => {
            eprintln!("\x1b[31m{err}\x1b[0m");
            bail!("configuration could not be loaded");
        }
    };

    match &source {
        ConfigSource::File(path) => println!("Checking {}", path.display()),
        ConfigSource::Defaults(path) => println!(
            "No config file found, will use defaults ({})",
            path.display()
        ),
    }

    let result = validate_config(&config);
    print_validation(&result);

    if !result.is_valid() {
        bail!("configuration has {} error(s)", result.errors.len());
    }
    println!("\x1b[32mConfiguration valid\x1b[0m");
    Ok(())
}

fn print_validation(result: &ValidationResult) {
    for warning in &result.warnings {
        println!(
            "\x1b[33mwarning\x1b[0m {}: {}",
            warning.field, warning.message
        );
    }
    for error in &result.errors {
        eprintln!("\x1b[31merror\x1b[0m {}: {}", error.field, error.message);
        if let Some(suggestion) = &error.suggestion {
            eprintln!("  hint: {suggestion}");
        }
    }
}

fn redact(mut config: Config) -> Config {
    if !config.store.api_key.is_empty() {
        config.store.api_key = REDACTED.to_string();
    }
    if !config.mail.password.is_empty() {
        config.mail.password = REDACTED.to_string();
    }
    config
}

fn confirm_overwrite(path: &Path) -> anyhow::Result<bool> {
    print!(
        "Config already exists at {}. Overwrite? [y/N] ",
        path.display()
    );
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let response = input.trim();
    Ok(response.eq_ignore_ascii_case("y") || response.eq_ignore_ascii_case("yes"))
}

fn set_dir_permissions(path: &Path) {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Err(err) = fs::set_permissions(path, fs::Permissions::from_mode(0o700)) {
            eprintln!("Warning: failed to set directory permissions: {err}");
        }
    }
}

fn set_file_permissions(path: &Path) {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Err(err) = fs::set_permissions(path, fs::Permissions::from_mode(0o600)) {
            eprintln!("Warning: failed to set config file permissions: {err}");
        }
    }
}

fn generate_default_config_toml() -> String {
    r#"# comanda-relay configuration file
# Environment variables (PORT, DATABASE_URL, DATABASE_KEY, SERVICE_ACCOUNT,
# MAIL, PASSWORD, LOG_LEVEL) override the values below.

# HTTP server and logging
[server]
bind = "0.0.0.0"
port = 3000
# Log level: trace, debug, info, warn, error
log_level = "info"
json_logs = false
# Also append logs to server.log in the state directory
log_to_file = false

# Device token store (PostgREST / Supabase)
[store]
url = ""
# api_key = "..."
table = "device_tokens"
token_column = "token"
filter_columns = ["user_id", "role"]
role_column = "role"

# Firebase Cloud Messaging
[push]
# service_account_path = "/etc/comanda-relay/firebase.json"
api_base = "https://fcm.googleapis.com"

# SMTP relay for decision emails
[mail]
host = "smtp.gmail.com"
port = 465
starttls = false
# username = "relay@example.com"
# password = "..."
from_name = "Mi Comanda"
from_address = "comandaferrero@gmail.com"
"#
    .to_string()
}
