use std::path::Path;

use anyhow::{Context, bail};
use tracing::{info, warn};

use crate::config::{ConfigSource, load_config, validate_config};
use crate::daemon::Relay;
use crate::telemetry::{TracingConfig, init_tracing};

/// Loads configuration, installs logging and serves until a shutdown signal.
pub async fn handle_serve(port: Option<u16>, config_path: Option<&Path>) -> anyhow::Result<()> {
    let (mut config, source) = load_config(config_path).context("Failed to load configuration")?;
    if let Some(port) = port {
        config.server.port = port;
    }

    let validation = validate_config(&config);
    if !validation.is_valid() {
        for error in &validation.errors {
            eprintln!("error {}: {}", error.field, error.message);
        }
        bail!(
            "refusing to start with {} configuration error(s)",
            validation.errors.len()
        );
    }

    let _guard = init_tracing(&TracingConfig::from_server_config(&config.server))
        .context("Failed to initialize logging")?;

    match &source {
        ConfigSource::File(path) => info!(path = %path.display(), "Configuration loaded"),
        ConfigSource::Defaults(_) => info!("Running with default configuration"),
    }
    for warning in &validation.warnings {
        warn!(field = %warning.field, "{}", warning.message);
    }

    Relay::new(&config)?.run().await?;
    Ok(())
}
