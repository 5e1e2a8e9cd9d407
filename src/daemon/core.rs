use std::sync::Arc;

use tokio::time;
use tracing::{Instrument, error, info, info_span, warn};

use crate::config::schema::Config;
use crate::daemon::shutdown::{SHUTDOWN_TIMEOUT, ShutdownCoordinator, ShutdownResult};
use crate::daemon::signals::listen_for_signals;
use crate::http::{AppState, HttpServer};
use crate::mail::{MailDispatcher, MailError};
use crate::push::{FcmProvider, PushDispatcher, PushError};
use crate::store::{PostgrestStore, TokenRepository};
use crate::telemetry::Metrics;

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("Push provider setup failed: {0}")]
    Push(#[from] PushError),

    #[error("Mail relay setup failed: {0}")]
    Mail(#[from] MailError),

    #[error("HTTP server error: {message}")]
    Http { message: String },
}

/// Builds the shared handler state from configuration.
///
/// Fails when the push provider credentials cannot be loaded; the relay does
/// not start without them.
pub fn build_state(config: &Config) -> Result<AppState, RelayError> {
    let store = PostgrestStore::new(&config.store);
    let repository = TokenRepository::new(
        Arc::new(store),
        config.store.filter_columns.clone(),
        config.store.role_column.clone(),
    );
    let provider = FcmProvider::from_config(&config.push)?;
    let push = PushDispatcher::new(Arc::new(provider), repository);
    let mail = MailDispatcher::from_config(&config.mail)?;

    Ok(AppState::new(
        Arc::new(push),
        Arc::new(mail),
        Arc::new(Metrics::new()),
    ))
}

/// The running relay: HTTP server plus signal handling.
pub struct Relay {
    server: HttpServer,
    shutdown: ShutdownCoordinator,
}

impl Relay {
    pub fn new(config: &Config) -> Result<Self, RelayError> {
        let state = build_state(config)?;
        Self::with_state(config, state)
    }

    pub fn with_state(config: &Config, state: AppState) -> Result<Self, RelayError> {
        let shutdown = ShutdownCoordinator::new();
        let server = HttpServer::new(
            &config.server.bind,
            config.server.port,
            shutdown.cancel_token(),
            state,
        )
        .map_err(|err| RelayError::Http {
            message: format!("{err:#}"),
        })?;
        Ok(Self { server, shutdown })
    }

    /// Serves until SIGINT/SIGTERM (or a server failure), then shuts down.
    pub async fn run(self) -> Result<(), RelayError> {
        let root_span = info_span!("relay.run");
        let Self {
            server,
            mut shutdown,
        } = self;
        let cancel = shutdown.cancel_token();

        async move {
            info!(
                version = env!("CARGO_PKG_VERSION"),
                address = %server.bind_addr(),
                "Starting comanda-relay"
            );

            let signal_cancel = cancel.clone();
            shutdown.register_task(
                "signals",
                tokio::spawn(
                    async move { listen_for_signals(signal_cancel).await }
                        .instrument(info_span!("relay.signals")),
                ),
            );

            let server_cancel = cancel.clone();
            let http_handle = tokio::spawn(
                async move {
                    let outcome = server.start().await;
                    if let Err(err) = &outcome {
                        error!(error = %err, "HTTP server stopped with error");
                        server_cancel.cancel();
                    }
                    outcome.map_err(|err| format!("{err:#}"))
                }
                .instrument(info_span!("relay.http")),
            );

            cancel.cancelled().await;
            info!("Shutdown requested");

            match shutdown.shutdown().await {
                ShutdownResult::Graceful => info!("Shutdown completed"),
                ShutdownResult::TimedOut { hung_tasks } => {
                    warn!(hung_tasks = ?hung_tasks, "Shutdown timed out")
                }
            }

            match time::timeout(SHUTDOWN_TIMEOUT, http_handle).await {
                Ok(Ok(Ok(()))) => {
                    info!("HTTP server stopped");
                    Ok(())
                }
                Ok(Ok(Err(message))) => Err(RelayError::Http { message }),
                Ok(Err(err)) => Err(RelayError::Http {
                    message: format!("HTTP server task failed: {err}"),
                }),
                Err(_) => {
                    warn!("HTTP server shutdown timed out");
                    Ok(())
                }
            }
        }
        .instrument(root_span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use crate::http::handlers::test_support::test_state;

    fn fixture_path() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/service_account.json")
    }

    #[test]
    fn build_state_requires_service_account() {
        let err = build_state(&Config::default()).err().unwrap();
        assert!(matches!(err, RelayError::Push(PushError::Credentials { .. })));
    }

    #[tokio::test]
    async fn build_state_with_credentials_succeeds() {
        let mut config = Config::default();
        config.push.service_account_path = Some(fixture_path());
        config.store.url = "http://127.0.0.1:54321".to_string();
        assert!(build_state(&config).is_ok());
    }

    #[test]
    fn invalid_bind_is_http_error() {
        let mut config = Config::default();
        config.server.bind = "not an address".to_string();
        let err = Relay::with_state(&config, test_state().state).err().unwrap();
        assert!(err.to_string().contains("Invalid HTTP bind address"));
    }

    #[tokio::test]
    async fn bind_failure_ends_run_with_error() {
        let occupied = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let mut config = Config::default();
        config.server.bind = "127.0.0.1".to_string();
        config.server.port = occupied.local_addr().unwrap().port();

        let relay = Relay::with_state(&config, test_state().state).unwrap();
        let result = time::timeout(std::time::Duration::from_secs(5), relay.run())
            .await
            .expect("relay should stop after bind failure");

        assert!(matches!(result, Err(RelayError::Http { .. })));
    }
}
