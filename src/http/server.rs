use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::http::error::{ErrorResponse, error_response};
use crate::http::handlers;
use crate::mail::MailDispatcher;
use crate::push::PushDispatcher;
use crate::telemetry::Metrics;

/// HTTP relay server.
pub struct HttpServer {
    bind_addr: SocketAddr,
    router: Router,
    shutdown: CancellationToken,
}

/// Shared application state for HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    push: Arc<PushDispatcher>,
    mail: Arc<MailDispatcher>,
    metrics: Arc<Metrics>,
    started_at: Instant,
}

impl AppState {
    pub fn new(push: Arc<PushDispatcher>, mail: Arc<MailDispatcher>, metrics: Arc<Metrics>) -> Self {
        Self {
            push,
            mail,
            metrics,
            started_at: Instant::now(),
        }
    }

    pub fn push(&self) -> &PushDispatcher {
        &self.push
    }

    pub fn mail(&self) -> &MailDispatcher {
        &self.mail
    }

    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }
}

impl HttpServer {
    /// Create a new HTTP server with bind address and shutdown token.
    pub fn new(bind: &str, port: u16, shutdown: CancellationToken, state: AppState) -> Result<Self> {
        let bind_addr: SocketAddr = format!("{bind}:{port}")
            .parse()
            .with_context(|| format!("Invalid HTTP bind address: {bind}:{port}"))?;

        if bind == "0.0.0.0" {
            warn!(
                port,
                "HTTP relay binding to all interfaces (0.0.0.0). This exposes the API to the network."
            );
        }

        Ok(Self {
            bind_addr,
            router: build_router(state),
            shutdown,
        })
    }

    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }

    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    /// Start the HTTP server and wait for shutdown.
    pub async fn start(&self) -> Result<()> {
        let listener = TcpListener::bind(self.bind_addr)
            .await
            .with_context(|| format!("Failed to bind HTTP relay to {}", self.bind_addr))?;
        let local_addr = listener
            .local_addr()
            .context("Failed to read bound HTTP address")?;
        info!(address = %local_addr, "HTTP relay listening");

        let shutdown = self.shutdown.clone();
        axum::serve(listener, self.router.clone())
            .with_graceful_shutdown(async move {
                shutdown.cancelled().await;
                info!("HTTP relay shutting down");
            })
            .await
            .context("HTTP relay server failed")?;

        info!("HTTP relay stopped");
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn router(&self) -> Router {
        self.router.clone()
    }
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
}

/// Routes, CORS and request tracing around `state`.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/notify", post(handlers::notify::notify_handler))
        .route("/notify-role", post(handlers::notify::notify_role_handler))
        .route("/send-mail", post(handlers::mail::send_mail_handler))
        .route("/health", get(handlers::health::health_handler))
        .route("/metrics", get(handlers::metrics::metrics_handler))
        .fallback(fallback_handler)
        .with_state(state)
        .layer(cors_layer())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    tracing::info_span!(
                        "http.request",
                        method = %request.method(),
                        path = %request.uri().path(),
                        status_code = tracing::field::Empty,
                    )
                })
                .on_request(|request: &Request<Body>, _span: &tracing::Span| {
                    tracing::info!(method = %request.method(), path = %request.uri().path(), "http.request");
                })
                .on_response(|response: &axum::http::Response<_>, latency: Duration, span: &tracing::Span| {
                    let status = response.status();
                    span.record("status_code", status.as_u16());
                    if status.is_server_error() {
                        tracing::error!(%status, ?latency, "finished");
                    } else if status.is_client_error() {
                        tracing::warn!(%status, ?latency, "finished");
                    } else {
                        tracing::info!(%status, ?latency, "finished");
                    }
                })
                .on_failure(|error, latency: Duration, _span: &tracing::Span| {
                    tracing::error!(?error, ?latency, "failed");
                }),
        )
}

async fn fallback_handler() -> (StatusCode, Json<ErrorResponse>) {
    error_response(
        "NOT_FOUND",
        "The requested endpoint does not exist",
        StatusCode::NOT_FOUND,
    )
}
