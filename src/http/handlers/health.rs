use std::time::Duration;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Serialize;

use crate::http::server::AppState;

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    uptime: String,
}

/// Handles GET /health with build version and uptime.
pub async fn health_handler(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok",
            version: env!("CARGO_PKG_VERSION"),
            uptime: format_uptime(state.uptime()),
        }),
    )
}

/// Compact uptime: the two largest units, e.g. `2h30m` or `3d2h`; a single
/// unit below one hour.
fn format_uptime(duration: Duration) -> String {
    let secs = duration.as_secs();
    match (secs / 86_400, secs % 86_400 / 3_600, secs % 3_600 / 60) {
        (0, 0, 0) => format!("{secs}s"),
        (0, 0, minutes) => format!("{minutes}m"),
        (0, hours, minutes) => format!("{hours}h{minutes}m"),
        (days, hours, _) => format!("{days}d{hours}h"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use tower::ServiceExt;

    use crate::http::handlers::test_support::test_state;

    #[tokio::test]
    async fn test_health_response_ok() {
        let response = test_state()
            .router()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let payload: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(payload["status"], "ok");
        assert_eq!(payload["version"], env!("CARGO_PKG_VERSION"));
        assert_eq!(payload["uptime"], "0s");
    }

    #[test]
    fn uptime_keeps_two_largest_units() {
        assert_eq!(format_uptime(Duration::from_secs(2 * 3600 + 30 * 60)), "2h30m");
        assert_eq!(format_uptime(Duration::from_secs(15 * 60)), "15m");
        assert_eq!(format_uptime(Duration::from_secs(45)), "45s");
        assert_eq!(format_uptime(Duration::from_secs(3 * 86400 + 2 * 3600)), "3d2h");
        assert_eq!(format_uptime(Duration::from_secs(86400)), "1d0h");
        assert_eq!(format_uptime(Duration::from_secs(3600)), "1h0m");
        assert_eq!(format_uptime(Duration::ZERO), "0s");
    }
}
