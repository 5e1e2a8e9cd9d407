use std::time::Instant;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::Value;

use crate::error::DispatchError;
use crate::http::server::AppState;
use crate::http::validation::{Recipients, json_body, parse_multicast, text_field};
use crate::push::PushResult;
use crate::telemetry::metrics::{PushKind, PushOutcome};

/// Handles POST /notify: one notification to one device token.
///
/// Fields are forwarded as given; a missing token or text is left for the
/// provider to reject.
pub async fn notify_handler(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Response {
    let started = Instant::now();
    let body = json_body(payload);
    let token = text_field(&body, "token");
    let title = text_field(&body, "title");
    let text = text_field(&body, "body");

    match state.push().send_to_token(&token, &title, &text).await {
        Ok(message_id) => {
            state
                .metrics()
                .record_push_request(PushKind::Single, PushOutcome::Sent, started.elapsed());
            (
                StatusCode::OK,
                format!("Mensaje enviado correctamente: {message_id}"),
            )
                .into_response()
        }
        Err(err) => {
            state
                .metrics()
                .record_push_request(PushKind::Single, PushOutcome::Failed, started.elapsed());
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Error al enviar el mensaje: {err}"),
            )
                .into_response()
        }
    }
}

/// Handles POST /notify-role: multicast to explicit tokens or to a role.
pub async fn notify_role_handler(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Response {
    let started = Instant::now();
    let body = json_body(payload);

    match dispatch_multicast(&state, &body).await {
        Ok(result) => {
            let metrics = state.metrics();
            metrics.record_push_request(PushKind::Role, PushOutcome::Sent, started.elapsed());
            metrics.record_push_tokens(result.success_count, result.failure_count);
            (StatusCode::OK, Json(result)).into_response()
        }
        Err(err) => {
            let outcome = match err {
                DispatchError::MissingFields { .. } => PushOutcome::Invalid,
                DispatchError::NoRecipients => PushOutcome::NoRecipients,
                DispatchError::Push(_) | DispatchError::Mail(_) => PushOutcome::Failed,
            };
            state
                .metrics()
                .record_push_request(PushKind::Role, outcome, started.elapsed());
            err.into_response()
        }
    }
}

async fn dispatch_multicast(state: &AppState, body: &Value) -> Result<PushResult, DispatchError> {
    let (title, text, recipients) = parse_multicast(body)?;
    match recipients {
        Recipients::Tokens(tokens) => {
            state
                .push()
                .send_to_recipients(tokens, &title, &text)
                .await
        }
        Recipients::Role(role) => state.push().send_to_role(role, &title, &text).await,
    }
}
