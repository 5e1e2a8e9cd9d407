use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::Value;

use crate::http::server::AppState;
use crate::http::validation::{is_truthy, json_body, text_field};
use crate::mail::MailReceipt;

const MAIL_FAILED_MESSAGE: &str = "No se pudo enviar el mail";

#[derive(Debug, Serialize)]
struct MailSent {
    #[serde(flatten)]
    receipt: MailReceipt,
    #[serde(rename = "seEnvio")]
    sent: bool,
}

#[derive(Debug, Serialize)]
struct MailFailed {
    mensaje: &'static str,
    #[serde(rename = "seEnvio")]
    sent: bool,
}

/// Handles POST /send-mail. Always answers 200; `seEnvio` tells whether the
/// relay took the message.
pub async fn send_mail_handler(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Response {
    let body = json_body(payload);
    let accepted = is_truthy(body.get("aceptacion"));
    let name = text_field(&body, "nombreUsuario");
    let address = text_field(&body, "mail");

    let outcome = state
        .mail()
        .send_decision_email(&address, &name, accepted)
        .await;
    state.metrics().record_mail(outcome.is_ok());

    match outcome {
        Ok(receipt) => (
            StatusCode::OK,
            Json(MailSent {
                receipt,
                sent: true,
            }),
        )
            .into_response(),
        Err(_) => (
            StatusCode::OK,
            Json(MailFailed {
                mensaje: MAIL_FAILED_MESSAGE,
                sent: false,
            }),
        )
            .into_response(),
    }
}
