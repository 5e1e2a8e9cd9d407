use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::error::DispatchError;

/// Error detail payload for failed requests.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ErrorDetail {
    code: String,
    message: String,
}

/// Error response envelope shared by the JSON endpoints.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ErrorResponse {
    success: bool,
    error: ErrorDetail,
}

impl ErrorResponse {
    pub fn new(code: &str, message: &str) -> Self {
        Self {
            success: false,
            error: ErrorDetail {
                code: code.to_string(),
                message: message.to_string(),
            },
        }
    }
}

pub fn error_response(
    code: &str,
    message: &str,
    status: StatusCode,
) -> (StatusCode, Json<ErrorResponse>) {
    (status, Json(ErrorResponse::new(code, message)))
}

/// HTTP status for a dispatcher failure on a JSON endpoint.
pub fn status_for(err: &DispatchError) -> StatusCode {
    match err {
        DispatchError::MissingFields { .. } => StatusCode::BAD_REQUEST,
        DispatchError::NoRecipients => StatusCode::NOT_FOUND,
        DispatchError::Push(_) | DispatchError::Mail(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for DispatchError {
    fn into_response(self) -> Response {
        error_response(self.code(), &self.to_string(), status_for(&self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    use crate::push::PushError;

    async fn body_json(response: Response) -> serde_json::Value {
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn missing_fields_is_bad_request_envelope() {
        let response = DispatchError::missing(["title"]).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let payload = body_json(response).await;
        assert_eq!(payload["success"], false);
        assert_eq!(payload["error"]["code"], "MISSING_FIELDS");
        assert_eq!(payload["error"]["message"], "Missing required fields: title");
    }

    #[test]
    fn statuses_follow_error_kind() {
        assert_eq!(status_for(&DispatchError::NoRecipients), StatusCode::NOT_FOUND);
        let push = DispatchError::Push(PushError::Request {
            message: "timeout".to_string(),
        });
        assert_eq!(status_for(&push), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
