use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Display block shown by the client OS.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
}

/// Title/body plus an optional data block for client-side handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPayload {
    pub notification: Notification,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<BTreeMap<String, String>>,
}

impl NotificationPayload {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            notification: Notification {
                title: title.into(),
                body: body.into(),
            },
            data: None,
        }
    }

    /// Payload whose data block repeats title and body.
    pub fn with_mirrored_data(title: impl Into<String>, body: impl Into<String>) -> Self {
        let payload = Self::new(title, body);
        let data = BTreeMap::from([
            ("title".to_string(), payload.notification.title.clone()),
            ("body".to_string(), payload.notification.body.clone()),
        ]);
        Self {
            data: Some(data),
            ..payload
        }
    }
}

/// Single-recipient message, serialized in FCM v1 `message` shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub token: String,
    #[serde(flatten)]
    pub payload: NotificationPayload,
}

impl Message {
    pub fn new(token: impl Into<String>, payload: NotificationPayload) -> Self {
        Self {
            token: token.into(),
            payload,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MulticastMessage {
    pub tokens: Vec<String>,
    pub payload: NotificationPayload,
}

impl MulticastMessage {
    pub fn new(tokens: Vec<String>, payload: NotificationPayload) -> Self {
        Self { tokens, payload }
    }

    /// One message per token, in token order.
    pub fn messages(&self) -> impl Iterator<Item = Message> + '_ {
        self.tokens
            .iter()
            .map(|token| Message::new(token.clone(), self.payload.clone()))
    }
}

/// Outcome for one token of a multicast send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SendResponse {
    pub fn delivered(message_id: impl Into<String>) -> Self {
        Self {
            success: true,
            message_id: Some(message_id.into()),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            message_id: None,
            error: Some(error.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushResult {
    pub success_count: usize,
    pub failure_count: usize,
    pub responses: Vec<SendResponse>,
}

impl PushResult {
    pub fn from_responses(responses: Vec<SendResponse>) -> Self {
        let success_count = responses.iter().filter(|response| response.success).count();
        Self {
            success_count,
            failure_count: responses.len() - success_count,
            responses,
        }
    }
}

/// Reply for a multicast request that had nobody to send to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedSend {
    pub success: bool,
    pub sent_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum MulticastOutcome {
    Skipped(SkippedSend),
    Delivered(PushResult),
}

impl MulticastOutcome {
    pub fn skipped() -> Self {
        Self::Skipped(SkippedSend {
            success: false,
            sent_count: 0,
        })
    }
}
