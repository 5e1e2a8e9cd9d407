use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::schema::PushConfig;
use crate::push::auth::{AccessTokenSource, ServiceAccountKey, ServiceAccountTokenSource};
use crate::push::error::PushError;
use crate::push::payload::{Message, MulticastMessage, PushResult, SendResponse};
use crate::push::provider::PushProvider;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const FCM_ERROR_TYPE: &str = "type.googleapis.com/google.firebase.fcm.v1.FcmError";

/// Largest token list accepted by one multicast call.
pub const MAX_MULTICAST_TOKENS: usize = 500;
/// Default number of `messages:send` requests in flight during a multicast.
pub const DEFAULT_MULTICAST_CONCURRENCY: usize = 16;

#[derive(Serialize)]
struct SendRequest<'a> {
    message: &'a Message,
}

#[derive(Deserialize)]
struct SendReply {
    name: String,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    details: Vec<ErrorDetail>,
}

#[derive(Deserialize)]
struct ErrorDetail {
    #[serde(rename = "@type", default)]
    kind: String,
    #[serde(rename = "errorCode")]
    error_code: Option<String>,
}

/// FCM HTTP v1 client.
pub struct FcmProvider {
    endpoint: String,
    tokens: Arc<dyn AccessTokenSource>,
    client: Client,
    max_concurrency: usize,
}

impl FcmProvider {
    pub fn new(api_base: &str, project_id: &str, tokens: Arc<dyn AccessTokenSource>) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|err| {
                warn!(error = %err, "Failed to build FCM client; using defaults");
                Client::new()
            });

        Self {
            endpoint: format!(
                "{}/v1/projects/{}/messages:send",
                api_base.trim_end_matches('/'),
                project_id
            ),
            tokens,
            client,
            max_concurrency: DEFAULT_MULTICAST_CONCURRENCY,
        }
    }

    /// Caps the number of concurrent requests during a multicast (minimum 1).
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    /// Builds a provider authenticated with the configured service account.
    pub fn from_config(config: &PushConfig) -> Result<Self, PushError> {
        let path = config
            .service_account_path
            .as_deref()
            .ok_or_else(|| PushError::Credentials {
                message: "push.service_account_path is not set".to_string(),
            })?;
        let key = ServiceAccountKey::from_file(path)?;
        let project_id = key.project_id.clone();
        let source = ServiceAccountTokenSource::new(key)?;
        Ok(Self::new(&config.api_base, &project_id, Arc::new(source)))
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn post_message(&self, message: &Message, bearer: &str) -> Result<String, PushError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(bearer)
            .json(&SendRequest { message })
            .send()
            .await
            .map_err(|err| PushError::Request {
                message: format!("FCM request error: {err}"),
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|err| PushError::Request {
            message: format!("FCM response read error: {err}"),
        })?;

        if !status.is_success() {
            return Err(rejection(status.as_u16(), &body));
        }

        let reply: SendReply = serde_json::from_str(&body).map_err(|err| PushError::Decode {
            message: err.to_string(),
        })?;
        Ok(reply.name)
    }
}

fn rejection(status: u16, body: &str) -> PushError {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => {
            let error = envelope.error;
            let code = error
                .details
                .iter()
                .find(|detail| detail.kind == FCM_ERROR_TYPE)
                .or_else(|| error.details.first())
                .and_then(|detail| detail.error_code.clone());
            PushError::Rejected {
                status: if error.status.is_empty() {
                    status.to_string()
                } else {
                    error.status
                },
                code,
                message: error.message,
            }
        }
        Err(_) => PushError::Rejected {
            status: status.to_string(),
            code: None,
            message: body.to_string(),
        },
    }
}

/// Short per-token error label: the FCM error code when present.
fn describe_failure(err: &PushError) -> String {
    match err.provider_code() {
        Some(code) => code.to_string(),
        None => err.to_string(),
    }
}

#[async_trait]
impl PushProvider for FcmProvider {
    async fn send(&self, message: &Message) -> Result<String, PushError> {
        let bearer = self.tokens.access_token().await?;
        let id = self.post_message(message, &bearer).await?;
        debug!(message_id = %id, "FCM message accepted");
        Ok(id)
    }

    async fn send_each_for_multicast(
        &self,
        message: &MulticastMessage,
    ) -> Result<PushResult, PushError> {
        if message.tokens.len() > MAX_MULTICAST_TOKENS {
            return Err(PushError::TooManyTokens {
                count: message.tokens.len(),
                max: MAX_MULTICAST_TOKENS,
            });
        }

        let bearer = self.tokens.access_token().await?;
        let messages: Vec<Message> = message.messages().collect();
        // `buffered` yields in input order, so responses line up with tokens.
        let requests: Vec<_> = messages
            .iter()
            .map(|single| self.post_message(single, &bearer))
            .collect();
        let outcomes: Vec<Result<String, PushError>> = stream::iter(requests)
            .buffered(self.max_concurrency)
            .collect()
            .await;

        let responses: Vec<SendResponse> = outcomes
            .into_iter()
            .map(|outcome| match outcome {
                Ok(id) => SendResponse::delivered(id),
                Err(err) => {
                    debug!(error = %err, "FCM rejected one multicast token");
                    SendResponse::failed(describe_failure(&err))
                }
            })
            .collect();

        let result = PushResult::from_responses(responses);
        debug!(
            success = result.success_count,
            failure = result.failure_count,
            "FCM multicast finished"
        );
        Ok(result)
    }
}
