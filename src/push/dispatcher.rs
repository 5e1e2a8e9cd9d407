use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::error::DispatchError;
use crate::push::payload::{Message, MulticastMessage, MulticastOutcome, NotificationPayload, PushResult};
use crate::push::provider::PushProvider;
use crate::store::{DeviceToken, FilterValue, TokenRepository};

/// Push sends to explicit tokens or to every device registered for a role.
pub struct PushDispatcher {
    provider: Arc<dyn PushProvider>,
    tokens: TokenRepository,
}

impl PushDispatcher {
    pub fn new(provider: Arc<dyn PushProvider>, tokens: TokenRepository) -> Self {
        Self { provider, tokens }
    }

    /// Sends a display notification to one device and returns the provider's
    /// message id.
    pub async fn send_to_token(
        &self,
        token: &str,
        title: &str,
        body: &str,
    ) -> Result<String, DispatchError> {
        let message = Message::new(token, NotificationPayload::new(title, body));
        match self.provider.send(&message).await {
            Ok(id) => {
                info!(message_id = %id, "Push notification sent");
                Ok(id)
            }
            Err(err) => {
                error!(error = %err, "Push notification send failed");
                Err(err.into())
            }
        }
    }

    /// Multicasts to `tokens`; an empty list is answered without calling the
    /// provider.
    pub async fn send_to_tokens(
        &self,
        tokens: Vec<DeviceToken>,
        title: &str,
        body: &str,
    ) -> Result<MulticastOutcome, DispatchError> {
        if tokens.is_empty() {
            debug!("No device tokens to send to; skipping provider call");
            return Ok(MulticastOutcome::skipped());
        }

        let message =
            MulticastMessage::new(tokens, NotificationPayload::with_mirrored_data(title, body));
        let result = self
            .provider
            .send_each_for_multicast(&message)
            .await
            .inspect_err(|err| error!(error = %err, "Push multicast failed"))?;

        info!(
            tokens = message.tokens.len(),
            success = result.success_count,
            failure = result.failure_count,
            "Push multicast sent"
        );
        if result.failure_count > 0 {
            warn!(failure = result.failure_count, "Some device tokens were rejected");
        }
        Ok(MulticastOutcome::Delivered(result))
    }

    /// Looks up every device of `role` and multicasts to them.
    pub async fn send_to_role(
        &self,
        role: impl Into<FilterValue>,
        title: &str,
        body: &str,
    ) -> Result<PushResult, DispatchError> {
        let role = role.into();
        let tokens = self.tokens.fetch_role_tokens(role.clone()).await;
        if tokens.is_empty() {
            info!(role = %role, "No device tokens registered for role");
            return Err(DispatchError::NoRecipients);
        }
        self.send_to_recipients(tokens, title, body).await
    }

    /// Multicasts to a non-empty token list, failing with `NoRecipients`
    /// when nothing is left to send to.
    pub async fn send_to_recipients(
        &self,
        tokens: Vec<DeviceToken>,
        title: &str,
        body: &str,
    ) -> Result<PushResult, DispatchError> {
        match self.send_to_tokens(tokens, title, body).await? {
            MulticastOutcome::Delivered(result) => Ok(result),
            MulticastOutcome::Skipped(_) => Err(DispatchError::NoRecipients),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use serde_json::json;

    use crate::push::error::PushError;
    use crate::push::payload::SendResponse;
    use crate::store::{StoreError, TokenFilter, TokenStore};

    #[derive(Default)]
    struct MockProvider {
        fail: bool,
        single_calls: AtomicUsize,
        multicasts: Mutex<Vec<MulticastMessage>>,
    }

    #[async_trait]
    impl PushProvider for MockProvider {
        async fn send(&self, message: &Message) -> Result<String, PushError> {
            self.single_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail || message.token.is_empty() {
                return Err(PushError::Rejected {
                    status: "INVALID_ARGUMENT".to_string(),
                    code: Some("INVALID_ARGUMENT".to_string()),
                    message: "The registration token is not valid".to_string(),
                });
            }
            Ok(format!("projects/demo/messages/{}", message.token))
        }

        async fn send_each_for_multicast(
            &self,
            message: &MulticastMessage,
        ) -> Result<PushResult, PushError> {
            self.multicasts.lock().unwrap().push(message.clone());
            if self.fail {
                return Err(PushError::Auth {
                    message: "invalid_grant".to_string(),
                });
            }
            Ok(PushResult::from_responses(
                message
                    .tokens
                    .iter()
                    .map(|token| SendResponse::delivered(format!("id-{token}")))
                    .collect(),
            ))
        }
    }

    struct StaticStore(Vec<Option<String>>);

    #[async_trait]
    impl TokenStore for StaticStore {
        async fn select_tokens(
            &self,
            _filter: &TokenFilter,
        ) -> Result<Vec<Option<String>>, StoreError> {
            Ok(self.0.clone())
        }
    }

    fn dispatcher(provider: Arc<MockProvider>, rows: Vec<&str>) -> PushDispatcher {
        let store = StaticStore(rows.into_iter().map(|row| Some(row.to_string())).collect());
        let repository = TokenRepository::new(
            Arc::new(store),
            vec!["user_id".to_string(), "role".to_string()],
            "role",
        );
        PushDispatcher::new(provider, repository)
    }

    #[tokio::test]
    async fn single_send_returns_message_id() {
        let provider = Arc::new(MockProvider::default());
        let id = dispatcher(Arc::clone(&provider), vec![])
            .send_to_token("abc", "Hola", "Pedido listo")
            .await
            .unwrap();
        assert_eq!(id, "projects/demo/messages/abc");
        assert_eq!(provider.single_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn single_send_surfaces_provider_rejection() {
        let provider = Arc::new(MockProvider::default());
        let err = dispatcher(provider, vec![])
            .send_to_token("", "", "")
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::Push(PushError::Rejected { .. })));
    }

    #[tokio::test]
    async fn empty_token_list_skips_provider() {
        let provider = Arc::new(MockProvider::default());
        let outcome = dispatcher(Arc::clone(&provider), vec![])
            .send_to_tokens(Vec::new(), "t", "b")
            .await
            .unwrap();
        assert_eq!(
            serde_json::to_value(outcome).unwrap(),
            json!({"success": false, "sentCount": 0})
        );
        assert!(provider.multicasts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn multicast_mirrors_title_and_body_in_data() {
        let provider = Arc::new(MockProvider::default());
        let outcome = dispatcher(Arc::clone(&provider), vec![])
            .send_to_tokens(vec!["a".to_string(), "b".to_string()], "Hi", "There")
            .await
            .unwrap();

        match outcome {
            MulticastOutcome::Delivered(result) => assert_eq!(result.success_count, 2),
            other => panic!("unexpected outcome: {other:?}"),
        }
        let multicasts = provider.multicasts.lock().unwrap();
        assert_eq!(multicasts.len(), 1);
        let data = multicasts[0].payload.data.as_ref().unwrap();
        assert_eq!(data["title"], "Hi");
        assert_eq!(data["body"], "There");
    }

    #[tokio::test]
    async fn multicast_provider_failure_is_push_error() {
        let provider = Arc::new(MockProvider {
            fail: true,
            ..MockProvider::default()
        });
        let err = dispatcher(provider, vec![])
            .send_to_tokens(vec!["a".to_string()], "t", "b")
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::Push(PushError::Auth { .. })));
    }

    #[tokio::test]
    async fn role_without_tokens_is_no_recipients() {
        let provider = Arc::new(MockProvider::default());
        let err = dispatcher(Arc::clone(&provider), vec![])
            .send_to_role("mozo", "t", "b")
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::NoRecipients));
        assert!(provider.multicasts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn role_fan_out_multicasts_stored_tokens() {
        let provider = Arc::new(MockProvider::default());
        let result = dispatcher(Arc::clone(&provider), vec!["t1", "", "t2"])
            .send_to_role("cocinero", "Nuevo pedido", "Mesa 3")
            .await
            .unwrap();
        assert_eq!(result.success_count, 2);
        assert_eq!(
            provider.multicasts.lock().unwrap()[0].tokens,
            vec!["t1".to_string(), "t2".to_string()]
        );
    }
}
