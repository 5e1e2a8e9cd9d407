use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, Response};
use lettre::message::Mailbox;
use serde_json::Value;
use tower::ServiceExt;

use crate::http::server::{AppState, build_router};
use crate::mail::{MailDispatcher, MailError, MailTransport, OutgoingMail, SmtpReply};
use crate::push::{
    Message, MulticastMessage, PushDispatcher, PushError, PushProvider, PushResult, SendResponse,
};
use crate::store::{StoreError, TokenFilter, TokenRepository, TokenStore};
use crate::telemetry::Metrics;

#[derive(Default)]
pub(crate) struct FakeProvider {
    pub fail: bool,
    pub sends: Mutex<Vec<Message>>,
    pub multicasts: Mutex<Vec<MulticastMessage>>,
}

#[async_trait]
impl PushProvider for FakeProvider {
    async fn send(&self, message: &Message) -> Result<String, PushError> {
        self.sends.lock().unwrap().push(message.clone());
        if self.fail || message.token.is_empty() {
            return Err(PushError::Rejected {
                status: "INVALID_ARGUMENT".to_string(),
                code: Some("INVALID_ARGUMENT".to_string()),
                message: "The registration token is not a valid FCM registration token"
                    .to_string(),
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

#[derive(Default)]
pub(crate) struct FakeStore {
    pub rows: Vec<Option<String>>,
    pub calls: AtomicUsize,
}

impl FakeStore {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenStore for FakeStore {
    async fn select_tokens(&self, _filter: &TokenFilter) -> Result<Vec<Option<String>>, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.rows.clone())
    }
}

#[derive(Default)]
pub(crate) struct FakeTransport {
    pub fail: bool,
    pub sent: Mutex<Vec<OutgoingMail>>,
}

#[async_trait]
impl MailTransport for FakeTransport {
    async fn deliver(&self, mail: &OutgoingMail) -> Result<SmtpReply, MailError> {
        if self.fail {
            return Err(MailError::Transport {
                message: "connection refused".to_string(),
            });
        }
        self.sent.lock().unwrap().push(mail.clone());
        Ok(SmtpReply {
            code: "250".to_string(),
            message: "2.0.0 OK".to_string(),
        })
    }
}

pub(crate) struct TestHarness {
    pub state: AppState,
    pub provider: Arc<FakeProvider>,
    pub store: Arc<FakeStore>,
    pub transport: Arc<FakeTransport>,
}

impl TestHarness {
    pub fn new(provider: FakeProvider, store: FakeStore, transport: FakeTransport) -> Self {
        let provider = Arc::new(provider);
        let store = Arc::new(store);
        let transport = Arc::new(transport);

        let repository = TokenRepository::new(
            Arc::clone(&store) as Arc<dyn TokenStore>,
            vec!["user_id".to_string(), "role".to_string()],
            "role",
        );
        let push = PushDispatcher::new(Arc::clone(&provider) as Arc<dyn PushProvider>, repository);
        let from: Mailbox = "Mi Comanda <comandaferrero@gmail.com>"
            .parse()
            .expect("valid sender");
        let mail = MailDispatcher::new(Arc::clone(&transport) as Arc<dyn MailTransport>, from);
        let state = AppState::new(Arc::new(push), Arc::new(mail), Arc::new(Metrics::new()));

        Self {
            state,
            provider,
            store,
            transport,
        }
    }

    pub fn router(&self) -> Router {
        build_router(self.state.clone())
    }
}

pub(crate) fn test_state() -> TestHarness {
    TestHarness::new(
        FakeProvider::default(),
        FakeStore::default(),
        FakeTransport::default(),
    )
}

pub(crate) fn store_with(tokens: &[&str]) -> FakeStore {
    FakeStore {
        rows: tokens.iter().map(|token| Some(token.to_string())).collect(),
        calls: AtomicUsize::new(0),
    }
}

pub(crate) async fn post_json(router: Router, uri: &str, body: Value) -> Response<Body> {
    router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
}

pub(crate) async fn body_text(response: Response<Body>) -> String {
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(body.to_vec()).unwrap()
}

pub(crate) async fn body_json(response: Response<Body>) -> Value {
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}
