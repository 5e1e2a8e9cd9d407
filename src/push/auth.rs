use std::fs;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::push::error::PushError;

const FCM_SCOPE: &str = "https://www.googleapis.com/auth/firebase.messaging";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
const REFRESH_MARGIN_SECS: i64 = 60;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Fields of a Google service account JSON key used by the relay.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub project_id: String,
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ServiceAccountKey {
    pub fn from_file(path: &Path) -> Result<Self, PushError> {
        let contents = fs::read_to_string(path).map_err(|err| PushError::Credentials {
            message: format!("cannot read {}: {err}", path.display()),
        })?;
        Self::from_json(&contents)
    }

    pub fn from_json(contents: &str) -> Result<Self, PushError> {
        serde_json::from_str(contents).map_err(|err| PushError::Credentials {
            message: format!("invalid service account JSON: {err}"),
        })
    }
}

/// Supplies bearer tokens for provider calls.
#[async_trait]
pub trait AccessTokenSource: Send + Sync {
    async fn access_token(&self) -> Result<String, PushError>;
}

/// Fixed bearer token, for local emulators and tests.
pub struct StaticAccessToken(String);

impl StaticAccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

#[async_trait]
impl AccessTokenSource for StaticAccessToken {
    async fn access_token(&self) -> Result<String, PushError> {
        Ok(self.0.clone())
    }
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    ASSERTION_LIFETIME_SECS
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    refresh_at: DateTime<Utc>,
}

impl CachedToken {
    /// The refresh margin is capped at half the lifetime so short-lived
    /// tokens are still reused.
    fn issued(value: String, now: DateTime<Utc>, expires_in: i64) -> Self {
        let margin = REFRESH_MARGIN_SECS.min(expires_in / 2);
        Self {
            value,
            refresh_at: now + TimeDelta::seconds(expires_in - margin),
        }
    }

    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now < self.refresh_at
    }
}

/// OAuth2 JWT-bearer flow for a service account, with the token cached until
/// shortly before it expires.
pub struct ServiceAccountTokenSource {
    key: ServiceAccountKey,
    signing_key: EncodingKey,
    client: Client,
    cache: Mutex<Option<CachedToken>>,
}

impl ServiceAccountTokenSource {
    pub fn new(key: ServiceAccountKey) -> Result<Self, PushError> {
        let signing_key =
            EncodingKey::from_rsa_pem(key.private_key.as_bytes()).map_err(|err| {
                PushError::Credentials {
                    message: format!("invalid service account private key: {err}"),
                }
            })?;
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|err| {
                warn!(error = %err, "Failed to build OAuth client; using defaults");
                Client::new()
            });

        info!(
            project_id = %key.project_id,
            client_email = %key.client_email,
            "Loaded push provider service account"
        );

        Ok(Self {
            key,
            signing_key,
            client,
            cache: Mutex::new(None),
        })
    }

    pub fn project_id(&self) -> &str {
        &self.key.project_id
    }

    fn signed_assertion(&self, now: DateTime<Utc>) -> Result<String, PushError> {
        let claims = AssertionClaims {
            iss: &self.key.client_email,
            scope: FCM_SCOPE,
            aud: &self.key.token_uri,
            iat: now.timestamp(),
            exp: now.timestamp() + ASSERTION_LIFETIME_SECS,
        };
        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key.private_key_id.clone();

        jsonwebtoken::encode(&header, &claims, &self.signing_key).map_err(|err| {
            PushError::Credentials {
                message: format!("failed to sign token assertion: {err}"),
            }
        })
    }

    async fn exchange(&self, now: DateTime<Utc>) -> Result<CachedToken, PushError> {
        let assertion = self.signed_assertion(now)?;
        let body = serde_urlencoded::to_string([
            ("grant_type", JWT_BEARER_GRANT),
            ("assertion", assertion.as_str()),
        ])
        .map_err(|err| PushError::Auth {
            message: format!("failed to encode token request: {err}"),
        })?;

        let response = self
            .client
            .post(&self.key.token_uri)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await
            .map_err(|err| PushError::Auth {
                message: format!("token request error: {err}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(PushError::Auth {
                message: format!("token endpoint returned {status}: {detail}"),
            });
        }

        let token: TokenResponse = response.json().await.map_err(|err| PushError::Auth {
            message: format!("invalid token response: {err}"),
        })?;
        debug!(expires_in = token.expires_in, "Obtained push provider access token");

        Ok(CachedToken::issued(token.access_token, now, token.expires_in))
    }
}

#[async_trait]
impl AccessTokenSource for ServiceAccountTokenSource {
    async fn access_token(&self) -> Result<String, PushError> {
        let mut cache = self.cache.lock().await;
        let now = Utc::now();
        if let Some(cached) = cache.as_ref().filter(|cached| cached.is_fresh(now)) {
            return Ok(cached.value.clone());
        }

        let fresh = self.exchange(now).await?;
        let value = fresh.value.clone();
        *cache = Some(fresh);
        Ok(value)
    }
}
