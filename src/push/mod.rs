//! Push notification delivery through Firebase Cloud Messaging.

pub mod auth;
pub mod dispatcher;
pub mod error;
pub mod fcm;
pub mod payload;
pub mod provider;

pub use auth::{AccessTokenSource, ServiceAccountKey, ServiceAccountTokenSource, StaticAccessToken};
pub use dispatcher::PushDispatcher;
pub use error::PushError;
pub use fcm::FcmProvider;
pub use payload::{
    Message, MulticastMessage, MulticastOutcome, Notification, NotificationPayload, PushResult,
    SendResponse, SkippedSend,
};
pub use provider::PushProvider;
