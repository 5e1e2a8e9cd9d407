use async_trait::async_trait;

use crate::push::error::PushError;
use crate::push::payload::{Message, MulticastMessage, PushResult};

#[async_trait]
pub trait PushProvider: Send + Sync {
    /// Sends one message and returns the provider's message id.
    async fn send(&self, message: &Message) -> Result<String, PushError>;

    /// Sends the same payload to every token of `message`.
    ///
    /// Per-token rejections are reported inside the result; `Err` means the
    /// call as a whole could not be made.
    async fn send_each_for_multicast(
        &self,
        message: &MulticastMessage,
    ) -> Result<PushResult, PushError>;
}
