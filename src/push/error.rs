use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum PushError {
    #[error("Push credentials error: {message}")]
    Credentials { message: String },
    #[error("Push provider authentication failed: {message}")]
    Auth { message: String },
    #[error("Push request failed: {message}")]
    Request { message: String },
    #[error("Push provider rejected the message ({status}): {message}")]
    Rejected {
        status: String,
        code: Option<String>,
        message: String,
    },
    #[error("Push provider response could not be decoded: {message}")]
    Decode { message: String },
    #[error("Multicast has {count} tokens; at most {max} are allowed per call")]
    TooManyTokens { count: usize, max: usize },
}

impl PushError {
    /// Provider error code (e.g. `UNREGISTERED`) when one was reported.
    pub fn provider_code(&self) -> Option<&str> {
        match self {
            Self::Rejected { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}
