use thiserror::Error;

use crate::mail::MailError;
use crate::push::PushError;

/// Failure of a dispatcher operation.
///
/// Every dispatcher returns this type; the HTTP layer decides which status
/// each variant maps to.
#[derive(Debug, Clone, Error)]
pub enum DispatchError {
    #[error("Missing required fields: {}", fields.join(", "))]
    MissingFields { fields: Vec<String> },
    #[error("No device tokens found for the requested recipients")]
    NoRecipients,
    #[error(transparent)]
    Push(#[from] PushError),
    #[error(transparent)]
    Mail(#[from] MailError),
}

impl DispatchError {
    pub fn missing<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::MissingFields {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// Code carried in JSON error envelopes.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingFields { .. } => "MISSING_FIELDS",
            Self::NoRecipients => "NO_RECIPIENTS",
            Self::Push(_) => "PUSH_FAILED",
            Self::Mail(_) => "MAIL_FAILED",
        }
    }
}
