use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::PoolConfig;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::debug;

use crate::config::schema::MailConfig;
use crate::mail::error::MailError;

/// Fully addressed HTML email ready for submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub from: Mailbox,
    pub to: Mailbox,
    pub subject: String,
    pub html: String,
    pub message_id: String,
}

/// Positive reply of the SMTP relay to a submitted message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpReply {
    pub code: String,
    pub message: String,
}

impl SmtpReply {
    /// Single-line form, e.g. `250 2.0.0 OK`.
    pub fn summary(&self) -> String {
        if self.message.is_empty() {
            self.code.clone()
        } else {
            format!("{} {}", self.code, self.message)
        }
    }
}

#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn deliver(&self, mail: &OutgoingMail) -> Result<SmtpReply, MailError>;
}

/// SMTP submission through lettre's pooled async transport.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    pub fn from_config(config: &MailConfig) -> Result<Self, MailError> {
        let builder = if config.starttls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
        }
        .map_err(|err| MailError::Transport {
            message: format!("cannot configure relay {}: {err}", config.host),
        })?;

        let transport = builder
            .port(config.port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .pool_config(PoolConfig::new().max_size(1))
            .build();

        Ok(Self { transport })
    }
}

fn build_message(mail: &OutgoingMail) -> Result<Message, MailError> {
    Message::builder()
        .from(mail.from.clone())
        .to(mail.to.clone())
        .subject(mail.subject.clone())
        .message_id(Some(mail.message_id.clone()))
        .header(ContentType::TEXT_HTML)
        .body(mail.html.clone())
        .map_err(|err| MailError::Build {
            message: err.to_string(),
        })
}

#[async_trait]
impl MailTransport for SmtpMailer {
    async fn deliver(&self, mail: &OutgoingMail) -> Result<SmtpReply, MailError> {
        let message = build_message(mail)?;
        let response = self
            .transport
            .send(message)
            .await
            .map_err(|err| MailError::Transport {
                message: err.to_string(),
            })?;

        let code = response.code().to_string();
        let text = response.message().collect::<Vec<_>>().join(" ");
        if !response.is_positive() {
            return Err(MailError::Rejected {
                code,
                message: text,
            });
        }

        debug!(code = %code, "SMTP relay accepted message");
        Ok(SmtpReply {
            code,
            message: text,
        })
    }
}
