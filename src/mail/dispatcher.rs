use std::sync::Arc;

use lettre::Address;
use lettre::message::Mailbox;
use serde::Serialize;
use tracing::{error, info};
use uuid::Uuid;

use crate::config::schema::MailConfig;
use crate::error::DispatchError;
use crate::mail::error::MailError;
use crate::mail::template::DecisionEmail;
use crate::mail::transport::{MailTransport, OutgoingMail, SmtpMailer};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MailEnvelope {
    pub from: String,
    pub to: Vec<String>,
}

/// What the SMTP relay said about a submitted decision email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MailReceipt {
    pub accepted: Vec<String>,
    pub rejected: Vec<String>,
    pub response: String,
    pub message_id: String,
    pub envelope: MailEnvelope,
}

pub struct MailDispatcher {
    transport: Arc<dyn MailTransport>,
    from: Mailbox,
}

impl MailDispatcher {
    pub fn new(transport: Arc<dyn MailTransport>, from: Mailbox) -> Self {
        Self { transport, from }
    }

    pub fn from_config(config: &MailConfig) -> Result<Self, MailError> {
        let address: Address =
            config
                .from_address
                .parse()
                .map_err(|err: lettre::address::AddressError| MailError::Address {
                    address: config.from_address.clone(),
                    message: err.to_string(),
                })?;
        let name = (!config.from_name.is_empty()).then(|| config.from_name.clone());
        let transport = SmtpMailer::from_config(config)?;
        Ok(Self::new(Arc::new(transport), Mailbox::new(name, address)))
    }

    /// Sends the acceptance or rejection email for an account decision.
    pub async fn send_decision_email(
        &self,
        recipient_address: &str,
        recipient_name: &str,
        accepted: bool,
    ) -> Result<MailReceipt, DispatchError> {
        let to: Address = recipient_address
            .trim()
            .parse()
            .map_err(|err: lettre::address::AddressError| {
                error!(
                    recipient = recipient_address,
                    accepted,
                    error = %err,
                    "Decision email has an invalid recipient address"
                );
                MailError::Address {
                    address: recipient_address.to_string(),
                    message: err.to_string(),
                }
            })?;
        let email = DecisionEmail::render(recipient_name, accepted);
        let mail = OutgoingMail {
            from: self.from.clone(),
            to: Mailbox::new(None, to.clone()),
            subject: email.subject,
            html: email.html,
            message_id: format!("<{}@{}>", Uuid::new_v4(), self.from.email.domain()),
        };

        let reply = self.transport.deliver(&mail).await.inspect_err(|err| {
            error!(
                recipient = %to,
                accepted,
                error = %err,
                "Decision email delivery failed"
            );
        })?;
        info!(recipient = %to, accepted, "Decision email sent");

        Ok(MailReceipt {
            accepted: vec![to.to_string()],
            rejected: Vec::new(),
            response: reply.summary(),
            message_id: mail.message_id,
            envelope: MailEnvelope {
                from: self.from.email.to_string(),
                to: vec![to.to_string()],
            },
        })
    }
}
