//! Account decision emails sent through an SMTP relay.

pub mod dispatcher;
pub mod error;
pub mod template;
pub mod transport;

pub use dispatcher::{MailDispatcher, MailEnvelope, MailReceipt};
pub use error::MailError;
pub use template::DecisionEmail;
pub use transport::{MailTransport, OutgoingMail, SmtpMailer, SmtpReply};
