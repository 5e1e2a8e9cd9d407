use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum MailError {
    #[error("Invalid mail address {address}: {message}")]
    Address { address: String, message: String },
    #[error("Mail message building failed: {message}")]
    Build { message: String },
    #[error("SMTP transport error: {message}")]
    Transport { message: String },
    #[error("SMTP response not positive, code: {code}, message: {message}")]
    Rejected { code: String, message: String },
}
