use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Token store request failed: {message}")]
    Request { message: String },
    #[error("Token store returned status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("Token store response could not be decoded: {message}")]
    Decode { message: String },
    #[error("Unknown filter column: {column}")]
    UnknownColumn { column: String },
}
