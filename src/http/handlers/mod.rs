//! HTTP request handlers.

pub mod health;
pub mod mail;
pub mod metrics;
pub mod notify;

#[cfg(test)]
pub(crate) mod test_support;
