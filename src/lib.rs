pub mod cli;
pub mod config;
pub mod daemon;
pub mod error;
pub mod http;
pub mod mail;
pub mod push;
pub mod store;
pub mod telemetry;

#[cfg(test)]
mod test_utils;
