//! CLI commands module for comanda-relay.

pub mod app;
pub mod commands;

pub use app::{Cli, Commands, ConfigAction};
