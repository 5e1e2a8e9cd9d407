//! Relay process lifecycle: wiring, signals and graceful shutdown.

pub mod core;
pub mod shutdown;
pub mod signals;

pub use core::{Relay, RelayError, build_state};
