//! Axum HTTP relay surface.

pub mod error;
pub mod handlers;
pub mod server;
pub mod validation;

pub use error::{ErrorResponse, error_response};
pub use server::{AppState, HttpServer, build_router};
