//! Device token lookup against the relational token store.

pub mod error;
pub mod filter;
pub mod postgrest;
pub mod repository;

pub use error::StoreError;
pub use filter::{DeviceToken, FilterValue, TokenFilter};
pub use postgrest::PostgrestStore;
pub use repository::{TokenRepository, TokenStore};
