// skillmart-api: Async Rust client for the SkillMart marketplace REST API

pub mod auth;
pub mod client;
mod endpoints;
pub mod error;
pub mod transport;
pub mod types;

pub use auth::Credentials;
pub use client::MarketplaceClient;
pub use error::Error;
pub use transport::{TlsMode, TransportConfig};
