//! Graph API client module

pub mod client;
pub mod error;
pub mod models;
pub mod session;

#[cfg(test)]
pub mod mock;

pub use client::{ByteStream, DEFAULT_ENDPOINT, GraphApi, GraphClient};
pub use error::FetchError;
pub use models::*;
pub use session::Session;
