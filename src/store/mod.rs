//! Welcome-message persistence.
//!
//! Exactly one record, identified by [`MESSAGE_ID`], created or overwritten on
//! every write and never deleted. Concurrent writers race; the last one wins.

mod file;
mod http;
#[cfg(test)]
pub mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use file::FileMessageStore;
pub use http::HttpMessageStore;

pub const MESSAGE_ID: u32 = 1;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct WelcomeMessage {
    pub id: u32,
    pub content: String,
}

impl WelcomeMessage {
    pub fn new(content: impl Into<String>) -> Self {
        Self { id: MESSAGE_ID, content: content.into() }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("stored message is malformed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("message endpoint unreachable: {0}")]
    Http(#[from] reqwest::Error),
    #[error("message endpoint answered {status}: {message}")]
    Status { status: u16, message: String },
}

pub type Result<T> = std::result::Result<T, StoreError>;

#[async_trait]
pub trait MessageStore: Send + Sync {
    /// The stored message, or an empty string when none was ever written.
    async fn get(&self) -> Result<String>;

    /// Upserts the message.
    async fn set(&self, message: &str) -> Result<()>;
}
