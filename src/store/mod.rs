//! Where trivia content lives between sessions
//!
//! The session engine only ever reads through `ContentStore::fetch_content`.
//! The authoring endpoints read and write whole records.

mod file;
mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::game::TriviaContent;
use crate::types::TriviaId;

pub use file::JsonDirStore;
pub use memory::MemoryStore;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Trivia not found: {0}")]
    NotFound(TriviaId),

    #[error("Invalid trivia id: {0:?}")]
    InvalidId(String),

    /// The backing storage could not be reached at all
    #[error("Store unavailable: {0}")]
    Transport(String),

    #[error("Malformed trivia record: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriviaStatus {
    #[default]
    #[serde(rename = "in progress")]
    InProgress,
    #[serde(rename = "completed")]
    Completed,
}

/// A trivia game as persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriviaRecord {
    pub id: TriviaId,
    pub title: String,
    #[serde(default)]
    pub status: TriviaStatus,
    #[serde(default)]
    pub content: TriviaContent,
    /// ISO8601
    pub created_at: String,
}

impl TriviaRecord {
    /// A blank, in-progress record with a fresh id
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: ulid::Ulid::new().to_string(),
            title: title.into(),
            status: TriviaStatus::InProgress,
            content: TriviaContent::new(),
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Ids end up in file names, so keep them to a safe alphabet
pub fn validate_id(id: &str) -> StoreResult<()> {
    let ok = !id.is_empty()
        && id.len() <= 64
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if ok {
        Ok(())
    } else {
        Err(StoreError::InvalidId(id.to_string()))
    }
}

#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn fetch(&self, id: &str) -> StoreResult<TriviaRecord>;

    async fn list(&self) -> StoreResult<Vec<TriviaRecord>>;

    /// Insert or replace by id
    async fn save(&self, record: &TriviaRecord) -> StoreResult<()>;

    async fn delete(&self, id: &str) -> StoreResult<()>;

    /// Backend name, for logging
    fn name(&self) -> &str;

    /// Just the questions, which is all a play session needs
    async fn fetch_content(&self, id: &str) -> StoreResult<TriviaContent> {
        Ok(self.fetch(id).await?.content)
    }
}
