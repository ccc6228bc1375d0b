mod session;

use crate::config::ServerConfig;
use crate::game::{ErrorKind, GameError, Session};
use crate::protocol::ServerMessage;
use crate::store::{ContentStore, StoreError};
use crate::types::*;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{broadcast, RwLock};

pub use session::Applied;

/// One live game plus the channel its screens listen on
pub struct SessionEntry {
    pub session: Session,
    pub tx: broadcast::Sender<ServerMessage>,
    /// Bumped on every outcome that waits for a reveal, so a stale timer
    /// never settles a newer outcome
    pub reveal_seq: u64,
    pub created_at: String,
    /// Last time a screen changed the session
    pub last_activity: Instant,
    /// Set once the game reaches `Ended`
    pub ended_at: Option<Instant>,
}

impl SessionEntry {
    /// Whether the sweeper should drop this session at `now`
    pub fn is_expired(&self, now: Instant, config: &ServerConfig) -> bool {
        if let Some(ended_at) = self.ended_at {
            if now.saturating_duration_since(ended_at) >= config.ended_grace {
                return true;
            }
        }
        now.saturating_duration_since(self.last_activity) >= config.session_ttl
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<RwLock<HashMap<SessionId, SessionEntry>>>,
    pub store: Arc<dyn ContentStore>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(store: Arc<dyn ContentStore>, config: ServerConfig) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            store,
            config: Arc::new(config),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Session not found: {0}")]
    SessionNotFound(SessionId),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Game(#[from] GameError),
}

impl SessionError {
    /// Wire error code
    pub fn code(&self) -> &'static str {
        match self {
            SessionError::SessionNotFound(_) => "SESSION_NOT_FOUND",
            SessionError::Store(StoreError::NotFound(_)) => "TRIVIA_NOT_FOUND",
            SessionError::Store(_) => "STORE_ERROR",
            SessionError::Game(GameError::AlreadyAnswered) => "ALREADY_ANSWERED",
            SessionError::Game(e) => match e.kind() {
                ErrorKind::ContentInvalid => "CONTENT_INVALID",
                ErrorKind::Validation => "VALIDATION_FAILED",
                ErrorKind::Precondition => "PRECONDITION_FAILED",
            },
        }
    }
}

impl From<SessionError> for ServerMessage {
    fn from(err: SessionError) -> Self {
        ServerMessage::error(err.code(), err.to_string())
    }
}
