use super::{AppState, SessionEntry, SessionError};
use crate::game::{Content, EngineResult, Session};
use crate::protocol::{ServerMessage, SessionView};
use crate::types::*;
use rand::Rng;
use std::time::Instant;
use tokio::sync::broadcast;

const CODE_CHARS: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";
const CODE_LENGTH: usize = 5;
const CHANNEL_CAPACITY: usize = 64;

/// Generate a random session code (5 characters, no look-alike letters)
fn generate_session_code() -> String {
    let mut rng = rand::rng();
    (0..CODE_LENGTH)
        .map(|_| CODE_CHARS[rng.random_range(0..CODE_CHARS.len())] as char)
        .collect()
}

/// What an action did to a session
#[derive(Debug, Clone)]
pub struct Applied<T> {
    pub value: T,
    pub view: SessionView,
    /// Set when the session now waits for a reveal; pass it to the timer
    pub reveal_seq: Option<u64>,
}

impl AppState {
    /// Load a trivia game and open a session for it in Setup
    pub async fn create_session(
        &self,
        trivia_id: &str,
        settings: SessionSettings,
    ) -> Result<(SessionId, SessionView), SessionError> {
        let stored = self.store.fetch_content(trivia_id).await?;
        let content = Content::from_stored(&stored)?;
        let session = Session::new(content, settings);

        let mut sessions = self.sessions.write().await;
        let session_id = loop {
            let code = generate_session_code();
            if !sessions.contains_key(&code) {
                break code;
            }
            // Collision - try again
        };

        let view = SessionView::build(&session_id, &session);
        let (tx, _rx) = broadcast::channel(CHANNEL_CAPACITY);
        sessions.insert(
            session_id.clone(),
            SessionEntry {
                session,
                tx,
                reveal_seq: 0,
                created_at: chrono::Utc::now().to_rfc3339(),
                last_activity: Instant::now(),
                ended_at: None,
            },
        );

        tracing::info!(
            "Session {} created for trivia {} ({:?}, {:?})",
            session_id,
            trivia_id,
            settings.steal_mode,
            settings.exhausted_steal
        );
        Ok((session_id, view))
    }

    /// Run one engine action against a session under the write lock
    pub async fn apply<T>(
        &self,
        session_id: &str,
        action: impl FnOnce(&mut Session) -> EngineResult<T>,
    ) -> Result<Applied<T>, SessionError> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions
            .get_mut(session_id)
            .ok_or_else(|| SessionError::SessionNotFound(session_id.to_string()))?;

        let was_awaiting = entry.session.awaiting_settle();
        let value = action(&mut entry.session)?;

        let now = Instant::now();
        entry.last_activity = now;
        if entry.session.phase() == SessionPhase::Ended && entry.ended_at.is_none() {
            entry.ended_at = Some(now);
        }

        let reveal_seq = if entry.session.awaiting_settle() && !was_awaiting {
            entry.reveal_seq += 1;
            Some(entry.reveal_seq)
        } else {
            None
        };

        Ok(Applied {
            value,
            view: SessionView::build(session_id, &entry.session),
            reveal_seq,
        })
    }

    pub async fn view(&self, session_id: &str) -> Result<SessionView, SessionError> {
        let sessions = self.sessions.read().await;
        sessions
            .get(session_id)
            .map(|entry| SessionView::build(session_id, &entry.session))
            .ok_or_else(|| SessionError::SessionNotFound(session_id.to_string()))
    }

    pub async fn subscribe(
        &self,
        session_id: &str,
    ) -> Option<broadcast::Receiver<ServerMessage>> {
        self.sessions
            .read()
            .await
            .get(session_id)
            .map(|entry| entry.tx.subscribe())
    }

    /// Send to every screen watching the session
    pub async fn broadcast_to_session(&self, session_id: &str, msg: ServerMessage) {
        if let Some(entry) = self.sessions.read().await.get(session_id) {
            // No receivers connected is fine
            let _ = entry.tx.send(msg);
        }
    }

    /// Settle the session if the outcome identified by `seq` is still on display.
    ///
    /// Returns the message that was broadcast, or `None` when a newer outcome
    /// (or a manual `Continue`) got there first.
    pub async fn settle_if_current(&self, session_id: &str, seq: u64) -> Option<ServerMessage> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions.get_mut(session_id)?;
        if entry.reveal_seq != seq || !entry.session.awaiting_settle() {
            tracing::debug!("Reveal timer {} for session {} is stale", seq, session_id);
            return None;
        }

        match entry.session.settle() {
            Ok(settled) => {
                let view = SessionView::build(session_id, &entry.session);
                let msg = ServerMessage::settled(settled, view);
                let _ = entry.tx.send(msg.clone());
                Some(msg)
            }
            Err(e) => {
                tracing::warn!("Reveal timer could not settle session {}: {}", session_id, e);
                None
            }
        }
    }

    /// Drop a session. Nothing about it is kept.
    pub async fn remove_session(&self, session_id: &str) -> Result<(), SessionError> {
        let entry = self
            .sessions
            .write()
            .await
            .remove(session_id)
            .ok_or_else(|| SessionError::SessionNotFound(session_id.to_string()))?;

        let _ = entry.tx.send(ServerMessage::SessionEnded {
            session_id: session_id.to_string(),
        });
        tracing::info!(
            "Session {} ended (created {})",
            session_id,
            entry.created_at
        );
        Ok(())
    }

    /// Drop finished games past their grace period and sessions nobody has
    /// touched within the TTL. Listeners get `SessionEnded`.
    pub async fn reap_expired(&self, now: Instant) -> Vec<SessionId> {
        let mut sessions = self.sessions.write().await;
        let expired: Vec<SessionId> = sessions
            .iter()
            .filter(|(_, entry)| entry.is_expired(now, &self.config))
            .map(|(id, _)| id.clone())
            .collect();

        for session_id in &expired {
            if let Some(entry) = sessions.remove(session_id) {
                let _ = entry.tx.send(ServerMessage::SessionEnded {
                    session_id: session_id.clone(),
                });
                tracing::info!(
                    "Session {} expired ({:?}, created {})",
                    session_id,
                    entry.session.phase(),
                    entry.created_at
                );
            }
        }
        expired
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}
