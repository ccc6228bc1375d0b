use crate::protocol::ServerMessage;
use crate::state::{AppState, SessionError};
use crate::types::*;
use std::sync::Arc;

/// Broadcast the fresh state after a lobby action and echo it to the sender
pub(super) async fn reply_with_state(
    state: &Arc<AppState>,
    session_id: &str,
    result: Result<crate::state::Applied<()>, SessionError>,
) -> Option<ServerMessage> {
    match result {
        Ok(applied) => {
            let msg = ServerMessage::State { view: applied.view };
            state.broadcast_to_session(session_id, msg.clone()).await;
            Some(msg)
        }
        Err(e) => {
            tracing::debug!("Session {}: {}", session_id, e);
            Some(e.into())
        }
    }
}

pub async fn handle_create_session(
    state: &Arc<AppState>,
    trivia_id: TriviaId,
    steal_mode: Option<StealMode>,
    exhausted_steal: Option<ExhaustedSteal>,
) -> Option<ServerMessage> {
    let settings = state.config.settings_with(steal_mode, exhausted_steal);
    match state.create_session(&trivia_id, settings).await {
        Ok((session_id, view)) => Some(ServerMessage::SessionCreated { session_id, view }),
        Err(e) => {
            tracing::warn!("Could not create session for trivia {}: {}", trivia_id, e);
            Some(e.into())
        }
    }
}

pub async fn handle_set_player_count(
    state: &Arc<AppState>,
    session_id: SessionId,
    count: usize,
) -> Option<ServerMessage> {
    let result = state
        .apply(&session_id, |s| s.confirm_player_count(count).map(|_| ()))
        .await;
    reply_with_state(state, &session_id, result).await
}

pub async fn handle_set_player_name(
    state: &Arc<AppState>,
    session_id: SessionId,
    index: PlayerIndex,
    name: String,
) -> Option<ServerMessage> {
    let result = state
        .apply(&session_id, |s| s.set_player_name(index, name))
        .await;
    reply_with_state(state, &session_id, result).await
}

pub async fn handle_start_game(state: &Arc<AppState>, session_id: SessionId) -> Option<ServerMessage> {
    let result = state.apply(&session_id, |s| s.start()).await;
    reply_with_state(state, &session_id, result).await
}

pub async fn handle_get_state(state: &Arc<AppState>, session_id: SessionId) -> Option<ServerMessage> {
    match state.view(&session_id).await {
        Ok(view) => Some(ServerMessage::State { view }),
        Err(e) => Some(e.into()),
    }
}

pub async fn handle_end_session(
    state: &Arc<AppState>,
    session_id: SessionId,
) -> Option<ServerMessage> {
    match state.remove_session(&session_id).await {
        Ok(()) => Some(ServerMessage::SessionEnded { session_id }),
        Err(e) => Some(e.into()),
    }
}
