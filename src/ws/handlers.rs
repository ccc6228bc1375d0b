//! WebSocket message dispatch
//!
//! Every message except `CreateSession` names the session it acts on.
//! State-changing results go back to the sender and are broadcast to every
//! screen watching the same session. A sender that watches the session gets
//! the result twice; clients treat messages as idempotent redraws.

use crate::protocol::{ClientMessage, ServerMessage};
use crate::state::AppState;
use std::sync::Arc;

use super::{play, setup};

/// Handle client messages and return optional response
pub async fn handle_message(msg: ClientMessage, state: &Arc<AppState>) -> Option<ServerMessage> {
    match msg {
        // Session lifecycle
        ClientMessage::CreateSession {
            trivia_id,
            steal_mode,
            exhausted_steal,
        } => setup::handle_create_session(state, trivia_id, steal_mode, exhausted_steal).await,

        ClientMessage::SetPlayerCount { session_id, count } => {
            setup::handle_set_player_count(state, session_id, count).await
        }

        ClientMessage::SetPlayerName {
            session_id,
            index,
            name,
        } => setup::handle_set_player_name(state, session_id, index, name).await,

        ClientMessage::StartGame { session_id } => {
            setup::handle_start_game(state, session_id).await
        }

        ClientMessage::GetState { session_id } => setup::handle_get_state(state, session_id).await,

        ClientMessage::EndSession { session_id } => {
            setup::handle_end_session(state, session_id).await
        }

        // Board play
        ClientMessage::OpenQuestion {
            session_id,
            category,
            index,
        } => play::handle_open_question(state, session_id, category, index).await,

        ClientMessage::SubmitAnswer {
            session_id,
            category,
            index,
            label,
        } => play::handle_answer(state, session_id, category, index, Some(label)).await,

        ClientMessage::GiveUp {
            session_id,
            category,
            index,
        } => play::handle_answer(state, session_id, category, index, None).await,

        ClientMessage::PickStealer {
            session_id,
            player_id,
        } => play::handle_pick_stealer(state, session_id, player_id).await,

        ClientMessage::Continue { session_id } => play::handle_continue(state, session_id).await,

        ClientMessage::AbandonQuestion { session_id } => {
            play::handle_abandon_question(state, session_id).await
        }
    }
}
