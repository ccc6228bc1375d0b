use crate::game::Settled;
use crate::protocol::{QuestionView, ServerMessage, SessionView};
use crate::reveal::spawn_reveal_timer;
use crate::state::AppState;
use crate::types::*;
use std::sync::Arc;

use super::setup::reply_with_state;

/// Broadcast the final standings if that action ended the game
async fn announce_game_over(state: &Arc<AppState>, view: &SessionView) {
    if view.phase != SessionPhase::Ended {
        return;
    }
    if let Some(result) = view.result.clone() {
        state
            .broadcast_to_session(
                &view.session_id,
                ServerMessage::GameOver {
                    result,
                    view: view.clone(),
                },
            )
            .await;
    }
}

pub async fn handle_open_question(
    state: &Arc<AppState>,
    session_id: SessionId,
    category: String,
    index: usize,
) -> Option<ServerMessage> {
    let result = state
        .apply(&session_id, |s| {
            s.open_question(&category, index).map(QuestionView::from)
        })
        .await;

    match result {
        Ok(applied) => {
            let msg = ServerMessage::QuestionOpened {
                category,
                index,
                question: applied.value,
                view: applied.view,
            };
            state.broadcast_to_session(&session_id, msg.clone()).await;
            Some(msg)
        }
        Err(e) => Some(e.into()),
    }
}

/// A choice (`Some`) or "I Give Up" (`None`), from whoever is up
pub async fn handle_answer(
    state: &Arc<AppState>,
    session_id: SessionId,
    category: String,
    index: usize,
    label: Option<char>,
) -> Option<ServerMessage> {
    let result = state
        .apply(&session_id, |s| s.submit_answer(&category, index, label))
        .await;

    match result {
        Ok(applied) => {
            let msg = ServerMessage::answer_result(applied.value, applied.view.clone());
            state.broadcast_to_session(&session_id, msg.clone()).await;
            announce_game_over(state, &applied.view).await;

            if let Some(seq) = applied.reveal_seq {
                spawn_reveal_timer(state.clone(), session_id, seq);
            }
            Some(msg)
        }
        Err(e) => {
            tracing::debug!("Answer rejected in session {}: {}", session_id, e);
            Some(e.into())
        }
    }
}

pub async fn handle_pick_stealer(
    state: &Arc<AppState>,
    session_id: SessionId,
    player_id: PlayerId,
) -> Option<ServerMessage> {
    let result = state
        .apply(&session_id, |s| s.pick_stealer(player_id))
        .await;

    match result {
        Ok(applied) => {
            let msg = ServerMessage::settled(
                Settled::StealerUp {
                    stealer: applied.value,
                },
                applied.view,
            );
            state.broadcast_to_session(&session_id, msg.clone()).await;
            Some(msg)
        }
        Err(e) => Some(e.into()),
    }
}

/// Settle now instead of waiting for the reveal timer
pub async fn handle_continue(state: &Arc<AppState>, session_id: SessionId) -> Option<ServerMessage> {
    let result = state.apply(&session_id, |s| s.settle()).await;

    match result {
        Ok(applied) => {
            let msg = ServerMessage::settled(applied.value, applied.view);
            state.broadcast_to_session(&session_id, msg.clone()).await;
            Some(msg)
        }
        Err(e) => Some(e.into()),
    }
}

pub async fn handle_abandon_question(
    state: &Arc<AppState>,
    session_id: SessionId,
) -> Option<ServerMessage> {
    let result = state.apply(&session_id, |s| s.abandon_question()).await;
    if let Ok(applied) = &result {
        announce_game_over(state, &applied.view).await;
    }
    reply_with_state(state, &session_id, result).await
}
