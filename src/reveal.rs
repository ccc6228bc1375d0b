use crate::state::AppState;
use crate::types::SessionId;
use std::sync::Arc;

/// Spawn a background task that settles an outcome once it has been on
/// display for the configured reveal delay, then tells every screen.
pub fn spawn_reveal_timer(state: Arc<AppState>, session_id: SessionId, seq: u64) {
    let delay = state.config.reveal_delay;
    if delay.is_zero() {
        return;
    }

    tokio::spawn(async move {
        tokio::time::sleep(delay).await;

        if state.settle_if_current(&session_id, seq).await.is_some() {
            tracing::debug!("Reveal {} settled for session {}", seq, session_id);
        }
    });
}
