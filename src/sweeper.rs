use crate::state::AppState;
use std::sync::Arc;
use std::time::{Duration, Instant};

const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Spawn a background task that periodically drops finished and abandoned
/// sessions.
pub fn spawn_session_sweeper(state: Arc<AppState>) {
    let period = SWEEP_INTERVAL
        .min(state.config.ended_grace)
        .max(Duration::from_secs(1));

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;

            let reaped = state.reap_expired(Instant::now()).await;
            if !reaped.is_empty() {
                tracing::debug!(
                    "Swept {} session(s), {} still live",
                    reaped.len(),
                    state.session_count().await
                );
            }
        }
    });
}
