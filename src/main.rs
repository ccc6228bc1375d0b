use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use triviashare::config::ServerConfig;
use triviashare::state::AppState;
use triviashare::store::{ContentStore, JsonDirStore};

#[tokio::main]
async fn main() {
    // Load .env file if present (before any env var reads)
    if let Err(e) = dotenvy::dotenv() {
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "triviashare=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting TriviaShare...");

    let config = ServerConfig::from_env();
    let bind_addr = config.bind_addr;

    let store = JsonDirStore::new(config.content_dir.clone());
    tracing::info!(
        "Content store: {} ({})",
        store.name(),
        config.content_dir.display()
    );

    let state = Arc::new(AppState::new(Arc::new(store), config));
    triviashare::sweeper::spawn_session_sweeper(state.clone());
    let app = triviashare::app(state);

    let listener = match tokio::net::TcpListener::bind(bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", bind_addr, e);
            std::process::exit(1);
        }
    };
    tracing::info!("Server listening on {}", bind_addr);

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
