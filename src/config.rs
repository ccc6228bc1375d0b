//! Server configuration from environment variables

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::game::authoring::AuthoringLimits;
use crate::types::{ExhaustedSteal, SessionSettings, StealMode};

const DEFAULT_REVEAL_DELAY_MS: u64 = 1500;
const DEFAULT_SESSION_TTL_SECS: u64 = 2 * 60 * 60;
const DEFAULT_ENDED_GRACE_SECS: u64 = 5 * 60;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Directory of `<id>.json` trivia records
    pub content_dir: PathBuf,
    pub static_dir: PathBuf,
    /// Rules for sessions that don't override them
    pub default_settings: SessionSettings,
    /// How long an outcome stays on display before the server settles it.
    /// Zero leaves settling to the client.
    pub reveal_delay: Duration,
    /// A session with no action for this long is dropped
    pub session_ttl: Duration,
    /// How long a finished game stays around for the end screen
    pub ended_grace: Duration,
    pub authoring: AuthoringLimits,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8747)),
            content_dir: PathBuf::from("./trivia"),
            static_dir: PathBuf::from("static"),
            default_settings: SessionSettings::default(),
            reveal_delay: Duration::from_millis(DEFAULT_REVEAL_DELAY_MS),
            session_ttl: Duration::from_secs(DEFAULT_SESSION_TTL_SECS),
            ended_grace: Duration::from_secs(DEFAULT_ENDED_GRACE_SECS),
            authoring: AuthoringLimits::default(),
        }
    }
}

/// Trimmed, non-empty value of an environment variable
fn env_value(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Parse an environment variable, warning and falling back on bad input
fn env_parsed<T: FromStr>(key: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env_value(key) {
        Some(raw) => match raw.parse() {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Ignoring {}={:?}: {}", key, raw, e);
                default
            }
        },
        None => default,
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let bind_addr = env_parsed("TRIVIA_BIND_ADDR", defaults.bind_addr);
        let content_dir = env_value("TRIVIA_CONTENT_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.content_dir);
        let static_dir = env_value("TRIVIA_STATIC_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.static_dir);

        let steal_mode = env_parsed("TRIVIA_STEAL_MODE", StealMode::default());
        let exhausted_steal = env_parsed("TRIVIA_EXHAUSTED_STEAL", ExhaustedSteal::default());
        let reveal_delay_ms = env_parsed("TRIVIA_REVEAL_DELAY_MS", DEFAULT_REVEAL_DELAY_MS);
        let session_ttl_secs = env_parsed("TRIVIA_SESSION_TTL_SECS", DEFAULT_SESSION_TTL_SECS);
        let ended_grace_secs = env_parsed("TRIVIA_ENDED_GRACE_SECS", DEFAULT_ENDED_GRACE_SECS);

        tracing::info!(
            %bind_addr,
            content_dir = %content_dir.display(),
            ?steal_mode,
            ?exhausted_steal,
            reveal_delay_ms,
            session_ttl_secs,
            ended_grace_secs,
            "Server config loaded"
        );

        Self {
            bind_addr,
            content_dir,
            static_dir,
            default_settings: SessionSettings {
                steal_mode,
                exhausted_steal,
            },
            reveal_delay: Duration::from_millis(reveal_delay_ms),
            session_ttl: Duration::from_secs(session_ttl_secs),
            ended_grace: Duration::from_secs(ended_grace_secs),
            authoring: AuthoringLimits::default(),
        }
    }

    /// Server defaults with any per-session overrides applied
    pub fn settings_with(
        &self,
        steal_mode: Option<StealMode>,
        exhausted_steal: Option<ExhaustedSteal>,
    ) -> SessionSettings {
        SessionSettings {
            steal_mode: steal_mode.unwrap_or(self.default_settings.steal_mode),
            exhausted_steal: exhausted_steal.unwrap_or(self.default_settings.exhausted_steal),
        }
    }
}
