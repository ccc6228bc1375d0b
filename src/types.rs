use serde::{Deserialize, Serialize};

/// Opaque ID types for type safety
pub type SessionId = String;
pub type TriviaId = String;

/// Position of a player in the roster (0-based, registry order)
pub type PlayerIndex = usize;

/// Stable per-session player id (1-based, assigned at setup)
pub type PlayerId = u32;

pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 10;

/// Upper bound accepted when loading content for play.
/// Authoring applies its own, stricter limits (see `game::authoring`).
pub const MAX_CHOICES_PER_QUESTION: usize = 10;
pub const MIN_CHOICES_PER_QUESTION: usize = 2;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub score: u32,
}

impl Player {
    /// Name shown on the scoreboard, falling back to "Player N" while unnamed
    pub fn display_name(&self) -> String {
        let trimmed = self.name.trim();
        if trimmed.is_empty() {
            format!("Player {}", self.id)
        } else {
            trimmed.to_string()
        }
    }
}

/// How the next stealer is chosen after the active player misses
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum StealMode {
    /// A human picks one stealer; a single attempt per question
    #[default]
    Manual,
    /// Every other player gets a turn, round-robin after the original player
    Auto,
}

impl std::str::FromStr for StealMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "manual" => Ok(StealMode::Manual),
            "auto" => Ok(StealMode::Auto),
            other => Err(format!("unknown steal mode '{}'", other)),
        }
    }
}

/// What happens to a cell once every steal attempt on it has failed
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExhaustedSteal {
    /// Lock the cell without awarding points, so the board always fills up
    #[default]
    Close,
    /// Leave the cell open; it may be picked again later
    LeaveOpen,
}

impl std::str::FromStr for ExhaustedSteal {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "close" => Ok(ExhaustedSteal::Close),
            "leave_open" | "leave-open" => Ok(ExhaustedSteal::LeaveOpen),
            other => Err(format!("unknown exhausted-steal policy '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionPhase {
    /// Choosing the number of players
    Setup,
    /// Entering player names
    Naming,
    /// Board is interactive
    Playing,
    /// Every cell is done; winners computed
    Ended,
}

/// Per-session rule choices
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct SessionSettings {
    pub steal_mode: StealMode,
    pub exhausted_steal: ExhaustedSteal,
}
