//! Turn-based trivia session engine
//!
//! Everything in here is synchronous and owns no I/O. A `Session` is driven by
//! discrete user actions (pick a cell, pick a choice, give up, pick a stealer)
//! and every action either applies completely or returns an error and leaves
//! the session untouched.

pub mod authoring;
pub mod board;
pub mod content;
mod resolution;
pub mod roster;
mod session;
pub mod steal;
pub mod turn;
pub mod winners;

pub use board::{BoardState, CellKey};
pub use content::{Category, Choice, Content, ContentProblem, Question, TriviaContent};
pub use resolution::{AnswerOutcome, Settled};
pub use roster::PlayerRegistry;
pub use session::{ActiveQuestion, PendingSettle, Session};
pub use steal::{StealCoordinator, StealState};
pub use turn::TurnCursor;
pub use winners::{compute_winners, GameResult};

use crate::types::{PlayerId, PlayerIndex, SessionPhase};

/// Result type for engine operations
pub type EngineResult<T> = Result<T, GameError>;

/// Broad class of an engine error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed content, fatal to starting a session
    ContentInvalid,
    /// User-facing and recoverable; the transition is blocked
    Validation,
    /// Caller bug; the session is left unchanged
    Precondition,
}

/// Errors returned by the session engine
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GameError {
    #[error("invalid trivia content: {}", describe_problems(.0))]
    ContentInvalid(Vec<ContentProblem>),

    #[error("{0}")]
    Validation(String),

    #[error("expected phase {expected:?}, session is in {actual:?}")]
    WrongPhase {
        expected: SessionPhase,
        actual: SessionPhase,
    },

    #[error("no question {index} in category '{category}'")]
    UnknownCell { category: String, index: usize },

    #[error("question {index} in category '{category}' is no longer playable")]
    CellLocked { category: String, index: usize },

    #[error("another question is still open")]
    QuestionAlreadyOpen,

    #[error("no question is open")]
    NoOpenQuestion,

    #[error("'{0}' is not a choice for this question")]
    UnknownChoice(char),

    #[error("question {index} in category '{category}' is not the open question")]
    NotOpenQuestion { category: String, index: usize },

    #[error("no steal is waiting for a stealer to be chosen")]
    NotChoosingStealer,

    #[error("no player with id {0}")]
    UnknownPlayer(PlayerId),

    #[error("player at position {0} is not eligible to steal")]
    StealerNotEligible(PlayerIndex),

    #[error("a steal is already in progress")]
    StealInProgress,

    #[error("nothing is waiting to be settled")]
    NothingToSettle,

    #[error("roster is empty")]
    EmptyRoster,

    #[error("player index {0} is out of range")]
    PlayerOutOfRange(PlayerIndex),

    #[error("an answer was already submitted for this attempt")]
    AlreadyAnswered,
}

impl GameError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GameError::ContentInvalid(_) => ErrorKind::ContentInvalid,
            GameError::Validation(_) => ErrorKind::Validation,
            _ => ErrorKind::Precondition,
        }
    }
}

fn describe_problems(problems: &[ContentProblem]) -> String {
    problems
        .iter()
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
