//! Session lifecycle: Setup -> Naming -> Playing -> Ended

use serde::{Deserialize, Serialize};

use super::board::{BoardState, CellKey};
use super::content::Content;
use super::roster::PlayerRegistry;
use super::steal::StealCoordinator;
use super::turn::TurnCursor;
use super::winners::{compute_winners, GameResult};
use super::{EngineResult, GameError};
use crate::types::{Player, PlayerIndex, SessionPhase, SessionSettings};

/// What the open question is waiting for once an answer is in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PendingSettle {
    /// The question is done; settling closes it
    CloseQuestion,
    /// A stealer is queued; settling lets them answer
    ActivateStealer,
}

/// The question currently shown to the players
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveQuestion {
    pub cell: CellKey,
    /// An answer is in for the current attempt; further submissions are rejected
    pub answered: bool,
    pub pending: Option<PendingSettle>,
}

/// One game on one device. Owns all state; nothing is global.
#[derive(Debug, Clone)]
pub struct Session {
    pub(super) content: Content,
    pub(super) settings: SessionSettings,
    pub(super) phase: SessionPhase,
    pub(super) roster: PlayerRegistry,
    pub(super) turn: Option<TurnCursor>,
    pub(super) board: BoardState,
    pub(super) steal: StealCoordinator,
    pub(super) active: Option<ActiveQuestion>,
    pub(super) result: Option<GameResult>,
}

impl Session {
    pub fn new(content: Content, settings: SessionSettings) -> Self {
        Self {
            content,
            settings,
            phase: SessionPhase::Setup,
            roster: PlayerRegistry::default(),
            turn: None,
            board: BoardState::new(),
            steal: StealCoordinator::new(settings.steal_mode),
            active: None,
            result: None,
        }
    }

    pub(super) fn require_phase(&self, expected: SessionPhase) -> EngineResult<()> {
        if self.phase != expected {
            return Err(GameError::WrongPhase {
                expected,
                actual: self.phase,
            });
        }
        Ok(())
    }

    /// Setup -> Naming
    pub fn confirm_player_count(&mut self, count: usize) -> EngineResult<&[Player]> {
        self.require_phase(SessionPhase::Setup)?;
        self.roster = PlayerRegistry::initialize(count)?;
        self.phase = SessionPhase::Naming;
        tracing::debug!("Player count confirmed: {}", count);
        Ok(self.roster.players())
    }

    pub fn set_player_name(&mut self, index: PlayerIndex, name: impl Into<String>) -> EngineResult<()> {
        self.require_phase(SessionPhase::Naming)?;
        self.roster.set_name(index, name)
    }

    /// Naming -> Playing, once every player has a name
    pub fn start(&mut self) -> EngineResult<()> {
        self.require_phase(SessionPhase::Naming)?;
        if !self.roster.all_named() {
            return Err(GameError::Validation(
                "Please enter a name for each player!".to_string(),
            ));
        }

        self.turn = Some(TurnCursor::new(self.roster.len())?);
        self.phase = SessionPhase::Playing;
        tracing::info!(
            "Game started with {} players, {} questions, steal mode {:?}",
            self.roster.len(),
            self.content.total_questions(),
            self.settings.steal_mode
        );
        Ok(())
    }

    /// Playing -> Ended as soon as every cell is done
    pub(super) fn finish_if_complete(&mut self) -> bool {
        if self.phase != SessionPhase::Playing
            || !self.board.is_complete(self.content.total_questions())
        {
            return false;
        }

        let result = compute_winners(self.roster.players());
        tracing::info!(
            "Game over: highest score {} ({} winner(s))",
            result.highest_score,
            result.winners.len()
        );
        self.phase = SessionPhase::Ended;
        self.active = None;
        self.steal.reset();
        self.result = Some(result);
        true
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn settings(&self) -> SessionSettings {
        self.settings
    }

    pub fn content(&self) -> &Content {
        &self.content
    }

    pub fn players(&self) -> &[Player] {
        self.roster.players()
    }

    pub fn board(&self) -> &BoardState {
        &self.board
    }

    pub fn steal(&self) -> &StealCoordinator {
        &self.steal
    }

    /// Whose normal turn it is, once play has started
    pub fn current_player(&self) -> Option<PlayerIndex> {
        self.turn.as_ref().map(TurnCursor::current)
    }

    pub fn current_stealer(&self) -> Option<PlayerIndex> {
        self.steal.current_stealer()
    }

    pub fn active_question(&self) -> Option<&ActiveQuestion> {
        self.active.as_ref()
    }

    /// An outcome is on display and `settle` has not been called yet
    pub fn awaiting_settle(&self) -> bool {
        self.active.as_ref().is_some_and(|a| a.pending.is_some())
    }

    /// Final standings, present once the session has ended
    pub fn result(&self) -> Option<&GameResult> {
        self.result.as_ref()
    }
}
