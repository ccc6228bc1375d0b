//! Scoring & resolution: what an answer attempt does to the session
//!
//! Every outcome leaves the open question "answered" until `settle` is called
//! (or, in manual steal mode, until a stealer is picked). That flag is the
//! guard against a second submission while the outcome is still on display.

use serde::{Deserialize, Serialize};

use super::board::CellKey;
use super::content::Question;
use super::session::{ActiveQuestion, PendingSettle, Session};
use super::steal::StealProgress;
use super::{EngineResult, GameError};
use crate::types::{ExhaustedSteal, PlayerId, PlayerIndex, SessionPhase, StealMode};

/// Result of one `submit_answer` call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AnswerOutcome {
    /// The player whose turn it is answered correctly
    Correct { player: PlayerIndex, points: u32 },
    /// The player whose turn it is missed or gave up; a steal is open
    Incorrect {
        player: PlayerIndex,
        forfeited: bool,
        steal_eligible: Vec<PlayerIndex>,
        /// Auto mode: who steals first. Manual mode: none until picked.
        next_stealer: Option<PlayerIndex>,
    },
    StealCorrect {
        stealer: PlayerIndex,
        points: u32,
        next_turn: PlayerIndex,
    },
    /// Auto mode: the queue moves on
    StealMissed {
        stealer: PlayerIndex,
        next_stealer: PlayerIndex,
    },
    /// Nobody left to steal
    StealExhausted {
        stealer: PlayerIndex,
        next_turn: PlayerIndex,
        /// The cell was locked without a score
        closed: bool,
    },
}

impl AnswerOutcome {
    pub fn message(&self) -> &'static str {
        match self {
            AnswerOutcome::Correct { .. } => "Correct! Points awarded.",
            AnswerOutcome::Incorrect { .. } => "Incorrect. No points awarded.",
            AnswerOutcome::StealCorrect { .. } => "Correct steal! Points awarded.",
            AnswerOutcome::StealMissed { .. } => "Incorrect steal. Moving onto the next player ...",
            AnswerOutcome::StealExhausted { .. } => "Incorrect steal. No points awarded.",
        }
    }

    pub fn is_correct(&self) -> bool {
        matches!(
            self,
            AnswerOutcome::Correct { .. } | AnswerOutcome::StealCorrect { .. }
        )
    }
}

/// What `settle` moved the session to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "settled", rename_all = "snake_case")]
pub enum Settled {
    QuestionClosed { next_turn: PlayerIndex },
    StealerUp { stealer: PlayerIndex },
}

fn unknown_cell(category: &str, index: usize) -> GameError {
    GameError::UnknownCell {
        category: category.to_string(),
        index,
    }
}

impl Session {
    /// Show a question from the board to the player whose turn it is
    pub fn open_question(&mut self, category: &str, index: usize) -> EngineResult<&Question> {
        self.require_phase(SessionPhase::Playing)?;
        if self.active.is_some() {
            return Err(GameError::QuestionAlreadyOpen);
        }
        if self.content.question(category, index).is_none() {
            return Err(unknown_cell(category, index));
        }
        if self.board.is_locked(category, index) {
            return Err(GameError::CellLocked {
                category: category.to_string(),
                index,
            });
        }

        self.active = Some(ActiveQuestion {
            cell: CellKey::new(category, index),
            answered: false,
            pending: None,
        });
        tracing::debug!(
            "Question opened: {} #{} for player {:?}",
            category,
            index,
            self.current_player()
        );

        self.content
            .question(category, index)
            .ok_or_else(|| unknown_cell(category, index))
    }

    /// Answer the open question. `None` means the answerer gave up.
    ///
    /// Whoever is up answers: the player whose turn it is, or the active
    /// stealer while a steal is running.
    pub fn submit_answer(
        &mut self,
        category: &str,
        index: usize,
        label: Option<char>,
    ) -> EngineResult<AnswerOutcome> {
        self.require_phase(SessionPhase::Playing)?;
        let active = self.active.as_ref().ok_or(GameError::NoOpenQuestion)?;
        if active.cell.category != category || active.cell.index != index {
            return Err(GameError::NotOpenQuestion {
                category: category.to_string(),
                index,
            });
        }
        if active.answered {
            return Err(GameError::AlreadyAnswered);
        }

        let question = self
            .content
            .question(category, index)
            .ok_or_else(|| unknown_cell(category, index))?;
        if let Some(label) = label {
            if question.choice(label).is_none() {
                return Err(GameError::UnknownChoice(label));
            }
        }
        let correct = label.is_some_and(|l| question.is_correct(l));
        let points = question.points;

        let outcome = if self.steal.is_idle() {
            self.resolve_turn_answer(category, index, correct, points, label.is_none())?
        } else {
            self.resolve_steal_answer(category, index, correct, points)?
        };

        tracing::info!("Answer on {} #{}: {:?}", category, index, outcome);
        self.finish_if_complete();
        Ok(outcome)
    }

    fn resolve_turn_answer(
        &mut self,
        category: &str,
        index: usize,
        correct: bool,
        points: u32,
        forfeited: bool,
    ) -> EngineResult<AnswerOutcome> {
        let turn = self.turn.as_mut().ok_or(GameError::EmptyRoster)?;
        let player = turn.current();

        if correct {
            self.roster.add_score(player, points)?;
            self.board.resolve(category, index);
            turn.advance();
            self.mark_answered(Some(PendingSettle::CloseQuestion));
            return Ok(AnswerOutcome::Correct { player, points });
        }

        // Cell stays open and the turn stays put while the steal runs
        let steal_eligible = self.steal.begin(player, self.roster.len())?;
        let pending = match self.steal.mode() {
            StealMode::Auto => Some(PendingSettle::ActivateStealer),
            StealMode::Manual => None,
        };
        self.mark_answered(pending);

        Ok(AnswerOutcome::Incorrect {
            player,
            forfeited,
            steal_eligible,
            next_stealer: self.steal.current_stealer(),
        })
    }

    fn resolve_steal_answer(
        &mut self,
        category: &str,
        index: usize,
        correct: bool,
        points: u32,
    ) -> EngineResult<AnswerOutcome> {
        let turn = self.turn.as_mut().ok_or(GameError::EmptyRoster)?;
        let stealer = self
            .steal
            .current_stealer()
            .ok_or(GameError::StealInProgress)?;

        if correct {
            self.roster.add_score(stealer, points)?;
            let (_, original) = self.steal.record_success()?;
            self.board.resolve(category, index);
            // Handoff goes to whoever follows the original player, not the stealer
            let next_turn = turn.after(original);
            turn.set(next_turn)?;
            self.mark_answered(Some(PendingSettle::CloseQuestion));
            return Ok(AnswerOutcome::StealCorrect {
                stealer,
                points,
                next_turn,
            });
        }

        match self.steal.record_miss()? {
            StealProgress::Next(next_stealer) => {
                self.mark_answered(Some(PendingSettle::ActivateStealer));
                Ok(AnswerOutcome::StealMissed {
                    stealer,
                    next_stealer,
                })
            }
            StealProgress::Exhausted { original } => {
                self.steal.reset();
                let next_turn = turn.after(original);
                turn.set(next_turn)?;
                let closed = self.settings.exhausted_steal == ExhaustedSteal::Close;
                if closed {
                    self.board.close_unscored(category, index);
                }
                self.mark_answered(Some(PendingSettle::CloseQuestion));
                Ok(AnswerOutcome::StealExhausted {
                    stealer,
                    next_turn,
                    closed,
                })
            }
        }
    }

    fn mark_answered(&mut self, pending: Option<PendingSettle>) {
        if let Some(active) = self.active.as_mut() {
            active.answered = true;
            active.pending = pending;
        }
    }

    /// Manual mode: choose who gets the single steal attempt
    pub fn pick_stealer(&mut self, player_id: PlayerId) -> EngineResult<PlayerIndex> {
        self.require_phase(SessionPhase::Playing)?;
        let active = self.active.as_mut().ok_or(GameError::NoOpenQuestion)?;
        let stealer = self
            .roster
            .index_of(player_id)
            .ok_or(GameError::UnknownPlayer(player_id))?;
        self.steal.pick(stealer)?;

        active.answered = false;
        active.pending = None;
        tracing::debug!("Stealer picked: player {} (index {})", player_id, stealer);
        Ok(stealer)
    }

    /// Apply the outcome on display once the reveal delay is over
    pub fn settle(&mut self) -> EngineResult<Settled> {
        self.require_phase(SessionPhase::Playing)?;
        let pending = self
            .active
            .as_ref()
            .and_then(|a| a.pending)
            .ok_or(GameError::NothingToSettle)?;

        match pending {
            PendingSettle::CloseQuestion => {
                let next_turn = self.current_player().ok_or(GameError::EmptyRoster)?;
                self.active = None;
                Ok(Settled::QuestionClosed { next_turn })
            }
            PendingSettle::ActivateStealer => {
                let stealer = self
                    .steal
                    .current_stealer()
                    .ok_or(GameError::NothingToSettle)?;
                if let Some(active) = self.active.as_mut() {
                    active.answered = false;
                    active.pending = None;
                }
                tracing::debug!("Player {} can now try to steal", stealer);
                Ok(Settled::StealerUp { stealer })
            }
        }
    }

    /// Close the open question without waiting for more answers.
    ///
    /// Before anyone answered this is a plain cancel. Once a steal is running
    /// it counts as every remaining stealer passing.
    pub fn abandon_question(&mut self) -> EngineResult<()> {
        self.require_phase(SessionPhase::Playing)?;
        let active = self.active.as_ref().ok_or(GameError::NoOpenQuestion)?;
        if active.pending.is_some() {
            return Err(GameError::AlreadyAnswered);
        }
        let cell = active.cell.clone();

        if let Some(original) = self.steal.original() {
            let turn = self.turn.as_mut().ok_or(GameError::EmptyRoster)?;
            let next_turn = turn.after(original);
            turn.set(next_turn)?;
            if self.settings.exhausted_steal == ExhaustedSteal::Close {
                self.board.close_unscored(&cell.category, cell.index);
            }
            self.steal.reset();
        }

        self.active = None;
        tracing::debug!("Question abandoned: {} #{}", cell.category, cell.index);
        self.finish_if_complete();
        Ok(())
    }
}
