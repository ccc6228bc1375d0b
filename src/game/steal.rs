//! Steal sub-protocol
//!
//! Starts when the player whose turn it is misses or gives up. In manual mode
//! a human picks exactly one stealer; in auto mode every other player gets a
//! turn in round-robin order after the original player, until one of them
//! answers correctly or the queue runs out.
//!
//! ```text
//! Idle -> ChoosingStealer -> StealerAnswering -> Idle
//!                                  |  ^
//!                                  +--+  (auto mode miss, queue not empty)
//! ```

use serde::{Deserialize, Serialize};

use super::{EngineResult, GameError};
use crate::types::{PlayerIndex, StealMode};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum StealState {
    Idle,
    /// Manual mode: waiting for a human to pick one of `eligible`
    ChoosingStealer {
        original: PlayerIndex,
        eligible: Vec<PlayerIndex>,
    },
    /// `candidate_order[cursor]` is answering
    StealerAnswering {
        original: PlayerIndex,
        candidate_order: Vec<PlayerIndex>,
        cursor: usize,
        mode: StealMode,
    },
}

/// What a missed steal leads to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StealProgress {
    /// Auto mode: the next candidate is up
    Next(PlayerIndex),
    /// Nobody is left; call `reset` once the handoff is applied
    Exhausted { original: PlayerIndex },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StealCoordinator {
    mode: StealMode,
    state: StealState,
}

/// Every player but `original`, round-robin starting right after them
pub fn auto_order(original: PlayerIndex, player_count: usize) -> Vec<PlayerIndex> {
    (0..player_count.saturating_sub(1))
        .map(|k| (original + 1 + k) % player_count)
        .collect()
}

/// Every player but `original`, in roster order
pub fn eligible_stealers(original: PlayerIndex, player_count: usize) -> Vec<PlayerIndex> {
    (0..player_count).filter(|i| *i != original).collect()
}

impl StealCoordinator {
    pub fn new(mode: StealMode) -> Self {
        Self {
            mode,
            state: StealState::Idle,
        }
    }

    pub fn mode(&self) -> StealMode {
        self.mode
    }

    pub fn state(&self) -> &StealState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == StealState::Idle
    }

    /// Open the steal for a miss by `original`.
    ///
    /// Returns the eligible players in roster order. In auto mode the first
    /// candidate is immediately up.
    pub fn begin(
        &mut self,
        original: PlayerIndex,
        player_count: usize,
    ) -> EngineResult<Vec<PlayerIndex>> {
        if !self.is_idle() {
            return Err(GameError::StealInProgress);
        }
        if player_count == 0 {
            return Err(GameError::EmptyRoster);
        }
        if original >= player_count {
            return Err(GameError::PlayerOutOfRange(original));
        }

        let eligible = eligible_stealers(original, player_count);
        self.state = match self.mode {
            StealMode::Manual => StealState::ChoosingStealer {
                original,
                eligible: eligible.clone(),
            },
            StealMode::Auto => StealState::StealerAnswering {
                original,
                candidate_order: auto_order(original, player_count),
                cursor: 0,
                mode: StealMode::Auto,
            },
        };
        Ok(eligible)
    }

    /// Manual mode: the chosen player gets the single steal attempt
    pub fn pick(&mut self, stealer: PlayerIndex) -> EngineResult<()> {
        let StealState::ChoosingStealer { original, eligible } = &self.state else {
            return Err(GameError::NotChoosingStealer);
        };
        if !eligible.contains(&stealer) {
            return Err(GameError::StealerNotEligible(stealer));
        }

        self.state = StealState::StealerAnswering {
            original: *original,
            candidate_order: vec![stealer],
            cursor: 0,
            mode: StealMode::Manual,
        };
        Ok(())
    }

    pub fn current_stealer(&self) -> Option<PlayerIndex> {
        match &self.state {
            StealState::StealerAnswering {
                candidate_order,
                cursor,
                ..
            } => candidate_order.get(*cursor).copied(),
            _ => None,
        }
    }

    pub fn original(&self) -> Option<PlayerIndex> {
        match &self.state {
            StealState::Idle => None,
            StealState::ChoosingStealer { original, .. }
            | StealState::StealerAnswering { original, .. } => Some(*original),
        }
    }

    /// Players a human may pick from, empty unless choosing
    pub fn eligible(&self) -> &[PlayerIndex] {
        match &self.state {
            StealState::ChoosingStealer { eligible, .. } => eligible,
            _ => &[],
        }
    }

    pub fn is_choosing(&self) -> bool {
        matches!(self.state, StealState::ChoosingStealer { .. })
    }

    /// True once every candidate had their attempt
    pub fn is_steal_over(&self) -> bool {
        match &self.state {
            StealState::StealerAnswering {
                candidate_order,
                cursor,
                ..
            } => *cursor >= candidate_order.len(),
            _ => false,
        }
    }

    /// The active stealer missed (or gave up)
    pub fn record_miss(&mut self) -> EngineResult<StealProgress> {
        let StealState::StealerAnswering {
            original,
            candidate_order,
            cursor,
            ..
        } = &mut self.state
        else {
            return Err(GameError::NoOpenQuestion);
        };
        if *cursor >= candidate_order.len() {
            return Err(GameError::NoOpenQuestion);
        }

        *cursor += 1;
        match candidate_order.get(*cursor) {
            Some(next) => Ok(StealProgress::Next(*next)),
            None => Ok(StealProgress::Exhausted {
                original: *original,
            }),
        }
    }

    /// The active stealer answered correctly. Returns `(stealer, original)`.
    pub fn record_success(&mut self) -> EngineResult<(PlayerIndex, PlayerIndex)> {
        let stealer = self.current_stealer().ok_or(GameError::NoOpenQuestion)?;
        let original = self.original().ok_or(GameError::NoOpenQuestion)?;
        self.state = StealState::Idle;
        Ok((stealer, original))
    }

    pub fn reset(&mut self) {
        self.state = StealState::Idle;
    }
}
