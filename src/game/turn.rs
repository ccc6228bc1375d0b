use super::{EngineResult, GameError};
use crate::types::PlayerIndex;

/// Whose normal turn it is. Round-robin with wraparound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnCursor {
    current: PlayerIndex,
    player_count: usize,
}

impl TurnCursor {
    /// The first player (index 0) starts
    pub fn new(player_count: usize) -> EngineResult<Self> {
        if player_count == 0 {
            return Err(GameError::EmptyRoster);
        }
        Ok(Self {
            current: 0,
            player_count,
        })
    }

    pub fn current(&self) -> PlayerIndex {
        self.current
    }

    pub fn player_count(&self) -> usize {
        self.player_count
    }

    /// The only normal-flow advance
    pub fn advance(&mut self) {
        self.current = (self.current + 1) % self.player_count;
    }

    /// Direct set, used for the handoff after a steal
    pub fn set(&mut self, index: PlayerIndex) -> EngineResult<()> {
        if index >= self.player_count {
            return Err(GameError::PlayerOutOfRange(index));
        }
        self.current = index;
        Ok(())
    }

    /// Index of the player after `index`
    pub fn after(&self, index: PlayerIndex) -> PlayerIndex {
        (index + 1) % self.player_count
    }
}
