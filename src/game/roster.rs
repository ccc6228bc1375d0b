//! Ordered roster of the players sharing the device

use super::{EngineResult, GameError};
use crate::types::{Player, PlayerId, PlayerIndex, MAX_PLAYERS, MIN_PLAYERS};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerRegistry {
    players: Vec<Player>,
}

impl PlayerRegistry {
    /// Create `count` blank players with ids `1..=count` and zero scores
    pub fn initialize(count: usize) -> EngineResult<Self> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&count) {
            return Err(GameError::Validation(format!(
                "Choose between {} and {} players.",
                MIN_PLAYERS, MAX_PLAYERS
            )));
        }

        let players = (1..=count)
            .map(|i| Player {
                id: i as PlayerId,
                name: String::new(),
                score: 0,
            })
            .collect();

        Ok(Self { players })
    }

    /// Names are not required to be unique.
    pub fn set_name(&mut self, index: PlayerIndex, name: impl Into<String>) -> EngineResult<()> {
        let player = self
            .players
            .get_mut(index)
            .ok_or(GameError::PlayerOutOfRange(index))?;
        player.name = name.into();
        Ok(())
    }

    /// True iff every player has a non-blank name
    pub fn all_named(&self) -> bool {
        !self.players.is_empty() && self.players.iter().all(|p| !p.name.trim().is_empty())
    }

    pub fn add_score(&mut self, index: PlayerIndex, points: u32) -> EngineResult<()> {
        let player = self
            .players
            .get_mut(index)
            .ok_or(GameError::PlayerOutOfRange(index))?;
        player.score = player.score.saturating_add(points);
        Ok(())
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn get(&self, index: PlayerIndex) -> Option<&Player> {
        self.players.get(index)
    }

    pub fn index_of(&self, id: PlayerId) -> Option<PlayerIndex> {
        self.players.iter().position(|p| p.id == id)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}
