use serde::{Deserialize, Serialize};

use crate::types::Player;

/// Final standings, derived from the roster once the board is done
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameResult {
    pub highest_score: u32,
    /// Every player on the highest score, in roster order
    pub winners: Vec<Player>,
}

impl GameResult {
    pub fn is_tie(&self) -> bool {
        self.winners.len() > 1
    }
}

pub fn compute_winners(players: &[Player]) -> GameResult {
    let highest_score = players.iter().map(|p| p.score).max().unwrap_or(0);
    let winners = players
        .iter()
        .filter(|p| p.score == highest_score)
        .cloned()
        .collect();

    GameResult {
        highest_score,
        winners,
    }
}
