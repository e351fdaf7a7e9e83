//! Finishing positions recorded per level, and the prize fields set at finalisation.

use crate::models::level::Level;
use crate::models::player::PlayerId;
use crate::models::tournament::TournamentId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type WinnerId = Uuid;

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Winner {
    pub id: WinnerId,
    pub tournament_id: TournamentId,
    pub player_id: PlayerId,
    pub level: Level,
    /// 1-based finishing position.
    pub position: u32,
    pub prize_awarded: bool,
    pub prize_amount: u64,
    pub created_at: DateTime<Utc>,
}

impl Winner {
    pub fn new(tournament_id: TournamentId, player_id: PlayerId, level: Level, position: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            tournament_id,
            player_id,
            level,
            position,
            prize_awarded: false,
            prize_amount: 0,
            created_at: Utc::now(),
        }
    }

    /// Group champion: position 1 at its level.
    pub fn is_champion(&self) -> bool {
        self.position == 1
    }
}
