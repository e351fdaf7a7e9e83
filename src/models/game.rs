//! Match record for 1v1 knockout games, including pre-completed byes.

use crate::models::level::Level;
use crate::models::player::PlayerId;
use crate::models::tournament::TournamentId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a match.
pub type MatchId = Uuid;

/// Lifecycle of a match. `Completed` and `Forfeit` are terminal.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    #[default]
    Pending,
    Scheduled,
    InProgress,
    Completed,
    Forfeit,
}

impl MatchStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, MatchStatus::Completed | MatchStatus::Forfeit)
    }
}

/// A single match at one level and round. A bye has only `bye_player_id` set.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GameMatch {
    pub id: MatchId,
    pub tournament_id: TournamentId,
    pub level: Level,
    /// 1-based round within this level and group.
    pub round_number: u32,
    pub round_name: String,
    pub match_name: String,
    pub player_1_id: Option<PlayerId>,
    pub player_2_id: Option<PlayerId>,
    pub bye_player_id: Option<PlayerId>,
    pub status: MatchStatus,
    pub player_1_points: Option<u32>,
    pub player_2_points: Option<u32>,
    /// None until the match is resolved.
    pub winner_id: Option<PlayerId>,
    pub created_at: DateTime<Utc>,
}

impl GameMatch {
    /// Ordinary match: both slots set, pending, no score.
    pub fn new(
        tournament_id: TournamentId,
        level: Level,
        round_number: u32,
        round_name: impl Into<String>,
        match_name: impl Into<String>,
        player_1: PlayerId,
        player_2: PlayerId,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            tournament_id,
            level,
            round_number,
            round_name: round_name.into(),
            match_name: match_name.into(),
            player_1_id: Some(player_1),
            player_2_id: Some(player_2),
            bye_player_id: None,
            status: MatchStatus::Pending,
            player_1_points: None,
            player_2_points: None,
            winner_id: None,
            created_at: Utc::now(),
        }
    }

    /// Bye: created already completed, the lone player is the winner.
    pub fn bye(
        tournament_id: TournamentId,
        level: Level,
        round_number: u32,
        round_name: impl Into<String>,
        match_name: impl Into<String>,
        player: PlayerId,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            tournament_id,
            level,
            round_number,
            round_name: round_name.into(),
            match_name: match_name.into(),
            player_1_id: None,
            player_2_id: None,
            bye_player_id: Some(player),
            status: MatchStatus::Completed,
            player_1_points: None,
            player_2_points: None,
            winner_id: Some(player),
            created_at: Utc::now(),
        }
    }

    pub fn is_bye(&self) -> bool {
        self.bye_player_id.is_some()
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Every player referenced by this match, in slot order.
    pub fn participants(&self) -> impl Iterator<Item = PlayerId> {
        [self.player_1_id, self.player_2_id, self.bye_player_id]
            .into_iter()
            .flatten()
    }

    /// Player who moves on from this match, if it is resolved and anyone does.
    ///
    /// A completed match without `winner_id` falls back to the score; level scores and
    /// double forfeits advance nobody.
    pub fn advancing_player(&self) -> Option<PlayerId> {
        if !self.is_terminal() {
            return None;
        }
        if let Some(bye) = self.bye_player_id {
            return Some(bye);
        }
        if self.winner_id.is_some() {
            return self.winner_id;
        }
        if self.status != MatchStatus::Completed {
            return None;
        }
        match (self.player_1_points, self.player_2_points) {
            (Some(a), Some(b)) if a > b => self.player_1_id,
            (Some(a), Some(b)) if b > a => self.player_2_id,
            _ => None,
        }
    }

    /// Losing side of a decided two-player match.
    pub fn losing_player(&self) -> Option<PlayerId> {
        if self.is_bye() {
            return None;
        }
        let winner = self.advancing_player()?;
        [self.player_1_id, self.player_2_id]
            .into_iter()
            .flatten()
            .find(|&p| p != winner)
    }

    /// Points scored by the given player in this match (0 if unrecorded).
    pub fn points_of(&self, player: PlayerId) -> u32 {
        if self.player_1_id == Some(player) {
            self.player_1_points.unwrap_or(0)
        } else if self.player_2_id == Some(player) {
            self.player_2_points.unwrap_or(0)
        } else {
            0
        }
    }
}

/// Result reported by the match-play subsystem.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub status: MatchStatus,
    pub player_1_points: Option<u32>,
    pub player_2_points: Option<u32>,
    pub winner_id: Option<PlayerId>,
}
