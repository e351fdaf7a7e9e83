//! In-memory store behind a single `RwLock`.

use super::{RegistrationSource, StoreError, StoreResult, TournamentStore};
use crate::models::{
    GameMatch, Level, MatchId, MatchResult, Player, Registration, Tournament, TournamentId,
    TournamentStatus, Winner, WinnerId,
};
use std::collections::{HashMap, HashSet};
use std::io::Read;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Default)]
struct State {
    tournaments: HashMap<TournamentId, Tournament>,
    matches: Vec<GameMatch>,
    winners: Vec<Winner>,
    registrations: Vec<Registration>,
    notices: HashSet<(TournamentId, String)>,
}

#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, State>> {
        self.state.read().map_err(|_| StoreError::Poisoned)
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, State>> {
        self.state.write().map_err(|_| StoreError::Poisoned)
    }

    /// Insert or replace a tournament.
    pub fn put_tournament(&self, tournament: Tournament) -> StoreResult<()> {
        self.write()?.tournaments.insert(tournament.id, tournament);
        Ok(())
    }

    /// Load a JSON array of tournaments. Returns how many were loaded.
    pub fn load_tournaments<R: Read>(&self, reader: R) -> StoreResult<usize> {
        let tournaments: Vec<Tournament> = serde_json::from_reader(reader)?;
        let count = tournaments.len();
        let mut state = self.write()?;
        for t in tournaments {
            state.tournaments.insert(t.id, t);
        }
        Ok(count)
    }

    pub fn register(&self, registration: Registration) -> StoreResult<()> {
        self.write()?.registrations.push(registration);
        Ok(())
    }

    pub fn all_matches(&self) -> StoreResult<Vec<GameMatch>> {
        Ok(self.read()?.matches.clone())
    }

    /// Hook for the match-play side: store a reported result on a match.
    pub fn record_result(&self, match_id: MatchId, result: MatchResult) -> StoreResult<GameMatch> {
        let mut state = self.write()?;
        let m = state
            .matches
            .iter_mut()
            .find(|m| m.id == match_id)
            .ok_or_else(|| StoreError::NotFound(format!("match {match_id}")))?;
        if m.is_bye() {
            return Err(StoreError::InvalidRecord(format!(
                "match {match_id} is a bye"
            )));
        }
        if let Some(w) = result.winner_id {
            if m.player_1_id != Some(w) && m.player_2_id != Some(w) {
                return Err(StoreError::InvalidRecord(format!(
                    "player {w} did not play match {match_id}"
                )));
            }
        }
        m.status = result.status;
        m.player_1_points = result.player_1_points;
        m.player_2_points = result.player_2_points;
        m.winner_id = result.winner_id;
        Ok(m.clone())
    }
}

impl TournamentStore for MemoryStore {
    fn tournament(&self, id: TournamentId) -> StoreResult<Option<Tournament>> {
        Ok(self.read()?.tournaments.get(&id).cloned())
    }

    fn tournaments_with_status(&self, status: TournamentStatus) -> StoreResult<Vec<Tournament>> {
        let mut found: Vec<Tournament> = self
            .read()?
            .tournaments
            .values()
            .filter(|t| t.status == status)
            .cloned()
            .collect();
        found.sort_by_key(|t| t.id);
        Ok(found)
    }

    fn transition_status(
        &self,
        id: TournamentId,
        from: TournamentStatus,
        to: TournamentStatus,
    ) -> StoreResult<bool> {
        let mut state = self.write()?;
        let t = state
            .tournaments
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("tournament {id}")))?;
        if t.status != from {
            return Ok(false);
        }
        t.status = to;
        Ok(true)
    }

    fn matches(&self, id: TournamentId, level: Option<Level>) -> StoreResult<Vec<GameMatch>> {
        Ok(self
            .read()?
            .matches
            .iter()
            .filter(|m| m.tournament_id == id && level.map_or(true, |l| m.level == l))
            .cloned()
            .collect())
    }

    fn insert_matches(&self, matches: &[GameMatch]) -> StoreResult<()> {
        self.write()?.matches.extend_from_slice(matches);
        Ok(())
    }

    fn winners(&self, id: TournamentId) -> StoreResult<Vec<Winner>> {
        Ok(self
            .read()?
            .winners
            .iter()
            .filter(|w| w.tournament_id == id)
            .cloned()
            .collect())
    }

    fn insert_winner(&self, winner: &Winner) -> StoreResult<()> {
        self.write()?.winners.push(winner.clone());
        Ok(())
    }

    fn award_prize(&self, id: WinnerId, amount: u64) -> StoreResult<bool> {
        let mut state = self.write()?;
        let w = state
            .winners
            .iter_mut()
            .find(|w| w.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("winner {id}")))?;
        if w.prize_awarded {
            return Ok(false);
        }
        w.prize_awarded = true;
        w.prize_amount = amount;
        Ok(true)
    }

    fn mark_notified(&self, id: TournamentId, key: &str) -> StoreResult<bool> {
        Ok(self.write()?.notices.insert((id, key.to_string())))
    }
}

impl RegistrationSource for MemoryStore {
    fn approved_players(&self, tournament_id: TournamentId) -> StoreResult<Vec<Player>> {
        Ok(self
            .read()?
            .registrations
            .iter()
            .filter(|r| r.tournament_id == tournament_id && r.is_eligible())
            .map(|r| r.player.clone())
            .collect())
    }
}
