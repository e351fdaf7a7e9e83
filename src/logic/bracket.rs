//! Bracket generator: builds a level's first round, and each group's next round once
//! the current one is finished.

use crate::logic::completion::latest_round;
use crate::logic::grouping::GroupingStrategy;
use crate::logic::partition::{partition, Pairing};
use crate::models::{
    GameMatch, GroupKey, Level, Player, PlayerId, Roster, Tournament, TournamentError,
    TournamentId, TournamentResult, Winner,
};
use crate::store::{RegistrationSource, TournamentStore};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// How a group's players are ordered before consecutive pairing.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Seeding {
    /// Keep the incoming order (registration order, then match order).
    #[default]
    InOrder,
    /// Deterministic shuffle; the round number is mixed into the seed.
    Shuffled { seed: u64 },
}

impl Seeding {
    pub fn apply(self, players: &mut [Player], round_number: u32) {
        if let Seeding::Shuffled { seed } = self {
            let mut rng = StdRng::seed_from_u64(seed.wrapping_add(u64::from(round_number)));
            players.shuffle(&mut rng);
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BracketStatus {
    /// At least one match was written.
    Created,
    /// Only champions were recorded (groups of one).
    Decided,
    /// Nobody to place.
    #[default]
    Empty,
}

/// What one `initialize` or `generate_next_round` call wrote.
#[derive(Clone, Debug, Default, Serialize)]
pub struct BracketOutcome {
    pub status: BracketStatus,
    pub groups: usize,
    /// Match rows written, byes included.
    pub matches_created: usize,
    pub byes_created: usize,
    pub champions: Vec<PlayerId>,
}

impl BracketOutcome {
    fn finish(mut self) -> Self {
        self.status = if self.matches_created > 0 {
            BracketStatus::Created
        } else if !self.champions.is_empty() {
            BracketStatus::Decided
        } else {
            BracketStatus::Empty
        };
        self
    }
}

/// One mutex per (tournament, level), held across the check and the write.
/// Entries of a tournament are dropped once it completes.
#[derive(Default)]
pub struct LevelLocks {
    inner: Mutex<HashMap<(TournamentId, Level), Arc<Mutex<()>>>>,
}

impl LevelLocks {
    fn handle(&self, tournament_id: TournamentId, level: Level) -> TournamentResult<Arc<Mutex<()>>> {
        let mut map = self.inner.lock().map_err(|_| TournamentError::LockPoisoned)?;
        Ok(map.entry((tournament_id, level)).or_default().clone())
    }

    fn release(&self, tournament_id: TournamentId) {
        match self.inner.lock() {
            Ok(mut map) => map.retain(|(id, _), _| *id != tournament_id),
            Err(poisoned) => poisoned
                .into_inner()
                .retain(|(id, _), _| *id != tournament_id),
        }
    }

    fn len(&self) -> usize {
        match self.inner.lock() {
            Ok(map) => map.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }
}

#[derive(Clone)]
pub struct BracketGenerator {
    store: Arc<dyn TournamentStore>,
    registrations: Arc<dyn RegistrationSource>,
    seeding: Seeding,
    locks: Arc<LevelLocks>,
}

impl BracketGenerator {
    pub fn new(
        store: Arc<dyn TournamentStore>,
        registrations: Arc<dyn RegistrationSource>,
        seeding: Seeding,
    ) -> Self {
        Self {
            store,
            registrations,
            seeding,
            locks: Arc::new(LevelLocks::default()),
        }
    }

    /// Forget the level locks of a finished tournament.
    pub fn release(&self, tournament_id: TournamentId) {
        self.locks.release(tournament_id);
    }

    /// Number of (tournament, level) locks currently tracked.
    pub fn tracked_levels(&self) -> usize {
        self.locks.len()
    }

    fn tournament(&self, id: TournamentId) -> TournamentResult<Tournament> {
        self.store
            .tournament(id)?
            .ok_or(TournamentError::TournamentNotFound(id))
    }

    fn roster(&self, id: TournamentId) -> TournamentResult<Roster> {
        Ok(Roster::new(self.registrations.approved_players(id)?))
    }

    /// Create the first round of every group at `level`.
    ///
    /// Not idempotent: fails with `AlreadyInitialized` if the level has any match or
    /// winner row.
    pub fn initialize(
        &self,
        tournament_id: TournamentId,
        level: Level,
    ) -> TournamentResult<BracketOutcome> {
        let lock = self.locks.handle(tournament_id, level)?;
        let _guard = lock.lock().map_err(|_| TournamentError::LockPoisoned)?;

        let tournament = self.tournament(tournament_id)?;
        tournament.ensure_plays(level)?;

        let has_matches = !self.store.matches(tournament_id, Some(level))?.is_empty();
        let has_winners = self
            .store
            .winners(tournament_id)?
            .iter()
            .any(|w| w.level == level);
        if has_matches || has_winners {
            return Err(TournamentError::AlreadyInitialized { level });
        }

        let roster = self.roster(tournament_id)?;
        let eligible = self.eligible_players(&tournament, level, &roster)?;
        let strategy = GroupingStrategy::for_level(level);

        let mut outcome = BracketOutcome::default();
        for (group, mut players) in strategy.group(eligible) {
            self.seeding.apply(&mut players, 1);
            if level == Level::Regional {
                // Stable: neighbours from one region meet first.
                players.sort_by_key(|p| p.region_id);
            }
            self.build_round(&tournament, level, group, 1, &players, &mut outcome)?;
        }
        let outcome = outcome.finish();
        log::info!(
            "Initialized {} level of tournament {}: {} group(s), {} match(es), {} champion(s)",
            level,
            tournament_id,
            outcome.groups,
            outcome.matches_created,
            outcome.champions.len()
        );
        Ok(outcome)
    }

    /// Pair the winners of a group's finished round into the next round.
    ///
    /// Fails with `RoundNotComplete` while any match of the current round is not
    /// terminal. A single winner is recorded as the group champion.
    pub fn generate_next_round(
        &self,
        tournament_id: TournamentId,
        level: Level,
        group: GroupKey,
    ) -> TournamentResult<BracketOutcome> {
        let lock = self.locks.handle(tournament_id, level)?;
        let _guard = lock.lock().map_err(|_| TournamentError::LockPoisoned)?;

        let tournament = self.tournament(tournament_id)?;
        tournament.ensure_plays(level)?;
        let roster = self.roster(tournament_id)?;
        let strategy = GroupingStrategy::for_level(level);

        let matches: Vec<GameMatch> = self
            .store
            .matches(tournament_id, Some(level))?
            .into_iter()
            .filter(|m| strategy.key_for_match(m, &roster) == group)
            .collect();
        let round = latest_round(&matches).ok_or(TournamentError::NotInitialized { level })?;
        if !round.completion().completed {
            return Err(TournamentError::RoundNotComplete);
        }
        if self.champion_of(tournament_id, level, group, &roster)?.is_some() {
            return Err(TournamentError::GroupDecided { level });
        }

        let advancing = roster.resolve(&round.advancing());
        if advancing.is_empty() {
            log::warn!(
                "Group {} at {} level of tournament {} has no advancing player after {}",
                group,
                level,
                tournament_id,
                round.round_name
            );
        }

        let next_round = round.round_number + 1;
        let mut outcome = BracketOutcome::default();
        for (key, mut players) in strategy.group(advancing) {
            self.seeding.apply(&mut players, next_round);
            self.build_round(&tournament, level, key, next_round, &players, &mut outcome)?;
        }
        Ok(outcome.finish())
    }

    /// Position-1 winner at `level` whose geography puts them in `group`.
    pub fn champion_of(
        &self,
        tournament_id: TournamentId,
        level: Level,
        group: GroupKey,
        roster: &Roster,
    ) -> TournamentResult<Option<PlayerId>> {
        let strategy = GroupingStrategy::for_level(level);
        Ok(self
            .store
            .winners(tournament_id)?
            .into_iter()
            .find(|w| {
                w.level == level
                    && w.is_champion()
                    && strategy.key_for_id(w.player_id, roster) == group
            })
            .map(|w| w.player_id))
    }

    /// First level of the format takes registrants; later levels take the previous
    /// level's champions. A previous level that was never played falls back to
    /// registrants.
    fn eligible_players(
        &self,
        tournament: &Tournament,
        level: Level,
        roster: &Roster,
    ) -> TournamentResult<Vec<Player>> {
        if let Some(previous) = level.previous().filter(|l| tournament.plays(*l)) {
            let winners = self.store.winners(tournament.id)?;
            let champions: Vec<PlayerId> = winners
                .iter()
                .filter(|w| w.level == previous && w.is_champion())
                .map(|w| w.player_id)
                .collect();
            if !champions.is_empty() {
                return Ok(roster.resolve(&champions));
            }
            let played = winners.iter().any(|w| w.level == previous)
                || !self.store.matches(tournament.id, Some(previous))?.is_empty();
            if played {
                log::warn!(
                    "{} level of tournament {} produced no champions",
                    previous,
                    tournament.id
                );
                return Ok(Vec::new());
            }
            log::info!(
                "{} level of tournament {} was not played; seeding {} level from registrations",
                previous,
                tournament.id,
                level
            );
        }
        Ok(roster.players().cloned().collect())
    }

    fn build_round(
        &self,
        tournament: &Tournament,
        level: Level,
        group: GroupKey,
        round_number: u32,
        players: &[Player],
        outcome: &mut BracketOutcome,
    ) -> TournamentResult<()> {
        let ids: Vec<PlayerId> = players.iter().map(|p| p.id).collect();
        let plan = partition(&ids);
        if plan.is_empty() {
            log::warn!("Group {} at {} level is empty; nothing to pair", group, level);
            return Ok(());
        }

        let mut rows = Vec::with_capacity(plan.pairings.len());
        for pairing in &plan.pairings {
            match pairing {
                Pairing::Match {
                    player_1,
                    player_2,
                    match_name,
                } => rows.push(GameMatch::new(
                    tournament.id,
                    level,
                    round_number,
                    plan.round_name.as_str(),
                    match_name.as_str(),
                    *player_1,
                    *player_2,
                )),
                Pairing::Bye { player, match_name } => rows.push(GameMatch::bye(
                    tournament.id,
                    level,
                    round_number,
                    plan.round_name.as_str(),
                    match_name.as_str(),
                    *player,
                )),
                Pairing::Champion { player } => {
                    self.store
                        .insert_winner(&Winner::new(tournament.id, *player, level, 1))?;
                    outcome.champions.push(*player);
                    log::info!(
                        "Player {} wins group {} at {} level of tournament {}",
                        player,
                        group,
                        level,
                        tournament.id
                    );
                }
            }
        }
        if !rows.is_empty() {
            self.store.insert_matches(&rows)?;
            log::info!(
                "Created {} {} match(es) for group {} at {} level (round {})",
                rows.len(),
                plan.round_name,
                group,
                level,
                round_number
            );
        }
        outcome.groups += 1;
        outcome.matches_created += rows.len();
        outcome.byes_created += plan.bye_count();
        Ok(())
    }
}
