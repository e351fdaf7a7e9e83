//! Completion detector: is a round, group, level or whole tournament finished, and who advances.
//!
//! "Completed" needs at least one match in scope and every match terminal. An empty
//! scope has not started yet, which is different from done. The whole-tournament
//! check also accepts a tournament decided purely by Winner rows.

use crate::logic::grouping::GroupingStrategy;
use crate::models::{
    GameMatch, GroupKey, Level, PlayerId, Roster, TournamentId, TournamentResult,
};
use crate::store::{RegistrationSource, TournamentStore};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct Completion {
    pub completed: bool,
    pub pending_matches: usize,
}

impl Completion {
    pub fn of<'a>(matches: impl IntoIterator<Item = &'a GameMatch>) -> Self {
        let mut total = 0;
        let mut pending = 0;
        for m in matches {
            total += 1;
            if !m.is_terminal() {
                pending += 1;
            }
        }
        Self {
            completed: total > 0 && pending == 0,
            pending_matches: pending,
        }
    }
}

/// The matches of one round of one group.
#[derive(Clone, Debug)]
pub struct RoundView {
    pub round_number: u32,
    pub round_name: String,
    pub matches: Vec<GameMatch>,
}

impl RoundView {
    pub fn completion(&self) -> Completion {
        Completion::of(&self.matches)
    }

    /// Players moving on, in match order. Only meaningful once the round is complete.
    pub fn advancing(&self) -> Vec<PlayerId> {
        self.matches
            .iter()
            .filter_map(GameMatch::advancing_player)
            .collect()
    }
}

/// Split a level's matches into groups.
pub fn matches_by_group(
    matches: Vec<GameMatch>,
    strategy: GroupingStrategy,
    roster: &Roster,
) -> BTreeMap<GroupKey, Vec<GameMatch>> {
    let mut groups: BTreeMap<GroupKey, Vec<GameMatch>> = BTreeMap::new();
    for m in matches {
        groups
            .entry(strategy.key_for_match(&m, roster))
            .or_default()
            .push(m);
    }
    groups
}

/// Highest-numbered round among one group's matches.
pub fn latest_round(matches: &[GameMatch]) -> Option<RoundView> {
    let round_number = matches.iter().map(|m| m.round_number).max()?;
    let matches: Vec<GameMatch> = matches
        .iter()
        .filter(|m| m.round_number == round_number)
        .cloned()
        .collect();
    let round_name = matches
        .first()
        .map(|m| m.round_name.clone())
        .unwrap_or_default();
    Some(RoundView {
        round_number,
        round_name,
        matches,
    })
}

/// Read-only queries over stored matches.
#[derive(Clone)]
pub struct CompletionDetector {
    store: Arc<dyn TournamentStore>,
    registrations: Arc<dyn RegistrationSource>,
}

impl CompletionDetector {
    pub fn new(store: Arc<dyn TournamentStore>, registrations: Arc<dyn RegistrationSource>) -> Self {
        Self {
            store,
            registrations,
        }
    }

    pub fn roster(&self, tournament_id: TournamentId) -> TournamentResult<Roster> {
        Ok(Roster::new(
            self.registrations.approved_players(tournament_id)?,
        ))
    }

    /// Matches of a level, restricted to one group when `group` is given.
    fn scoped(
        &self,
        tournament_id: TournamentId,
        level: Level,
        group: Option<GroupKey>,
    ) -> TournamentResult<Vec<GameMatch>> {
        let matches = self.store.matches(tournament_id, Some(level))?;
        let Some(group) = group else {
            return Ok(matches);
        };
        let strategy = GroupingStrategy::for_level(level);
        let roster = self.roster(tournament_id)?;
        Ok(matches
            .into_iter()
            .filter(|m| strategy.key_for_match(m, &roster) == group)
            .collect())
    }

    /// Whole level, or one group of it.
    pub fn check_level_completion(
        &self,
        tournament_id: TournamentId,
        level: Level,
        group: Option<GroupKey>,
    ) -> TournamentResult<Completion> {
        let matches = self.scoped(tournament_id, level, group)?;
        Ok(Completion::of(&matches))
    }

    /// One named round of a level, or of one group of it.
    pub fn check_round_completion(
        &self,
        tournament_id: TournamentId,
        level: Level,
        round_name: &str,
        group: Option<GroupKey>,
    ) -> TournamentResult<Completion> {
        let matches = self.scoped(tournament_id, level, group)?;
        Ok(Completion::of(
            matches.iter().filter(|m| m.round_name == round_name),
        ))
    }

    /// No level or round filter: done once nothing in the tournament is pending.
    ///
    /// A started tournament whose groups were all decided without a match (groups of
    /// one) has only Winner rows; that counts as done too.
    pub fn check_tournament_completion(
        &self,
        tournament_id: TournamentId,
    ) -> TournamentResult<Completion> {
        let matches = self.store.matches(tournament_id, None)?;
        if matches.is_empty() {
            let decided = !self.store.winners(tournament_id)?.is_empty();
            return Ok(Completion {
                completed: decided,
                pending_matches: 0,
            });
        }
        Ok(Completion::of(&matches))
    }

    /// Latest round of one group at a level, if the group has any matches.
    pub fn current_round(
        &self,
        tournament_id: TournamentId,
        level: Level,
        group: GroupKey,
    ) -> TournamentResult<Option<RoundView>> {
        let matches = self.scoped(tournament_id, level, Some(group))?;
        Ok(latest_round(&matches))
    }
}
