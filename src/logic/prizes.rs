//! Prize calculation and tournament finalisation.

use crate::logic::completion::{latest_round, matches_by_group};
use crate::logic::grouping::GroupingStrategy;
use crate::models::{
    GameMatch, Level, PlayerId, PrizePools, Roster, Tournament, TournamentResult, Winner,
};
use crate::notify::{Notification, NotificationKind, NotificationSink, Recipient};
use crate::store::{RegistrationSource, TournamentStore};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

/// Percentage of a level's pool paid per finishing position.
pub fn prize_share(position: u32) -> u64 {
    match position {
        1 => 50,
        2 => 30,
        3 => 20,
        _ => 0,
    }
}

/// Prize for finishing `position` at `level`. Special uses the national pool.
pub fn prize_amount(pools: &PrizePools, level: Level, position: u32) -> u64 {
    pools.for_level(level) * prize_share(position) / 100
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct FinalizeReport {
    /// Runner-up rows added at finalisation.
    pub standings_recorded: usize,
    pub prizes_awarded: usize,
    pub total_awarded: u64,
}

#[derive(Clone)]
pub struct Finalizer {
    store: Arc<dyn TournamentStore>,
    registrations: Arc<dyn RegistrationSource>,
    notifier: Arc<dyn NotificationSink>,
}

impl Finalizer {
    pub fn new(
        store: Arc<dyn TournamentStore>,
        registrations: Arc<dyn RegistrationSource>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            store,
            registrations,
            notifier,
        }
    }

    /// Record final standings, then price and award every winner row not yet awarded.
    ///
    /// Safe to run again after a partial failure: placed players and paid rows are skipped.
    pub fn finalize(&self, tournament: &Tournament) -> TournamentResult<FinalizeReport> {
        let mut report = FinalizeReport {
            standings_recorded: self.record_standings(tournament)?,
            ..FinalizeReport::default()
        };

        for winner in self.store.winners(tournament.id)? {
            if winner.prize_awarded {
                continue;
            }
            let amount = prize_amount(&tournament.prize_pools, winner.level, winner.position);
            if !self.store.award_prize(winner.id, amount)? {
                continue;
            }
            report.prizes_awarded += 1;
            report.total_awarded += amount;
            self.notifier.notify(Notification {
                recipient: Recipient::Player(winner.player_id),
                kind: NotificationKind::PrizeAwarded,
                message: format!(
                    "You finished #{} at {} level of {} and won {}",
                    winner.position, winner.level, tournament.name, amount
                ),
                data: json!({
                    "tournament_id": tournament.id,
                    "level": winner.level,
                    "position": winner.position,
                    "prize_amount": amount,
                }),
            });
        }

        log::info!(
            "Finalized tournament {}: {} prize(s), {} total",
            tournament.id,
            report.prizes_awarded,
            report.total_awarded
        );
        Ok(report)
    }

    /// Runner-up (2) and best semi-final loser (3) for each group of the deepest level played.
    fn record_standings(&self, tournament: &Tournament) -> TournamentResult<usize> {
        let mut deepest = None;
        for &level in tournament.levels().iter().rev() {
            let matches = self.store.matches(tournament.id, Some(level))?;
            if !matches.is_empty() {
                deepest = Some((level, matches));
                break;
            }
        }
        let Some((level, matches)) = deepest else {
            return Ok(0);
        };

        let roster = Roster::new(self.registrations.approved_players(tournament.id)?);
        let existing: Vec<Winner> = self
            .store
            .winners(tournament.id)?
            .into_iter()
            .filter(|w| w.level == level)
            .collect();
        let placed = |player: PlayerId| existing.iter().any(|w| w.player_id == player);

        let mut recorded = 0;
        let strategy = GroupingStrategy::for_level(level);
        for (_, group_matches) in matches_by_group(matches, strategy, &roster) {
            let Some(final_round) = latest_round(&group_matches) else {
                continue;
            };
            let played: Vec<&GameMatch> =
                final_round.matches.iter().filter(|m| !m.is_bye()).collect();
            let [final_match] = played.as_slice() else {
                continue;
            };
            if let Some(runner_up) = final_match.losing_player().filter(|p| !placed(*p)) {
                self.store
                    .insert_winner(&Winner::new(tournament.id, runner_up, level, 2))?;
                recorded += 1;
            }

            if let Some(third) = best_loser(&group_matches, final_round.round_number - 1)
                .filter(|p| !placed(*p))
            {
                self.store
                    .insert_winner(&Winner::new(tournament.id, third, level, 3))?;
                recorded += 1;
            }
        }
        Ok(recorded)
    }
}

/// Loser with the most points in the given round; earlier matches win ties.
fn best_loser(matches: &[GameMatch], round_number: u32) -> Option<PlayerId> {
    let mut best: Option<(PlayerId, u32)> = None;
    for m in matches.iter().filter(|m| m.round_number == round_number) {
        let Some(loser) = m.losing_player() else {
            continue;
        };
        let points = m.points_of(loser);
        if best.map_or(true, |(_, top)| points > top) {
            best = Some((loser, points));
        }
    }
    best.map(|(player, _)| player)
}
