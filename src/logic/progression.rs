//! Progression coordinator: the periodic sweep that moves brackets forward.
//!
//! Nothing is kept between runs. Each sweep re-reads match and winner rows and derives,
//! per (tournament, level, group), one of:
//!
//! - `AwaitingRound`: the current round still has non-terminal matches.
//! - `RoundComplete`: every match is terminal; the next round (or the champion) is
//!   generated.
//! - `Decided`: a champion is recorded.
//! - `Vacant`: the round finished with nobody advancing (double forfeit).
//!
//! Once every group of a level is decided or vacant the next level is initialised
//! (automatic mode) or the admins are told it is ready (manual mode). Independently,
//! a tournament with no pending match anywhere is completed and finalised.

use crate::logic::bracket::BracketGenerator;
use crate::logic::completion::{latest_round, matches_by_group, CompletionDetector};
use crate::logic::grouping::GroupingStrategy;
use crate::logic::prizes::Finalizer;
use crate::models::{
    AutomationMode, GroupKey, Level, PlayerId, Roster, Tournament, TournamentError,
    TournamentId, TournamentResult, TournamentStatus,
};
use crate::notify::{AdminResolver, Notification, NotificationKind, NotificationSink, Recipient};
use crate::store::{RegistrationSource, TournamentStore};
use serde::Serialize;
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum GroupState {
    AwaitingRound { round_number: u32, pending: usize },
    RoundComplete { round_number: u32, advancing: Vec<PlayerId> },
    Decided(PlayerId),
    Vacant,
}

impl GroupState {
    /// Nothing more will happen in this group.
    pub fn is_resolved(&self) -> bool {
        matches!(self, GroupState::Decided(_) | GroupState::Vacant)
    }
}

/// Counts for one sweep (or one tournament within it).
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct SweepReport {
    pub tournaments_checked: usize,
    pub rounds_generated: usize,
    pub champions_recorded: usize,
    pub levels_initialized: usize,
    pub admin_alerts: usize,
    pub tournaments_completed: usize,
    /// Group or level steps that failed and were skipped.
    pub failures: usize,
}

impl SweepReport {
    fn absorb(&mut self, other: SweepReport) {
        self.tournaments_checked += other.tournaments_checked;
        self.rounds_generated += other.rounds_generated;
        self.champions_recorded += other.champions_recorded;
        self.levels_initialized += other.levels_initialized;
        self.admin_alerts += other.admin_alerts;
        self.tournaments_completed += other.tournaments_completed;
        self.failures += other.failures;
    }
}

#[derive(Clone)]
pub struct ProgressionCoordinator {
    store: Arc<dyn TournamentStore>,
    registrations: Arc<dyn RegistrationSource>,
    notifier: Arc<dyn NotificationSink>,
    admins: Arc<dyn AdminResolver>,
    bracket: BracketGenerator,
    detector: CompletionDetector,
    finalizer: Finalizer,
}

impl ProgressionCoordinator {
    pub fn new(
        store: Arc<dyn TournamentStore>,
        registrations: Arc<dyn RegistrationSource>,
        notifier: Arc<dyn NotificationSink>,
        admins: Arc<dyn AdminResolver>,
        bracket: BracketGenerator,
    ) -> Self {
        Self {
            detector: CompletionDetector::new(store.clone(), registrations.clone()),
            finalizer: Finalizer::new(store.clone(), registrations.clone(), notifier.clone()),
            store,
            registrations,
            notifier,
            admins,
            bracket,
        }
    }

    pub fn bracket(&self) -> &BracketGenerator {
        &self.bracket
    }

    pub fn detector(&self) -> &CompletionDetector {
        &self.detector
    }

    /// Entry point for the scheduler: sweep every ongoing tournament.
    ///
    /// A failing tournament is logged and counted; the others are still processed.
    pub fn check_all_ongoing_tournaments(&self) -> TournamentResult<SweepReport> {
        let ongoing = self.store.tournaments_with_status(TournamentStatus::Ongoing)?;
        let mut report = SweepReport::default();
        for tournament in ongoing {
            match self.process_tournament(&tournament) {
                Ok(r) => report.absorb(r),
                Err(e) => {
                    log::error!("Sweep of tournament {} failed: {}", tournament.id, e);
                    report.tournaments_checked += 1;
                    report.failures += 1;
                }
            }
        }
        log::debug!("Sweep finished: {:?}", report);
        Ok(report)
    }

    /// Sweep one tournament by id.
    pub fn check_tournament(&self, tournament_id: TournamentId) -> TournamentResult<SweepReport> {
        let tournament = self
            .store
            .tournament(tournament_id)?
            .ok_or(TournamentError::TournamentNotFound(tournament_id))?;
        if tournament.status != TournamentStatus::Ongoing {
            return Err(TournamentError::InvalidState {
                expected: TournamentStatus::Ongoing,
                actual: tournament.status,
            });
        }
        self.process_tournament(&tournament)
    }

    fn process_tournament(&self, tournament: &Tournament) -> TournamentResult<SweepReport> {
        let mut report = SweepReport {
            tournaments_checked: 1,
            ..SweepReport::default()
        };

        for &level in tournament.levels() {
            let roster = self.detector.roster(tournament.id)?;
            let states = self.group_states(tournament.id, level, &roster)?;
            if states.is_empty() {
                continue;
            }
            for (group, state) in &states {
                log::debug!(
                    "Tournament {} {} group {}: {:?}",
                    tournament.id,
                    level,
                    group,
                    state
                );
                if let GroupState::RoundComplete { .. } = state {
                    self.advance_group(tournament, level, *group, &mut report);
                }
            }

            if self.level_resolved(tournament.id, level, &roster)? {
                self.advance_level(tournament, level, &mut report);
            }
        }

        if report.failures > 0 {
            // A failed step leaves no pending match behind; retry before completing.
            log::warn!(
                "Tournament {} had {} failed step(s); completion check deferred",
                tournament.id,
                report.failures
            );
            return Ok(report);
        }
        self.complete_if_finished(tournament, &mut report)?;
        Ok(report)
    }

    /// Derive every group's state at a level from stored rows.
    pub fn group_states(
        &self,
        tournament_id: TournamentId,
        level: Level,
        roster: &Roster,
    ) -> TournamentResult<BTreeMap<GroupKey, GroupState>> {
        let strategy = GroupingStrategy::for_level(level);
        let matches = self.store.matches(tournament_id, Some(level))?;
        let mut states = BTreeMap::new();

        for w in self.store.winners(tournament_id)? {
            if w.level == level && w.is_champion() {
                states
                    .entry(strategy.key_for_id(w.player_id, roster))
                    .or_insert(GroupState::Decided(w.player_id));
            }
        }

        for (group, group_matches) in matches_by_group(matches, strategy, roster) {
            if states.contains_key(&group) {
                continue;
            }
            let Some(round) = latest_round(&group_matches) else {
                continue;
            };
            let completion = round.completion();
            let state = if !completion.completed {
                GroupState::AwaitingRound {
                    round_number: round.round_number,
                    pending: completion.pending_matches,
                }
            } else {
                let advancing = round.advancing();
                if advancing.is_empty() {
                    GroupState::Vacant
                } else {
                    GroupState::RoundComplete {
                        round_number: round.round_number,
                        advancing,
                    }
                }
            };
            states.insert(group, state);
        }
        Ok(states)
    }

    fn level_resolved(
        &self,
        tournament_id: TournamentId,
        level: Level,
        roster: &Roster,
    ) -> TournamentResult<bool> {
        let states = self.group_states(tournament_id, level, roster)?;
        Ok(!states.is_empty() && states.values().all(GroupState::is_resolved))
    }

    /// Generate the group's next round; failures stay inside this group.
    fn advance_group(
        &self,
        tournament: &Tournament,
        level: Level,
        group: GroupKey,
        report: &mut SweepReport,
    ) {
        match self.bracket.generate_next_round(tournament.id, level, group) {
            Ok(outcome) => {
                if outcome.matches_created > 0 {
                    report.rounds_generated += 1;
                }
                report.champions_recorded += outcome.champions.len();
            }
            Err(e) => {
                log::error!(
                    "Auto-progression failed for tournament {} {} group {}: {}",
                    tournament.id,
                    level,
                    group,
                    e
                );
                report.failures += 1;
            }
        }
    }

    /// Start the next level, or alert admins in manual mode. No-op if it already started.
    fn advance_level(&self, tournament: &Tournament, level: Level, report: &mut SweepReport) {
        let Some(next) = tournament.next_level(level) else {
            return;
        };
        match self.next_level_due(tournament.id, level, next) {
            Ok(true) => {}
            Ok(false) => return,
            Err(e) => {
                log::error!(
                    "Could not inspect {} level of tournament {}: {}",
                    next,
                    tournament.id,
                    e
                );
                report.failures += 1;
                return;
            }
        }

        match tournament.automation_mode {
            AutomationMode::Automatic => match self.bracket.initialize(tournament.id, next) {
                Ok(outcome) => {
                    report.levels_initialized += 1;
                    report.champions_recorded += outcome.champions.len();
                }
                Err(e) => {
                    log::error!(
                        "Auto-initialization of {} level failed for tournament {}: {}",
                        next,
                        tournament.id,
                        e
                    );
                    report.failures += 1;
                }
            },
            AutomationMode::Manual => {
                if let Err(e) = self.alert_admins(tournament, level, next, report) {
                    log::error!(
                        "Could not alert admins about tournament {}: {}",
                        tournament.id,
                        e
                    );
                    report.failures += 1;
                }
            }
        }
    }

    /// `next` has not started and `finished` produced at least one champion.
    fn next_level_due(
        &self,
        tournament_id: TournamentId,
        finished: Level,
        next: Level,
    ) -> TournamentResult<bool> {
        if !self.store.matches(tournament_id, Some(next))?.is_empty() {
            return Ok(false);
        }
        let winners = self.store.winners(tournament_id)?;
        if winners.iter().any(|w| w.level == next) {
            return Ok(false);
        }
        let due = winners
            .iter()
            .any(|w| w.level == finished && w.is_champion());
        if !due {
            log::warn!(
                "{} level of tournament {} ended without champions; {} level not started",
                finished,
                tournament_id,
                next
            );
        }
        Ok(due)
    }

    fn alert_admins(
        &self,
        tournament: &Tournament,
        finished: Level,
        next: Level,
        report: &mut SweepReport,
    ) -> TournamentResult<()> {
        let key = format!("level_ready:{next}");
        if !self.store.mark_notified(tournament.id, &key)? {
            return Ok(());
        }
        let admins = self.admins.admins();
        if admins.is_empty() {
            log::warn!(
                "{} level of tournament {} is ready but no admin recipients are configured",
                next,
                tournament.id
            );
        }
        for admin in admins {
            self.notifier.notify(Notification {
                recipient: Recipient::Admin(admin),
                kind: NotificationKind::LevelReady,
                message: format!(
                    "{} level of {} is complete; {} level is ready to initialize",
                    finished, tournament.name, next
                ),
                data: json!({
                    "tournament_id": tournament.id,
                    "completed_level": finished,
                    "next_level": next,
                }),
            });
            report.admin_alerts += 1;
        }
        Ok(())
    }

    /// Finalise, complete and broadcast once no match in the tournament is pending.
    /// Runs regardless of automation mode.
    ///
    /// Prizes go out before the status flips, so a failed finalisation leaves the
    /// tournament ongoing and the next sweep picks it up again.
    fn complete_if_finished(
        &self,
        tournament: &Tournament,
        report: &mut SweepReport,
    ) -> TournamentResult<()> {
        let completion = self.detector.check_tournament_completion(tournament.id)?;
        if !completion.completed {
            return Ok(());
        }
        self.finalizer.finalize(tournament)?;
        if !self.store.transition_status(
            tournament.id,
            TournamentStatus::Ongoing,
            TournamentStatus::Completed,
        )? {
            return Ok(());
        }
        log::info!("Tournament {} completed", tournament.id);
        report.tournaments_completed += 1;
        self.bracket.release(tournament.id);

        for player in self.registrations.approved_players(tournament.id)? {
            self.notifier.notify(Notification {
                recipient: Recipient::Player(player.id),
                kind: NotificationKind::TournamentCompleted,
                message: format!("{} has finished. Thanks for playing!", tournament.name),
                data: json!({ "tournament_id": tournament.id }),
            });
        }
        Ok(())
    }
}
