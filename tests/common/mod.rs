//! Shared fixtures: an in-memory store, a recording notifier and helpers to play matches.

#![allow(dead_code)]

use pool_ladder::notify::{RecordingNotifier, StaticAdmins};
use pool_ladder::{
    ApprovalStatus, BracketGenerator, GameMatch, MatchResult, MatchStatus, MemoryStore,
    PaymentStatus, Player, ProgressionCoordinator, Registration, Seeding, Tournament,
    TournamentId, TournamentStore,
};
use std::sync::Arc;

pub const ADMIN: &str = "admin@example.com";

pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub notifier: Arc<RecordingNotifier>,
    pub coordinator: ProgressionCoordinator,
}

impl Harness {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let bracket = BracketGenerator::new(store.clone(), store.clone(), Seeding::InOrder);
        let coordinator = ProgressionCoordinator::new(
            store.clone(),
            store.clone(),
            notifier.clone(),
            Arc::new(StaticAdmins(vec![ADMIN.to_string()])),
            bracket,
        );
        Self {
            store,
            notifier,
            coordinator,
        }
    }

    pub fn bracket(&self) -> &BracketGenerator {
        self.coordinator.bracket()
    }

    /// Store the tournament and register every player as approved and paid.
    pub fn add(&self, tournament: Tournament, players: &[Player]) -> TournamentId {
        let id = tournament.id;
        self.store.put_tournament(tournament).unwrap();
        for p in players {
            self.store.register(approved(id, p.clone())).unwrap();
        }
        id
    }

    pub fn matches(&self, id: TournamentId) -> Vec<GameMatch> {
        self.store.matches(id, None).unwrap()
    }

    /// Finish every open match with player 1 winning 7-3. Returns how many were played.
    pub fn play_all(&self, id: TournamentId) -> usize {
        let open: Vec<GameMatch> = self
            .matches(id)
            .into_iter()
            .filter(|m| !m.is_terminal())
            .collect();
        for m in &open {
            self.store
                .record_result(m.id, player_1_wins(m))
                .unwrap();
        }
        open.len()
    }
}

pub fn approved(tournament_id: TournamentId, player: Player) -> Registration {
    Registration {
        tournament_id,
        player,
        approval: ApprovalStatus::Approved,
        payment: PaymentStatus::Paid,
    }
}

pub fn player_1_wins(m: &GameMatch) -> MatchResult {
    MatchResult {
        status: MatchStatus::Completed,
        player_1_points: Some(7),
        player_2_points: Some(3),
        winner_id: m.player_1_id,
    }
}

/// `n` players named `{prefix}{i}` living in one community.
pub fn players_in(prefix: &str, n: usize, community: u64, county: u64, region: u64) -> Vec<Player> {
    (1..=n)
        .map(|i| Player::new(format!("{prefix}{i}")).located(community, county, region))
        .collect()
}

/// `n` players with no geography.
pub fn players(n: usize) -> Vec<Player> {
    (1..=n).map(|i| Player::new(format!("P{i}"))).collect()
}
