//! Bracket generator: level initialisation, next rounds and their preconditions.

mod common;

use common::{player_1_wins, players, players_in, Harness};
use pool_ladder::{
    BracketGenerator, BracketStatus, GroupKey, Level, MatchStatus, MemoryStore, PaymentStatus,
    Player, PlayerId, Seeding, Tournament, TournamentError, TournamentStore,
};
use std::collections::HashSet;
use std::sync::Arc;

#[test]
fn initialize_two_players_creates_the_final() {
    let h = Harness::new();
    let id = h.add(Tournament::special("Open"), &players(2));
    let outcome = h.bracket().initialize(id, Level::Special).unwrap();

    assert_eq!(outcome.status, BracketStatus::Created);
    assert_eq!(outcome.matches_created, 1);
    let m = &h.matches(id)[0];
    assert_eq!(m.round_name, "final");
    assert_eq!(m.match_name, "2_final");
    assert_eq!(m.round_number, 1);
    assert_eq!(m.status, MatchStatus::Pending);
    assert!(m.winner_id.is_none());
    assert!(m.player_1_points.is_none());
}

#[test]
fn initialize_three_players_semi_final_and_completed_bye() {
    let h = Harness::new();
    let roster = players(3);
    let id = h.add(Tournament::special("Open"), &roster);
    h.bracket().initialize(id, Level::Special).unwrap();

    let matches = h.matches(id);
    let played: Vec<_> = matches.iter().filter(|m| !m.is_bye()).collect();
    assert_eq!(played.len(), 1);
    assert_eq!(played[0].round_name, "semi_final");
    assert_eq!(played[0].match_name, "3_SF");

    let bye = matches.iter().find(|m| m.is_bye()).unwrap();
    assert_eq!(bye.status, MatchStatus::Completed);
    assert_eq!(bye.bye_player_id, Some(roster[2].id));
    assert!(bye.player_1_id.is_none() && bye.player_2_id.is_none());
}

#[test]
fn initialize_four_players_two_quarter_finals() {
    let h = Harness::new();
    let id = h.add(Tournament::special("Open"), &players(4));
    h.bracket().initialize(id, Level::Special).unwrap();

    let matches = h.matches(id);
    assert_eq!(matches.len(), 2);
    assert!(matches.iter().all(|m| m.round_name == "quarter_final"));
}

#[test]
fn initialize_five_players_writes_three_rows() {
    let h = Harness::new();
    let id = h.add(Tournament::special("Open"), &players(5));
    let outcome = h.bracket().initialize(id, Level::Special).unwrap();

    assert_eq!(outcome.matches_created, 3);
    assert_eq!(outcome.byes_created, 1);
    let matches = h.matches(id);
    assert_eq!(matches.len(), 3);
    let bye = matches.iter().find(|m| m.is_bye()).unwrap();
    assert_eq!(bye.status, MatchStatus::Completed);
    assert!(matches.iter().all(|m| m.round_name == "round_of_5"));
}

#[test]
fn initialize_six_players_has_no_byes() {
    let h = Harness::new();
    let id = h.add(Tournament::special("Open"), &players(6));
    h.bracket().initialize(id, Level::Special).unwrap();
    let matches = h.matches(id);
    assert_eq!(matches.len(), 3);
    assert!(matches.iter().all(|m| !m.is_bye()));
}

#[test]
fn lone_player_becomes_champion_without_matches() {
    let h = Harness::new();
    let roster = players(1);
    let id = h.add(Tournament::special("Open"), &roster);
    let outcome = h.bracket().initialize(id, Level::Special).unwrap();

    assert_eq!(outcome.status, BracketStatus::Decided);
    assert!(h.matches(id).is_empty());
    let winners = h.store.winners(id).unwrap();
    assert_eq!(winners.len(), 1);
    assert_eq!(winners[0].player_id, roster[0].id);
    assert_eq!(winners[0].position, 1);
    assert_eq!(winners[0].level, Level::Special);
}

#[test]
fn no_registrants_is_an_empty_outcome() {
    let h = Harness::new();
    let id = h.add(Tournament::special("Open"), &[]);
    let outcome = h.bracket().initialize(id, Level::Special).unwrap();
    assert_eq!(outcome.status, BracketStatus::Empty);
    assert!(h.matches(id).is_empty());
}

#[test]
fn initialize_twice_is_rejected() {
    let h = Harness::new();
    let id = h.add(Tournament::special("Open"), &players(4));
    h.bracket().initialize(id, Level::Special).unwrap();
    let err = h.bracket().initialize(id, Level::Special).unwrap_err();
    assert!(matches!(
        err,
        TournamentError::AlreadyInitialized {
            level: Level::Special
        }
    ));
    assert_eq!(h.matches(id).len(), 2);
}

#[test]
fn level_outside_the_format_is_rejected() {
    let h = Harness::new();
    let id = h.add(Tournament::special("Open"), &players(4));
    let err = h.bracket().initialize(id, Level::Community).unwrap_err();
    assert!(matches!(err, TournamentError::LevelNotInFormat { .. }));
}

#[test]
fn unknown_tournament_is_reported() {
    let h = Harness::new();
    let err = h
        .bracket()
        .initialize(uuid::Uuid::new_v4(), Level::Special)
        .unwrap_err();
    assert!(matches!(err, TournamentError::TournamentNotFound(_)));
}

#[test]
fn community_level_brackets_each_community_separately() {
    let h = Harness::new();
    let mut roster = players_in("A", 4, 10, 1, 1);
    roster.extend(players_in("B", 2, 11, 1, 1));
    let id = h.add(Tournament::new("Ladder"), &roster);
    let outcome = h.bracket().initialize(id, Level::Community).unwrap();

    assert_eq!(outcome.groups, 2);
    assert_eq!(outcome.matches_created, 3);
    let a_ids: HashSet<_> = roster[..4].iter().map(|p| p.id).collect();
    for m in h.matches(id) {
        let in_a = m.participants().filter(|p| a_ids.contains(p)).count();
        assert!(in_a == 0 || in_a == 2, "match {} mixes communities", m.match_name);
    }
}

#[test]
fn unapproved_registrations_are_not_bracketed() {
    let h = Harness::new();
    let roster = players(2);
    let id = h.add(Tournament::special("Open"), &roster);
    let mut pending = common::approved(id, Player::new("Late"));
    pending.payment = PaymentStatus::Unpaid;
    h.store.register(pending).unwrap();

    h.bracket().initialize(id, Level::Special).unwrap();
    assert_eq!(h.matches(id).len(), 1);
}

#[test]
fn next_round_before_results_is_round_not_complete() {
    let h = Harness::new();
    let id = h.add(Tournament::special("Open"), &players(4));
    h.bracket().initialize(id, Level::Special).unwrap();

    let err = h
        .bracket()
        .generate_next_round(id, Level::Special, GroupKey::Whole)
        .unwrap_err();
    assert!(matches!(err, TournamentError::RoundNotComplete));
    assert_eq!(err.to_string(), "Current round is not yet completed");
}

#[test]
fn next_round_without_bracket_is_not_initialized() {
    let h = Harness::new();
    let id = h.add(Tournament::special("Open"), &players(4));
    let err = h
        .bracket()
        .generate_next_round(id, Level::Special, GroupKey::Whole)
        .unwrap_err();
    assert!(matches!(err, TournamentError::NotInitialized { .. }));
}

#[test]
fn next_round_pairs_winners_and_increments_round() {
    let h = Harness::new();
    let roster = players(4);
    let id = h.add(Tournament::special("Open"), &roster);
    h.bracket().initialize(id, Level::Special).unwrap();
    h.play_all(id);

    let outcome = h
        .bracket()
        .generate_next_round(id, Level::Special, GroupKey::Whole)
        .unwrap();
    assert_eq!(outcome.matches_created, 1);

    let last = h.matches(id).pop().unwrap();
    assert_eq!(last.round_number, 2);
    assert_eq!(last.round_name, "final");
    assert_eq!(last.player_1_id, Some(roster[0].id));
    assert_eq!(last.player_2_id, Some(roster[2].id));
}

#[test]
fn bye_player_advances_into_the_final() {
    let h = Harness::new();
    let roster = players(3);
    let id = h.add(Tournament::special("Open"), &roster);
    h.bracket().initialize(id, Level::Special).unwrap();
    h.play_all(id);

    h.bracket()
        .generate_next_round(id, Level::Special, GroupKey::Whole)
        .unwrap();
    let final_match = h.matches(id).pop().unwrap();
    assert_eq!(final_match.match_name, "2_final");
    assert_eq!(final_match.player_2_id, Some(roster[2].id));
}

#[test]
fn single_winner_is_recorded_once_as_champion() {
    let h = Harness::new();
    let roster = players(2);
    let id = h.add(Tournament::special("Open"), &roster);
    h.bracket().initialize(id, Level::Special).unwrap();
    h.play_all(id);

    let outcome = h
        .bracket()
        .generate_next_round(id, Level::Special, GroupKey::Whole)
        .unwrap();
    assert_eq!(outcome.champions, vec![roster[0].id]);

    let err = h
        .bracket()
        .generate_next_round(id, Level::Special, GroupKey::Whole)
        .unwrap_err();
    assert!(matches!(err, TournamentError::GroupDecided { .. }));
    assert_eq!(h.store.winners(id).unwrap().len(), 1);
}

#[test]
fn county_level_draws_community_champions() {
    let h = Harness::new();
    let mut roster = players_in("A", 2, 10, 1, 1);
    roster.extend(players_in("B", 2, 11, 1, 1));
    let id = h.add(Tournament::new("Ladder"), &roster);
    h.bracket().initialize(id, Level::Community).unwrap();
    h.play_all(id);
    for community in [10, 11] {
        h.bracket()
            .generate_next_round(id, Level::Community, GroupKey::Community(community))
            .unwrap();
    }

    h.bracket().initialize(id, Level::County).unwrap();
    let county = h.store.matches(id, Some(Level::County)).unwrap();
    assert_eq!(county.len(), 1);
    assert_eq!(county[0].player_1_id, Some(roster[0].id));
    assert_eq!(county[0].player_2_id, Some(roster[2].id));
}

#[test]
fn later_level_without_played_predecessor_uses_registrants() {
    let h = Harness::new();
    let id = h.add(Tournament::new("Ladder"), &players_in("A", 4, 10, 1, 1));
    let outcome = h.bracket().initialize(id, Level::Regional).unwrap();
    assert_eq!(outcome.matches_created, 2);
}

#[test]
fn regional_level_seats_players_of_a_region_together() {
    let h = Harness::new();
    let roster = vec![
        Player::new("North1").located(1, 1, 7),
        Player::new("South1").located(2, 2, 3),
        Player::new("North2").located(3, 3, 7),
        Player::new("South2").located(4, 4, 3),
    ];
    let id = h.add(Tournament::new("Ladder"), &roster);
    h.bracket().initialize(id, Level::Regional).unwrap();

    let matches = h.matches(id);
    assert_eq!(matches[0].player_1_id, Some(roster[1].id));
    assert_eq!(matches[0].player_2_id, Some(roster[3].id));
    assert_eq!(matches[1].player_1_id, Some(roster[0].id));
    assert_eq!(matches[1].player_2_id, Some(roster[2].id));
}

#[test]
fn shuffled_seeding_is_deterministic_per_seed() {
    let pairings = |seed: u64| {
        let store = Arc::new(MemoryStore::new());
        let tournament = Tournament::special("Open");
        let id = tournament.id;
        store.put_tournament(tournament).unwrap();
        let roster = players(8);
        for p in &roster {
            store.register(common::approved(id, p.clone())).unwrap();
        }
        let bracket =
            BracketGenerator::new(store.clone(), store.clone(), Seeding::Shuffled { seed });
        bracket.initialize(id, Level::Special).unwrap();

        let name = |pid: Option<PlayerId>| {
            roster
                .iter()
                .find(|p| Some(p.id) == pid)
                .map(|p| p.name.clone())
                .unwrap()
        };
        store
            .matches(id, None)
            .unwrap()
            .iter()
            .map(|m| (name(m.player_1_id), name(m.player_2_id)))
            .collect::<Vec<_>>()
    };
    let first = pairings(42);
    assert_eq!(first.len(), 4);
    assert_eq!(first, pairings(42));
}

#[test]
fn results_with_points_but_no_winner_use_the_score() {
    let h = Harness::new();
    let roster = players(2);
    let id = h.add(Tournament::special("Open"), &roster);
    h.bracket().initialize(id, Level::Special).unwrap();
    let m = h.matches(id).remove(0);
    let mut result = player_1_wins(&m);
    result.winner_id = None;
    result.player_1_points = Some(2);
    result.player_2_points = Some(5);
    h.store.record_result(m.id, result).unwrap();

    let outcome = h
        .bracket()
        .generate_next_round(id, Level::Special, GroupKey::Whole)
        .unwrap();
    assert_eq!(outcome.champions, vec![roster[1].id]);
}
