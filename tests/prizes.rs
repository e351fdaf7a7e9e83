//! Prize split and tournament finalisation.

mod common;

use common::{players, Harness};
use pool_ladder::logic::{prize_amount, prize_share};
use pool_ladder::notify::{NotificationKind, Recipient};
use pool_ladder::{Finalizer, Level, PrizePools, Tournament, TournamentStore, Winner};
use proptest::prelude::*;
use std::sync::Arc;

fn pools(amount: u64) -> PrizePools {
    PrizePools {
        community: amount,
        county: amount * 2,
        regional: amount * 3,
        national: amount * 4,
    }
}

#[test]
fn top_three_split_fifty_thirty_twenty() {
    let p = pools(1000);
    assert_eq!(prize_amount(&p, Level::Community, 1), 500);
    assert_eq!(prize_amount(&p, Level::Community, 2), 300);
    assert_eq!(prize_amount(&p, Level::Community, 3), 200);
    assert_eq!(prize_amount(&p, Level::Community, 4), 0);
}

#[test]
fn special_level_uses_the_national_pool() {
    let p = pools(1000);
    assert_eq!(prize_amount(&p, Level::Special, 1), 2000);
    assert_eq!(prize_amount(&p, Level::National, 1), 2000);
    assert_eq!(prize_amount(&p, Level::Regional, 1), 1500);
}

#[test]
fn empty_pool_pays_nothing() {
    assert_eq!(prize_amount(&PrizePools::default(), Level::County, 1), 0);
}

proptest! {
    #[test]
    fn payouts_never_exceed_the_pool(pool in 0u64..10_000_000) {
        let p = PrizePools { community: pool, ..PrizePools::default() };
        let paid: u64 = (1..=5).map(|pos| prize_amount(&p, Level::Community, pos)).sum();
        prop_assert!(paid <= pool);
        prop_assert_eq!((1..=5).map(prize_share).sum::<u64>(), 100);
    }
}

#[test]
fn finalize_records_standings_and_awards_once() {
    let h = Harness::new();
    let roster = players(4);
    let tournament = Tournament::special("Open").with_prize_pools(PrizePools {
        national: 600,
        ..PrizePools::default()
    });
    let id = h.add(tournament.clone(), &roster);
    let bracket = h.bracket();
    bracket.initialize(id, Level::Special).unwrap();
    h.play_all(id);
    bracket
        .generate_next_round(id, Level::Special, pool_ladder::GroupKey::Whole)
        .unwrap();
    h.play_all(id);
    let outcome = bracket
        .generate_next_round(id, Level::Special, pool_ladder::GroupKey::Whole)
        .unwrap();
    assert_eq!(outcome.champions, vec![roster[0].id]);

    let finalizer = Finalizer::new(h.store.clone(), h.store.clone(), h.notifier.clone());
    let report = finalizer.finalize(&tournament).unwrap();
    assert_eq!(report.standings_recorded, 2);
    assert_eq!(report.prizes_awarded, 3);
    assert_eq!(report.total_awarded, 300 + 180 + 120);

    let winners = h.store.winners(id).unwrap();
    let position_of = |w: &Winner| (w.player_id, w.position, w.prize_amount);
    let mut placed: Vec<_> = winners.iter().map(position_of).collect();
    placed.sort_by_key(|(_, pos, _)| *pos);
    // Both quarter finals end 7-3, so the first one's loser takes third.
    assert_eq!(
        placed,
        vec![
            (roster[0].id, 1, 300),
            (roster[2].id, 2, 180),
            (roster[1].id, 3, 120),
        ]
    );

    let awards = h.notifier.of_kind(NotificationKind::PrizeAwarded);
    assert_eq!(awards.len(), 3);
    assert_eq!(awards[0].recipient, Recipient::Player(roster[0].id));
    assert_eq!(awards[0].data["prize_amount"], 300);

    let again = finalizer.finalize(&tournament).unwrap();
    assert_eq!(again.standings_recorded, 0);
    assert_eq!(again.prizes_awarded, 0);
    assert_eq!(h.notifier.of_kind(NotificationKind::PrizeAwarded).len(), 3);
}

#[test]
fn finalize_without_matches_awards_nothing() {
    let h = Harness::new();
    let tournament = Tournament::special("Empty");
    h.add(tournament.clone(), &[]);
    let finalizer = Finalizer::new(h.store.clone(), h.store.clone(), Arc::new(
        pool_ladder::notify::RecordingNotifier::new(),
    ));
    let report = finalizer.finalize(&tournament).unwrap();
    assert_eq!(report.standings_recorded, 0);
    assert_eq!(report.prizes_awarded, 0);
}
