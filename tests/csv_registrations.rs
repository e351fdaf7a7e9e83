//! Registrations read from a CSV export.

use pool_ladder::store::CsvRegistrations;
use pool_ladder::RegistrationSource;
use uuid::Uuid;

#[test]
fn only_approved_and_paid_players_of_the_tournament() {
    let t = Uuid::new_v4();
    let other = Uuid::new_v4();
    let (p1, p2, p3, p4) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
    let data = format!(
        "tournament_id,player_id,name,community_id,county_id,region_id,approval_status,payment_status\n\
         {t},{p1},Ann, 10, 1, 1,approved,paid\n\
         {t},{p2},Ben,,,,approved,paid\n\
         {t},{p3},Cid,10,1,1,pending,paid\n\
         {other},{p4},Dee,10,1,1,approved,paid\n"
    );

    let source = CsvRegistrations::from_reader(data.as_bytes()).unwrap();
    assert_eq!(source.len(), 4);

    let players = source.approved_players(t).unwrap();
    assert_eq!(players.len(), 2);
    assert_eq!(players[0].id, p1);
    assert_eq!(players[0].community_id, Some(10));
    assert_eq!(players[1].name, "Ben");
    assert_eq!(players[1].community_id, None);
    assert_eq!(players[1].region_id, None);
}

#[test]
fn malformed_row_is_an_error() {
    let data = "tournament_id,player_id,name,community_id,county_id,region_id,approval_status,payment_status\n\
                not-a-uuid,x,Ann,,,,approved,paid\n";
    assert!(CsvRegistrations::from_reader(data.as_bytes()).is_err());
}
