//! Start a tournament: Upcoming -> Ongoing, then bracket the format's first level.

use crate::logic::bracket::{BracketGenerator, BracketOutcome};
use crate::models::{TournamentError, TournamentId, TournamentResult, TournamentStatus};
use crate::store::TournamentStore;

/// Open the tournament for progression and create the first level's brackets.
///
/// The status flip is a compare-and-set, so a second call fails with `InvalidState`
/// instead of bracketing twice.
pub fn start_tournament(
    store: &dyn TournamentStore,
    bracket: &BracketGenerator,
    tournament_id: TournamentId,
) -> TournamentResult<BracketOutcome> {
    let tournament = store
        .tournament(tournament_id)?
        .ok_or(TournamentError::TournamentNotFound(tournament_id))?;
    if !store.transition_status(
        tournament_id,
        TournamentStatus::Upcoming,
        TournamentStatus::Ongoing,
    )? {
        return Err(TournamentError::InvalidState {
            expected: TournamentStatus::Upcoming,
            actual: tournament.status,
        });
    }
    log::info!("Tournament {} started", tournament_id);
    bracket.initialize(tournament_id, tournament.first_level())
}
