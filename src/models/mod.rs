//! Data structures for the engine: tournaments, players, matches, winners, levels.

mod game;
mod level;
mod player;
mod tournament;
mod winner;

pub use game::{GameMatch, MatchId, MatchResult, MatchStatus};
pub use level::{GroupKey, Level, UnknownLevel};
pub use player::{ApprovalStatus, GeoId, PaymentStatus, Player, PlayerId, Registration, Roster};
pub use tournament::{
    AutomationMode, PrizePools, Tournament, TournamentError, TournamentId, TournamentResult,
    TournamentStatus,
};
pub use winner::{Winner, WinnerId};
