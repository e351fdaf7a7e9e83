//! Persistence and registration interfaces the engine reads and writes through.
//!
//! The engine only sees plain value structs; anything that can list and insert them
//! can back it. [`MemoryStore`] serves tests and the standalone binary,
//! [`CsvRegistrations`] reads a registration export.

mod csv_source;
mod memory;

pub use csv_source::CsvRegistrations;
pub use memory::MemoryStore;

use crate::models::{
    GameMatch, Level, Player, Tournament, TournamentId, TournamentStatus, Winner, WinnerId,
};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Record not found: {0}")]
    NotFound(String),
    #[error("Store lock poisoned")]
    Poisoned,
    #[error("Invalid record: {0}")]
    InvalidRecord(String),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Tournament, match and winner rows.
pub trait TournamentStore: Send + Sync {
    fn tournament(&self, id: TournamentId) -> StoreResult<Option<Tournament>>;

    fn tournaments_with_status(&self, status: TournamentStatus) -> StoreResult<Vec<Tournament>>;

    /// Set `to` only if the current status is `from`. Returns whether it changed.
    fn transition_status(
        &self,
        id: TournamentId,
        from: TournamentStatus,
        to: TournamentStatus,
    ) -> StoreResult<bool>;

    /// Matches of a tournament in insertion order, optionally restricted to one level.
    fn matches(&self, id: TournamentId, level: Option<Level>) -> StoreResult<Vec<GameMatch>>;

    fn insert_matches(&self, matches: &[GameMatch]) -> StoreResult<()>;

    /// Winners of a tournament in insertion order.
    fn winners(&self, id: TournamentId) -> StoreResult<Vec<Winner>>;

    fn insert_winner(&self, winner: &Winner) -> StoreResult<()>;

    /// Set `prize_awarded` and `prize_amount` on a winner row not yet awarded.
    /// Returns false if it already was.
    fn award_prize(&self, id: WinnerId, amount: u64) -> StoreResult<bool>;

    /// Remember that a one-off notice went out. Returns false if it already had.
    fn mark_notified(&self, id: TournamentId, key: &str) -> StoreResult<bool>;
}

/// Registration system: approved and paid players of a tournament.
pub trait RegistrationSource: Send + Sync {
    fn approved_players(&self, tournament_id: TournamentId) -> StoreResult<Vec<Player>>;
}
