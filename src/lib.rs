//! Pool tournament ladder: bracket generation and progression across
//! community, county, regional and national levels (or a flat special tier).

pub mod config;
pub mod logic;
pub mod models;
pub mod notify;
pub mod scheduler;
pub mod store;

pub use config::{ConfigError, EngineConfig};
pub use logic::{
    partition, start_tournament, BracketGenerator, BracketOutcome, BracketStatus, Completion,
    CompletionDetector, Finalizer, GroupingStrategy, Pairing, ProgressionCoordinator,
    RoundPlan, Seeding, SweepReport,
};
pub use models::{
    ApprovalStatus, AutomationMode, GameMatch, GroupKey, Level, MatchId, MatchResult,
    MatchStatus, PaymentStatus, Player, PlayerId, PrizePools, Registration, Tournament,
    TournamentError, TournamentId, TournamentStatus, Winner,
};
pub use store::{MemoryStore, RegistrationSource, StoreError, TournamentStore};
