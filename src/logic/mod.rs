//! Tournament business logic: partitioning, brackets, completion, progression, prizes.

mod bracket;
mod completion;
mod grouping;
mod partition;
mod prizes;
mod progression;
mod setup;

pub use bracket::{BracketGenerator, BracketOutcome, BracketStatus, Seeding};
pub use completion::{latest_round, matches_by_group, Completion, CompletionDetector, RoundView};
pub use grouping::GroupingStrategy;
pub use partition::{partition, round_name, Pairing, RoundPlan};
pub use prizes::{prize_amount, prize_share, FinalizeReport, Finalizer};
pub use progression::{GroupState, ProgressionCoordinator, SweepReport};
pub use setup::start_tournament;
