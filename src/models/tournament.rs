//! Tournament, its status and prize pools, and the engine error type.

use crate::models::level::Level;
use crate::store::StoreError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Errors that can occur during bracket and progression operations.
#[derive(Debug, thiserror::Error)]
pub enum TournamentError {
    #[error("Tournament not found: {0}")]
    TournamentNotFound(TournamentId),
    /// Matches (or a lone-player winner) already exist for the level.
    #[error("Bracket already initialized for {level} level")]
    AlreadyInitialized { level: Level },
    /// `generate_next_round` was called before every match of the round was terminal.
    #[error("Current round is not yet completed")]
    RoundNotComplete,
    #[error("No bracket exists for this group at {level} level")]
    NotInitialized { level: Level },
    #[error("Group at {level} level already has a champion")]
    GroupDecided { level: Level },
    /// Special levels in a hierarchical tournament, or the reverse.
    #[error("{level} level is not part of this tournament's format")]
    LevelNotInFormat { level: Level },
    #[error("Tournament not in correct state: expected {expected:?}, got {actual:?}")]
    InvalidState {
        expected: TournamentStatus,
        actual: TournamentStatus,
    },
    #[error("Bracket lock poisoned")]
    LockPoisoned,
    #[error("Persistence error: {0}")]
    Persistence(#[from] StoreError),
}

pub type TournamentResult<T> = Result<T, TournamentError>;

/// Unique identifier for a tournament.
pub type TournamentId = Uuid;

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentStatus {
    #[default]
    Upcoming,
    Ongoing,
    Completed,
}

/// Whether level transitions run without an admin.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutomationMode {
    #[default]
    Automatic,
    Manual,
}

/// Prize pool per level. The national pool also pays the special tier.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct PrizePools {
    pub community: u64,
    pub county: u64,
    pub regional: u64,
    pub national: u64,
}

impl PrizePools {
    pub fn for_level(&self, level: Level) -> u64 {
        match level {
            Level::Community => self.community,
            Level::County => self.county,
            Level::Regional => self.regional,
            Level::National | Level::Special => self.national,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    /// Flat single-tier tournament instead of the geographic hierarchy.
    #[serde(default)]
    pub special: bool,
    #[serde(default)]
    pub automation_mode: AutomationMode,
    #[serde(default)]
    pub prize_pools: PrizePools,
    #[serde(default)]
    pub status: TournamentStatus,
}

impl Tournament {
    /// Create a new hierarchical, automatic tournament in Upcoming status.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            special: false,
            automation_mode: AutomationMode::Automatic,
            prize_pools: PrizePools::default(),
            status: TournamentStatus::Upcoming,
        }
    }

    /// Same as `new`, but flat (special tier only).
    pub fn special(name: impl Into<String>) -> Self {
        Self {
            special: true,
            ..Self::new(name)
        }
    }

    pub fn with_mode(mut self, mode: AutomationMode) -> Self {
        self.automation_mode = mode;
        self
    }

    pub fn with_prize_pools(mut self, pools: PrizePools) -> Self {
        self.prize_pools = pools;
        self
    }

    /// Levels played by this tournament, in order.
    pub fn levels(&self) -> &'static [Level] {
        if self.special {
            &Level::FLAT
        } else {
            &Level::HIERARCHY
        }
    }

    pub fn first_level(&self) -> Level {
        self.levels()[0]
    }

    pub fn plays(&self, level: Level) -> bool {
        self.levels().contains(&level)
    }

    /// Level after `level` within this tournament's format.
    pub fn next_level(&self, level: Level) -> Option<Level> {
        if self.special {
            None
        } else {
            level.next()
        }
    }

    /// Error unless `level` belongs to this tournament's format.
    pub fn ensure_plays(&self, level: Level) -> TournamentResult<()> {
        if self.plays(level) {
            Ok(())
        } else {
            Err(TournamentError::LevelNotInFormat { level })
        }
    }
}
