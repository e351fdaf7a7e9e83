//! Hierarchy levels and the group keys used to split a level into independent brackets.

use crate::models::player::GeoId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One stage of the geographic hierarchy, or the flat special tier.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Community,
    County,
    Regional,
    National,
    Special,
}

impl Level {
    /// Levels of a hierarchical tournament, in play order.
    pub const HIERARCHY: [Level; 4] = [
        Level::Community,
        Level::County,
        Level::Regional,
        Level::National,
    ];

    /// Levels of a special (flat) tournament.
    pub const FLAT: [Level; 1] = [Level::Special];

    /// Level that follows this one. Special and national have none.
    pub fn next(self) -> Option<Level> {
        match self {
            Level::Community => Some(Level::County),
            Level::County => Some(Level::Regional),
            Level::Regional => Some(Level::National),
            Level::National | Level::Special => None,
        }
    }

    /// Level whose champions feed this one.
    pub fn previous(self) -> Option<Level> {
        match self {
            Level::Community | Level::Special => None,
            Level::County => Some(Level::Community),
            Level::Regional => Some(Level::County),
            Level::National => Some(Level::Regional),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Level::Community => "community",
            Level::County => "county",
            Level::Regional => "regional",
            Level::National => "national",
            Level::Special => "special",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string does not name a level.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("unknown level: {0}")]
pub struct UnknownLevel(pub String);

impl FromStr for Level {
    type Err = UnknownLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "community" => Ok(Level::Community),
            "county" => Ok(Level::County),
            "regional" => Ok(Level::Regional),
            "national" => Ok(Level::National),
            "special" => Ok(Level::Special),
            other => Err(UnknownLevel(other.to_string())),
        }
    }
}

/// Identifies one independent bracket within a level.
///
/// Community and county levels split by the players' geography; players without the
/// relevant attribute share the `Unplaced` group. Regional, national and special levels
/// are a single `Whole` group.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "id")]
pub enum GroupKey {
    Community(GeoId),
    County(GeoId),
    Unplaced,
    Whole,
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::Community(id) => write!(f, "community:{id}"),
            GroupKey::County(id) => write!(f, "county:{id}"),
            GroupKey::Unplaced => f.write_str("unplaced"),
            GroupKey::Whole => f.write_str("whole"),
        }
    }
}
