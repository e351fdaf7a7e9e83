//! Player, Registration and Roster data structures.

use crate::models::tournament::TournamentId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Unique identifier for a player (used in matches and lookups).
pub type PlayerId = Uuid;

/// Identifier of a community, county or region in the geography reference data.
pub type GeoId = u64;

/// A registered player. Geography is read-only here and only used for grouping.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub community_id: Option<GeoId>,
    pub county_id: Option<GeoId>,
    pub region_id: Option<GeoId>,
}

impl Player {
    /// Create a new player with the given name and no geography.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            community_id: None,
            county_id: None,
            region_id: None,
        }
    }

    /// Set community, county and region in one go.
    pub fn located(mut self, community: GeoId, county: GeoId, region: GeoId) -> Self {
        self.community_id = Some(community);
        self.county_id = Some(county);
        self.region_id = Some(region);
        self
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Unpaid,
    Paid,
}

/// A player's entry into a tournament, as kept by the registration system.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Registration {
    pub tournament_id: TournamentId,
    pub player: Player,
    pub approval: ApprovalStatus,
    pub payment: PaymentStatus,
}

impl Registration {
    /// Approved and paid: the only registrations the engine ever sees.
    pub fn is_eligible(&self) -> bool {
        self.approval == ApprovalStatus::Approved && self.payment == PaymentStatus::Paid
    }
}

/// Lookup of a tournament's approved players by id.
#[derive(Clone, Debug, Default)]
pub struct Roster {
    players: HashMap<PlayerId, Player>,
    order: Vec<PlayerId>,
}

impl Roster {
    pub fn new(players: Vec<Player>) -> Self {
        let order = players.iter().map(|p| p.id).collect();
        let players = players.into_iter().map(|p| (p.id, p)).collect();
        Self { players, order }
    }

    pub fn get(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id)
    }

    /// Players in registration order.
    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.order.iter().filter_map(|id| self.players.get(id))
    }

    /// Resolve ids to players, skipping (and logging) ids the roster does not know.
    pub fn resolve(&self, ids: &[PlayerId]) -> Vec<Player> {
        ids.iter()
            .filter_map(|id| {
                let found = self.players.get(id).cloned();
                if found.is_none() {
                    log::warn!("Player {} is not an approved registrant; skipped", id);
                }
                found
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
