//! Which geography field splits a level into groups.

use crate::models::{GameMatch, GroupKey, Level, Player, PlayerId, Roster};
use std::collections::BTreeMap;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum GroupingStrategy {
    ByCommunity,
    ByCounty,
    /// Whole level is one group.
    Single,
}

impl GroupingStrategy {
    pub fn for_level(level: Level) -> Self {
        match level {
            Level::Community => GroupingStrategy::ByCommunity,
            Level::County => GroupingStrategy::ByCounty,
            Level::Regional | Level::National | Level::Special => GroupingStrategy::Single,
        }
    }

    fn geo(self, player: &Player) -> Option<GroupKey> {
        match self {
            GroupingStrategy::ByCommunity => player.community_id.map(GroupKey::Community),
            GroupingStrategy::ByCounty => player.county_id.map(GroupKey::County),
            GroupingStrategy::Single => Some(GroupKey::Whole),
        }
    }

    pub fn key_for_player(self, player: &Player) -> GroupKey {
        self.geo(player).unwrap_or(GroupKey::Unplaced)
    }

    /// Group of a player known only by id.
    pub fn key_for_id(self, id: PlayerId, roster: &Roster) -> GroupKey {
        if self == GroupingStrategy::Single {
            return GroupKey::Whole;
        }
        roster
            .get(id)
            .map(|p| self.key_for_player(p))
            .unwrap_or(GroupKey::Unplaced)
    }

    /// Group of a match: the first participant with the geography field set.
    pub fn key_for_match(self, m: &GameMatch, roster: &Roster) -> GroupKey {
        if self == GroupingStrategy::Single {
            return GroupKey::Whole;
        }
        m.participants()
            .filter_map(|id| roster.get(id))
            .find_map(|p| self.geo(p))
            .unwrap_or(GroupKey::Unplaced)
    }

    /// Split players into groups, keeping input order within each group.
    pub fn group(self, players: Vec<Player>) -> BTreeMap<GroupKey, Vec<Player>> {
        let mut groups: BTreeMap<GroupKey, Vec<Player>> = BTreeMap::new();
        for p in players {
            groups.entry(self.key_for_player(&p)).or_default().push(p);
        }
        groups
    }
}
