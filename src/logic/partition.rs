//! Group partitioner: split one group's players into the pairings of a single round.
//!
//! Pairing is consecutive in list order, so callers decide seeding by ordering the
//! input. Small groups get fixed formats:
//!
//! | n      | result                                                   |
//! |--------|----------------------------------------------------------|
//! | 0      | nothing                                                  |
//! | 1      | the player is champion, no match                         |
//! | 2      | one `final`                                              |
//! | 3      | one `semi_final` for the first two, bye for the third    |
//! | 4      | two `quarter_final` matches (1-2, 3-4)                   |
//! | even   | n/2 matches, `round_of_{n}`                              |
//! | odd    | (n-1)/2 matches plus a bye for the last player           |

use crate::models::PlayerId;

/// One slot of a round.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Pairing {
    Match {
        player_1: PlayerId,
        player_2: PlayerId,
        match_name: String,
    },
    /// Unopposed advancement, stored as a pre-completed match.
    Bye { player: PlayerId, match_name: String },
    /// The group has collapsed to this player.
    Champion { player: PlayerId },
}

impl Pairing {
    pub fn players(&self) -> Vec<PlayerId> {
        match self {
            Pairing::Match {
                player_1, player_2, ..
            } => vec![*player_1, *player_2],
            Pairing::Bye { player, .. } | Pairing::Champion { player } => vec![*player],
        }
    }
}

/// Pairings of one round, all sharing a round name.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RoundPlan {
    /// Empty when there is no round to play (zero or one player).
    pub round_name: String,
    pub pairings: Vec<Pairing>,
}

impl RoundPlan {
    pub fn is_empty(&self) -> bool {
        self.pairings.is_empty()
    }

    /// Every player placed by this plan, in pairing order.
    pub fn players(&self) -> Vec<PlayerId> {
        self.pairings.iter().flat_map(Pairing::players).collect()
    }

    pub fn match_count(&self) -> usize {
        self.pairings
            .iter()
            .filter(|p| matches!(p, Pairing::Match { .. }))
            .count()
    }

    pub fn bye_count(&self) -> usize {
        self.pairings
            .iter()
            .filter(|p| matches!(p, Pairing::Bye { .. }))
            .count()
    }

    pub fn champion(&self) -> Option<PlayerId> {
        self.pairings.iter().find_map(|p| match p {
            Pairing::Champion { player } => Some(*player),
            _ => None,
        })
    }
}

/// Round label for a round entered by `n` players.
pub fn round_name(n: usize) -> String {
    match n {
        0 | 1 => String::new(),
        2 => "final".to_string(),
        3 => "semi_final".to_string(),
        4 => "quarter_final".to_string(),
        n => format!("round_of_{n}"),
    }
}

/// Partition `players` into the pairings of one round.
pub fn partition(players: &[PlayerId]) -> RoundPlan {
    let n = players.len();
    let round_name = round_name(n);
    let pairings = match players {
        [] => Vec::new(),
        [only] => vec![Pairing::Champion { player: *only }],
        [a, b] => vec![Pairing::Match {
            player_1: *a,
            player_2: *b,
            match_name: format!("{n}_final"),
        }],
        [a, b, c] => vec![
            Pairing::Match {
                player_1: *a,
                player_2: *b,
                match_name: format!("{n}_SF"),
            },
            Pairing::Bye {
                player: *c,
                match_name: format!("{n}_BYE"),
            },
        ],
        [a, b, c, d] => vec![
            Pairing::Match {
                player_1: *a,
                player_2: *b,
                match_name: format!("{n}_QF1"),
            },
            Pairing::Match {
                player_1: *c,
                player_2: *d,
                match_name: format!("{n}_QF2"),
            },
        ],
        _ => {
            let mut pairings: Vec<Pairing> = players
                .chunks_exact(2)
                .enumerate()
                .map(|(i, pair)| Pairing::Match {
                    player_1: pair[0],
                    player_2: pair[1],
                    match_name: format!("{n}_M{}", i + 1),
                })
                .collect();
            if let [odd] = players.chunks_exact(2).remainder() {
                pairings.push(Pairing::Bye {
                    player: *odd,
                    match_name: format!("{n}_BYE"),
                });
            }
            pairings
        }
    };
    RoundPlan {
        round_name,
        pairings,
    }
}
