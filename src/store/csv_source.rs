//! Registration source backed by a CSV export from the registration system.
//!
//! Expected header:
//! `tournament_id,player_id,name,community_id,county_id,region_id,approval_status,payment_status`.
//! Empty geography cells mean the attribute is unknown.

use super::{RegistrationSource, StoreResult};
use crate::models::{
    ApprovalStatus, GeoId, PaymentStatus, Player, PlayerId, Registration, TournamentId,
};
use serde::Deserialize;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct Row {
    tournament_id: TournamentId,
    player_id: PlayerId,
    name: String,
    community_id: Option<GeoId>,
    county_id: Option<GeoId>,
    region_id: Option<GeoId>,
    approval_status: ApprovalStatus,
    payment_status: PaymentStatus,
}

impl From<Row> for Registration {
    fn from(row: Row) -> Self {
        Registration {
            tournament_id: row.tournament_id,
            player: Player {
                id: row.player_id,
                name: row.name,
                community_id: row.community_id,
                county_id: row.county_id,
                region_id: row.region_id,
            },
            approval: row.approval_status,
            payment: row.payment_status,
        }
    }
}

/// Registrations loaded once from CSV and served from memory.
#[derive(Clone, Debug, Default)]
pub struct CsvRegistrations {
    registrations: Vec<Registration>,
}

impl CsvRegistrations {
    pub fn from_path(path: impl AsRef<Path>) -> StoreResult<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> StoreResult<Self> {
        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let registrations = rdr
            .deserialize::<Row>()
            .map(|row| row.map(Registration::from))
            .collect::<Result<Vec<_>, _>>()?;
        log::info!("Loaded {} registration(s) from CSV", registrations.len());
        Ok(Self { registrations })
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }
}

impl RegistrationSource for CsvRegistrations {
    fn approved_players(&self, tournament_id: TournamentId) -> StoreResult<Vec<Player>> {
        Ok(self
            .registrations
            .iter()
            .filter(|r| r.tournament_id == tournament_id && r.is_eligible())
            .map(|r| r.player.clone())
            .collect())
    }
}
