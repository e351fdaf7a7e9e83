//! Process configuration read from environment variables.

use crate::logic::Seeding;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{key} must be a number, got {value:?}")]
    InvalidNumber { key: &'static str, value: String },
    #[error("SWEEP_INTERVAL_SECS must be greater than zero")]
    ZeroInterval,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EngineConfig {
    pub host: String,
    pub port: u16,
    /// Cadence of the completion sweep.
    pub sweep_interval: Duration,
    /// Recipients of manual-mode "level ready" alerts.
    pub admin_recipients: Vec<String>,
    pub seeding: Seeding,
    pub tournaments_file: Option<PathBuf>,
    pub registrations_csv: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            sweep_interval: Duration::from_secs(5 * 60),
            admin_recipients: Vec::new(),
            seeding: Seeding::InOrder,
            tournaments_file: None,
            registrations_csv: None,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset or blank keys keep their defaults.
    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(host) = get("HOST") {
            config.host = host.trim().to_string();
        }
        if let Some(port) = get("PORT") {
            config.port = parse_number("PORT", &port)?;
        }
        if let Some(secs) = get("SWEEP_INTERVAL_SECS") {
            let secs: u64 = parse_number("SWEEP_INTERVAL_SECS", &secs)?;
            if secs == 0 {
                return Err(ConfigError::ZeroInterval);
            }
            config.sweep_interval = Duration::from_secs(secs);
        }
        if let Some(admins) = get("ADMIN_RECIPIENTS") {
            config.admin_recipients = admins
                .split(',')
                .map(str::trim)
                .filter(|a| !a.is_empty())
                .map(String::from)
                .collect();
        }
        if let Some(seed) = get("BRACKET_SHUFFLE_SEED") {
            config.seeding = Seeding::Shuffled {
                seed: parse_number("BRACKET_SHUFFLE_SEED", &seed)?,
            };
        }
        config.tournaments_file = get("TOURNAMENTS_FILE").map(PathBuf::from);
        config.registrations_csv = get("REGISTRATIONS_CSV").map(PathBuf::from);
        Ok(config)
    }
}

fn parse_number<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidNumber {
        key,
        value: value.to_string(),
    })
}
