//! Outbound notifications: admin alerts, prize awards, completion broadcasts.
//!
//! Delivery is the sink's business; the engine only decides who hears what.

use crate::models::PlayerId;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "id")]
pub enum Recipient {
    Player(PlayerId),
    Admin(String),
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// A level is ready to be initialised by an admin.
    LevelReady,
    PrizeAwarded,
    TournamentCompleted,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub recipient: Recipient,
    pub kind: NotificationKind,
    pub message: String,
    pub data: serde_json::Value,
}

pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Who receives admin-facing alerts.
pub trait AdminResolver: Send + Sync {
    fn admins(&self) -> Vec<String>;
}

/// Admin list taken from configuration.
#[derive(Clone, Debug, Default)]
pub struct StaticAdmins(pub Vec<String>);

impl AdminResolver for StaticAdmins {
    fn admins(&self) -> Vec<String> {
        self.0.clone()
    }
}

/// Writes every notification to the log.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogNotifier;

impl NotificationSink for LogNotifier {
    fn notify(&self, n: Notification) {
        log::info!("notify {:?} [{:?}]: {} {}", n.recipient, n.kind, n.message, n.data);
    }
}

/// Keeps notifications in memory for inspection.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<Notification> {
        match self.sent.lock() {
            Ok(g) => g.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn of_kind(&self, kind: NotificationKind) -> Vec<Notification> {
        self.sent().into_iter().filter(|n| n.kind == kind).collect()
    }
}

impl NotificationSink for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        match self.sent.lock() {
            Ok(mut g) => g.push(notification),
            Err(poisoned) => poisoned.into_inner().push(notification),
        }
    }
}
