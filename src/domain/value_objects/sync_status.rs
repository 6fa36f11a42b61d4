use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a cached interaction record has been confirmed by the backend.
/// Optimistic writes start as `PendingSync`; a successful remote call marks
/// the record `Synced`. A failed call leaves it pending, which is the signal
/// a future reconciliation pass would consume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    PendingSync,
    Synced,
}

impl SyncStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncStatus::PendingSync => "pending_sync",
            SyncStatus::Synced => "synced",
        }
    }

    pub fn is_synced(&self) -> bool {
        matches!(self, SyncStatus::Synced)
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<&str> for SyncStatus {
    fn from(value: &str) -> Self {
        match value {
            "synced" => SyncStatus::Synced,
            // Anything unrecognized reads back as pending, the conservative
            // state for reconciliation.
            _ => SyncStatus::PendingSync,
        }
    }
}
