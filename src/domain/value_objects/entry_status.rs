use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryStatus {
    Pending,
    InFlight,
    Failed,
    DeadLettered,
    Completed,
    Unknown(String),
}

impl EntryStatus {
    pub fn as_str(&self) -> &str {
        match self {
            EntryStatus::Pending => "pending",
            EntryStatus::InFlight => "in_flight",
            EntryStatus::Failed => "failed",
            EntryStatus::DeadLettered => "dead_lettered",
            EntryStatus::Completed => "completed",
            EntryStatus::Unknown(value) => value.as_str(),
        }
    }

    /// Entries in these states are still owed to the remote store.
    pub fn is_outstanding(&self) -> bool {
        matches!(
            self,
            EntryStatus::Pending | EntryStatus::InFlight | EntryStatus::Failed
        )
    }
}

impl From<&str> for EntryStatus {
    fn from(value: &str) -> Self {
        match value {
            "pending" => EntryStatus::Pending,
            "in_flight" => EntryStatus::InFlight,
            "failed" => EntryStatus::Failed,
            "dead_lettered" => EntryStatus::DeadLettered,
            "completed" => EntryStatus::Completed,
            other => EntryStatus::Unknown(other.to_string()),
        }
    }
}
