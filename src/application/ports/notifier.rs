use crate::domain::value_objects::EntryId;
use serde::{Deserialize, Serialize};

/// Transient user-facing notices emitted by the engine. Display duration and
/// styling are the embedding UI's concern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    WentOffline,
    BackOnline,
    Saved,
    SavedLocally { pending: u32 },
    SyncDeferred { pending: u32 },
    DeadLettered { entry_id: EntryId },
    AllSynced,
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}
