use crate::domain::entities::DayContext;
use crate::domain::value_objects::{
    EntryId, EntryStatus, RemoteRowId, UserId, WorkoutPayload, WriteOp,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A deferred remote write awaiting confirmation.
///
/// An `Update` whose target row was created by a still-pending `Create`
/// carries `depends_on` instead of `remote_row_id`; the row id is filled in
/// once the prerequisite entry syncs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueueEntry {
    pub id: EntryId,
    pub op: WriteOp,
    pub user_id: UserId,
    pub payload: WorkoutPayload,
    pub status: EntryStatus,
    pub remote_row_id: Option<RemoteRowId>,
    pub depends_on: Option<EntryId>,
    pub retry_count: u32,
    pub max_retries: u32,
    pub next_attempt_at: Option<DateTime<Utc>>,
    pub saved_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub synced_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub meta: Option<DayContext>,
}

impl QueueEntry {
    pub fn is_outstanding(&self) -> bool {
        self.status.is_outstanding()
    }

    /// True for a dependent update whose prerequisite create has not yet
    /// produced a remote row id.
    pub fn awaits_prerequisite(&self) -> bool {
        self.op == WriteOp::Update && self.remote_row_id.is_none() && self.depends_on.is_some()
    }
}

/// What a caller supplies when enqueueing; identifier, status and timestamps
/// are generated by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct QueueEntryDraft {
    pub op: WriteOp,
    pub user_id: UserId,
    pub payload: WorkoutPayload,
    pub remote_row_id: Option<RemoteRowId>,
    pub depends_on: Option<EntryId>,
    pub meta: Option<DayContext>,
}

impl QueueEntryDraft {
    pub fn create(user_id: UserId, payload: WorkoutPayload, meta: Option<DayContext>) -> Self {
        Self {
            op: WriteOp::Create,
            user_id,
            payload,
            remote_row_id: None,
            depends_on: None,
            meta,
        }
    }

    pub fn update(
        user_id: UserId,
        payload: WorkoutPayload,
        row_id: RemoteRowId,
        meta: Option<DayContext>,
    ) -> Self {
        Self {
            op: WriteOp::Update,
            user_id,
            payload,
            remote_row_id: Some(row_id),
            depends_on: None,
            meta,
        }
    }

    pub fn dependent_update(
        user_id: UserId,
        payload: WorkoutPayload,
        prerequisite: EntryId,
        meta: Option<DayContext>,
    ) -> Self {
        Self {
            op: WriteOp::Update,
            user_id,
            payload,
            remote_row_id: None,
            depends_on: Some(prerequisite),
            meta,
        }
    }
}
