use crate::domain::entities::{QueueEntry, QueueEntryDraft};
use crate::domain::value_objects::{EntryId, EntryStatus, RemoteRowId};
use crate::shared::error::AppError;
use async_trait::async_trait;

/// Durable FIFO queue of deferred remote writes.
///
/// Enqueue order is replay order. Entries leave the outstanding states only
/// through `mark_completed` (confirmed remote success), dead-lettering after
/// `max_retries` failures, or a manual `discard`.
#[async_trait]
pub trait QueueStore: Send + Sync {
    async fn enqueue(&self, draft: QueueEntryDraft) -> Result<QueueEntry, AppError>;

    /// Outstanding entries whose backoff delay has elapsed, in enqueue order.
    /// An entry targeting the same remote row as an earlier entry still
    /// inside its backoff window is held back with it, so writes to one row
    /// never replay out of order.
    async fn pending(&self) -> Result<Vec<QueueEntry>, AppError>;

    /// Count of all outstanding entries, ignoring backoff.
    async fn pending_count(&self) -> Result<u32, AppError>;

    async fn find(&self, id: &EntryId) -> Result<Option<QueueEntry>, AppError>;

    async fn mark_in_flight(&self, id: &EntryId) -> Result<(), AppError>;

    /// Marks a confirmed remote success. For creates, `assigned_row_id`
    /// records the row id the remote store handed back.
    async fn mark_completed(
        &self,
        id: &EntryId,
        assigned_row_id: Option<&RemoteRowId>,
    ) -> Result<(), AppError>;

    /// Records a failed replay: bumps the retry count, stores the error and
    /// the next-attempt delay, and returns the resulting status
    /// (`Failed`, or `DeadLettered` once retries are exhausted).
    async fn record_failure(&self, id: &EntryId, error: &str) -> Result<EntryStatus, AppError>;

    /// Records a replay cut short by connectivity loss: stores the error and
    /// returns the entry to the due set. Does not consume a retry; only a
    /// remote rejection can dead-letter an entry.
    async fn record_interruption(&self, id: &EntryId, error: &str) -> Result<(), AppError>;

    /// Returns entries stranded `InFlight` by an earlier crashed run to
    /// `Pending`. Safe to call at drain start: a single drain runs at a
    /// time, so any `InFlight` row seen there is stale.
    async fn recover_in_flight(&self) -> Result<u32, AppError>;

    /// Fills in the remote row id on queued updates that depend on the given
    /// create entry. Returns the number of entries resolved.
    async fn resolve_dependents(
        &self,
        create_id: &EntryId,
        row_id: &RemoteRowId,
    ) -> Result<u32, AppError>;

    async fn dead_letters(&self) -> Result<Vec<QueueEntry>, AppError>;

    /// Removes a dead-lettered entry. Returns false if no such entry exists.
    async fn discard(&self, id: &EntryId) -> Result<bool, AppError>;

    /// Returns a dead-lettered entry to `Pending` with its retry count reset.
    async fn retry_dead_letter(&self, id: &EntryId) -> Result<bool, AppError>;

    /// Deletes completed entries older than the given age in seconds.
    async fn purge_completed(&self, older_than_secs: i64) -> Result<u32, AppError>;
}
