use crate::application::ports::connectivity::Connectivity;
use crate::application::ports::notifier::{Notice, Notifier};
use crate::application::ports::queue_store::QueueStore;
use crate::application::ports::remote_store::{RemoteStoreError, WorkoutRemote};
use crate::domain::entities::{DayContext, QueueEntry, QueueEntryDraft, WorkoutDraft};
use crate::domain::value_objects::{EntryId, RemoteRowId, WorkoutPayload};
use crate::shared::error::AppError;
use std::sync::Arc;
use tracing::debug;

/// Where a save should land remotely.
#[derive(Debug, Clone, PartialEq)]
pub enum SaveTarget {
    /// No remote row exists for this (user, day, date) yet.
    New,
    /// A remote row exists; update it by id.
    Existing(RemoteRowId),
    /// The row is itself still queued as a `Create`; the update must wait
    /// for that entry to sync before a row id exists.
    QueuedCreate(EntryId),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    /// Written directly to the remote store.
    Persisted(RemoteRowId),
    /// Captured in the local queue for later replay.
    Queued(QueueEntry),
}

/// Decides, at the moment the user commits a day's workout, whether to write
/// directly to the remote store or defer into the local queue.
pub struct SubmissionService {
    remote: Arc<dyn WorkoutRemote>,
    queue: Arc<dyn QueueStore>,
    connectivity: Arc<dyn Connectivity>,
    notifier: Arc<dyn Notifier>,
}

impl SubmissionService {
    pub fn new(
        remote: Arc<dyn WorkoutRemote>,
        queue: Arc<dyn QueueStore>,
        connectivity: Arc<dyn Connectivity>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            remote,
            queue,
            connectivity,
            notifier,
        }
    }

    pub async fn save_workout(
        &self,
        workout: WorkoutDraft,
        target: SaveTarget,
        meta: Option<DayContext>,
    ) -> Result<SaveOutcome, AppError> {
        let payload = workout.to_payload().map_err(AppError::ValidationError)?;

        // `None` means insert a new row, `Some` means update that row.
        let existing_row: Option<RemoteRowId> = match target {
            SaveTarget::New => None,
            SaveTarget::Existing(row_id) => Some(row_id),
            SaveTarget::QueuedCreate(prerequisite) => {
                match self.resolve_prerequisite(&prerequisite).await? {
                    Some(row_id) => Some(row_id),
                    None => {
                        let draft = QueueEntryDraft::dependent_update(
                            workout.user_id.clone(),
                            payload,
                            prerequisite,
                            meta,
                        );
                        return self.enqueue(draft).await.map(SaveOutcome::Queued);
                    }
                }
            }
        };

        if !self.connectivity.is_online().await {
            let draft = Self::offline_draft(&workout, payload, existing_row, meta);
            return self.enqueue(draft).await.map(SaveOutcome::Queued);
        }

        let remote_result = match &existing_row {
            None => self.remote.insert_workout(&workout).await,
            Some(row_id) => self
                .remote
                .update_workout(row_id, &workout)
                .await
                .map(|()| row_id.clone()),
        };

        match remote_result {
            Ok(row_id) => {
                self.notifier.notify(Notice::Saved);
                Ok(SaveOutcome::Persisted(row_id))
            }
            Err(e) => {
                self.handle_remote_failure(e, workout, payload, existing_row, meta)
                    .await
            }
        }
    }

    /// A prerequisite that already synced yields the row id the remote store
    /// assigned; one still in the queue yields `None`.
    async fn resolve_prerequisite(
        &self,
        prerequisite: &EntryId,
    ) -> Result<Option<RemoteRowId>, AppError> {
        let entry = self
            .queue
            .find(prerequisite)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Prerequisite entry {prerequisite}")))?;

        if entry.is_outstanding() {
            return Ok(None);
        }
        entry.remote_row_id.map(Some).ok_or_else(|| {
            AppError::Queue(format!(
                "Prerequisite entry {prerequisite} finished without a remote row id"
            ))
        })
    }

    async fn handle_remote_failure(
        &self,
        error: RemoteStoreError,
        workout: WorkoutDraft,
        payload: WorkoutPayload,
        existing_row: Option<RemoteRowId>,
        meta: Option<DayContext>,
    ) -> Result<SaveOutcome, AppError> {
        let offline_now = !self.connectivity.is_online().await;
        if error.is_transient() || offline_now {
            debug!("Remote write deferred to local queue: {}", error);
            let draft = Self::offline_draft(&workout, payload, existing_row, meta);
            return self.enqueue(draft).await.map(SaveOutcome::Queued);
        }
        Err(AppError::Remote(error.to_string()))
    }

    async fn enqueue(&self, draft: QueueEntryDraft) -> Result<QueueEntry, AppError> {
        let entry = self.queue.enqueue(draft).await?;
        let pending = self.queue.pending_count().await?;
        self.notifier.notify(Notice::SavedLocally { pending });
        Ok(entry)
    }

    fn offline_draft(
        workout: &WorkoutDraft,
        payload: WorkoutPayload,
        existing_row: Option<RemoteRowId>,
        meta: Option<DayContext>,
    ) -> QueueEntryDraft {
        match existing_row {
            Some(row_id) => QueueEntryDraft::update(workout.user_id.clone(), payload, row_id, meta),
            None => QueueEntryDraft::create(workout.user_id.clone(), payload, meta),
        }
    }
}
