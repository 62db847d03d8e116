use crate::application::ports::connectivity::Connectivity;
use crate::application::ports::notifier::{Notice, Notifier};
use crate::application::ports::queue_store::QueueStore;
use crate::application::ports::remote_store::{RemoteStoreError, WorkoutRemote};
use crate::domain::entities::{DrainReport, QueueEntry, WorkoutDraft};
use crate::domain::value_objects::{EntryStatus, RemoteRowId, WriteOp};
use crate::shared::error::AppError;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SyncStatus {
    pub is_syncing: bool,
    pub pending_entries: u32,
    pub last_sync: Option<i64>,
    pub sync_errors: u32,
}

enum ReplayTarget {
    Insert,
    UpdateRow(RemoteRowId),
}

enum StepOutcome {
    Synced,
    DeadLettered,
    /// Entry failed but keeps its place; later entries must wait for it.
    Halt,
    /// Entry cannot be attempted yet (prerequisite create unconfirmed).
    Blocked,
}

/// Replays the local queue against the remote store when connectivity
/// allows, preserving enqueue order and stopping at the first entry that
/// must be retried later.
pub struct SyncService {
    connectivity: Arc<dyn Connectivity>,
    queue: Arc<dyn QueueStore>,
    remote: Arc<dyn WorkoutRemote>,
    notifier: Arc<dyn Notifier>,
    status: Arc<RwLock<SyncStatus>>,
}

impl SyncService {
    pub fn new(
        connectivity: Arc<dyn Connectivity>,
        queue: Arc<dyn QueueStore>,
        remote: Arc<dyn WorkoutRemote>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            connectivity,
            queue,
            remote,
            notifier,
            status: Arc::new(RwLock::new(SyncStatus {
                is_syncing: false,
                pending_entries: 0,
                last_sync: None,
                sync_errors: 0,
            })),
        }
    }

    /// Re-reads the outstanding count from storage, so a restarted process
    /// reflects work queued before it went down.
    pub async fn refresh_pending(&self) -> Result<u32, AppError> {
        let count = self.queue.pending_count().await?;
        self.status.write().await.pending_entries = count;
        Ok(count)
    }

    pub async fn get_status(&self) -> SyncStatus {
        self.status.read().await.clone()
    }

    /// One drain pass. No-op while offline or while another drain runs.
    pub async fn drain(&self) -> Result<DrainReport, AppError> {
        if !self.connectivity.is_online().await {
            let remaining = self.queue.pending_count().await?;
            return Ok(DrainReport::new(0, 0, 0, remaining));
        }

        {
            let mut status = self.status.write().await;
            if status.is_syncing {
                let remaining = status.pending_entries;
                return Ok(DrainReport::new(0, 0, 0, remaining));
            }
            status.is_syncing = true;
        }

        let result = self.drain_inner().await;

        let mut status = self.status.write().await;
        status.is_syncing = false;
        match &result {
            Ok(report) => {
                status.last_sync = Some(chrono::Utc::now().timestamp());
                status.pending_entries = report.remaining_count;
                status.sync_errors += report.failed_count + report.dead_lettered_count;
            }
            Err(_) => status.sync_errors += 1,
        }

        result
    }

    async fn drain_inner(&self) -> Result<DrainReport, AppError> {
        let recovered = self.queue.recover_in_flight().await?;
        if recovered > 0 {
            tracing::warn!("Recovered {recovered} entries left in flight by an earlier run");
        }

        let entries = self.queue.pending().await?;

        let mut synced = 0u32;
        let mut failed = 0u32;
        let mut dead_lettered = 0u32;

        for entry in entries {
            // Re-read before each attempt: an earlier step in this pass may
            // have filled in the row id of a dependent update, and an
            // operator may have discarded the entry under us.
            let entry = match self.queue.find(&entry.id).await? {
                Some(fresh) if fresh.is_outstanding() => fresh,
                _ => continue,
            };
            match self.replay_entry(&entry).await? {
                StepOutcome::Synced => synced += 1,
                StepOutcome::DeadLettered => {
                    dead_lettered += 1;
                    self.notifier.notify(Notice::DeadLettered {
                        entry_id: entry.id.clone(),
                    });
                }
                StepOutcome::Halt => {
                    failed += 1;
                    let pending = self.queue.pending_count().await?;
                    self.notifier.notify(Notice::SyncDeferred { pending });
                    break;
                }
                StepOutcome::Blocked => break,
            }
        }

        let remaining = self.queue.pending_count().await?;
        if remaining == 0 && synced > 0 {
            self.notifier.notify(Notice::AllSynced);
        }

        Ok(DrainReport::new(synced, failed, dead_lettered, remaining))
    }

    async fn replay_entry(&self, entry: &QueueEntry) -> Result<StepOutcome, AppError> {
        let target = match (entry.op, entry.remote_row_id.clone()) {
            (WriteOp::Create, _) => ReplayTarget::Insert,
            (WriteOp::Update, Some(row_id)) => ReplayTarget::UpdateRow(row_id),
            (WriteOp::Update, None) => {
                if let Some(prereq_id) = &entry.depends_on {
                    match self.queue.find(prereq_id).await? {
                        Some(prereq) if prereq.is_outstanding() => {
                            // The create this update depends on has not
                            // produced a row id yet; keep FIFO and come back
                            // next drain.
                            tracing::debug!(
                                "Entry {} blocked on unresolved prerequisite {}",
                                entry.id,
                                prereq_id
                            );
                            return Ok(StepOutcome::Blocked);
                        }
                        // Prerequisite was dead-lettered or discarded; this
                        // update has no row to land on and never will.
                        _ => {
                            return self
                                .fail_entry(entry, "Prerequisite create will not complete")
                                .await;
                        }
                    }
                }
                return self
                    .fail_entry(entry, "Update entry has no target row id")
                    .await;
            }
        };

        let draft = match WorkoutDraft::from_payload(&entry.payload) {
            Ok(draft) => draft,
            // A payload that no longer matches the row schema will never
            // succeed remotely; burn a retry so it dead-letters.
            Err(e) => return self.fail_entry(entry, &e).await,
        };

        self.queue.mark_in_flight(&entry.id).await?;

        let replayed: Result<Option<RemoteRowId>, RemoteStoreError> = match target {
            ReplayTarget::Insert => self.remote.insert_workout(&draft).await.map(Some),
            ReplayTarget::UpdateRow(row_id) => self
                .remote
                .update_workout(&row_id, &draft)
                .await
                .map(|()| Some(row_id)),
        };

        match replayed {
            Ok(assigned) => {
                self.queue
                    .mark_completed(&entry.id, assigned.as_ref())
                    .await?;
                if entry.op == WriteOp::Create {
                    if let Some(row_id) = &assigned {
                        self.queue.resolve_dependents(&entry.id, row_id).await?;
                    }
                }
                tracing::debug!("Replayed entry {} ({})", entry.id, entry.op);
                Ok(StepOutcome::Synced)
            }
            Err(e) => {
                let offline_now = !self.connectivity.is_online().await;
                if e.is_transient() || offline_now {
                    // A connectivity dropout does not consume a retry; only
                    // a remote rejection can dead-letter an entry.
                    self.queue
                        .record_interruption(&entry.id, &e.to_string())
                        .await?;
                    tracing::warn!("Replay of {} interrupted: {}", entry.id, e);
                    return Ok(StepOutcome::Halt);
                }

                let status = self.queue.record_failure(&entry.id, &e.to_string()).await?;
                if status == EntryStatus::DeadLettered {
                    tracing::warn!("Entry {} dead-lettered: {}", entry.id, e);
                    return Ok(StepOutcome::DeadLettered);
                }
                tracing::warn!("Replay of {} failed, will back off: {}", entry.id, e);
                Ok(StepOutcome::Halt)
            }
        }
    }

    async fn fail_entry(&self, entry: &QueueEntry, error: &str) -> Result<StepOutcome, AppError> {
        let status = self.queue.record_failure(&entry.id, error).await?;
        if status == EntryStatus::DeadLettered {
            return Ok(StepOutcome::DeadLettered);
        }
        Ok(StepOutcome::Halt)
    }

    /// Observes connectivity transitions: drains on reconnect, surfaces
    /// notices both ways.
    pub fn spawn_watcher(&self) -> tokio::task::JoinHandle<()> {
        let service = self.clone();
        let mut rx = self.connectivity.subscribe();

        tokio::spawn(async move {
            let mut was_online = *rx.borrow();

            while rx.changed().await.is_ok() {
                let online = *rx.borrow();
                if online == was_online {
                    continue;
                }
                was_online = online;

                if online {
                    service.notifier.notify(Notice::BackOnline);
                    if let Err(e) = service.drain().await {
                        tracing::error!("Drain after reconnect failed: {}", e);
                        let mut status = service.status.write().await;
                        status.sync_errors += 1;
                    }
                } else {
                    service.notifier.notify(Notice::WentOffline);
                }
            }
        })
    }

    /// Periodic background drain, for embeddings that want sync attempts
    /// even without a connectivity transition.
    pub fn schedule_drain(&self, interval_secs: u64) -> tokio::task::JoinHandle<()> {
        let service = self.clone();

        tokio::spawn(async move {
            let mut interval =
                tokio::time::interval(tokio::time::Duration::from_secs(interval_secs));

            loop {
                interval.tick().await;

                if let Err(e) = service.drain().await {
                    tracing::error!("Scheduled drain failed: {}", e);
                    let mut status = service.status.write().await;
                    status.sync_errors += 1;
                }
            }
        })
    }
}

impl Clone for SyncService {
    fn clone(&self) -> Self {
        Self {
            connectivity: self.connectivity.clone(),
            queue: self.queue.clone(),
            remote: self.remote.clone(),
            notifier: self.notifier.clone(),
            status: self.status.clone(),
        }
    }
}
