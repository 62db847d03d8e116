use crate::application::ports::queue_store::QueueStore;
use crate::domain::entities::{QueueEntry, QueueEntryDraft};
use crate::domain::value_objects::{EntryId, EntryStatus, RemoteRowId};
use crate::infrastructure::queue::mappers::entry_from_row;
use crate::infrastructure::queue::rows::SyncQueueRow;
use crate::shared::config::SyncConfig;
use crate::shared::error::AppError;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Row, Sqlite};
use tracing::warn;

/// SQLite-backed durable queue. Insertion rowid preserves enqueue order;
/// unsynced work survives process restarts.
pub struct SqliteQueueStore {
    pool: Pool<Sqlite>,
    max_retries: u32,
    backoff_base_secs: u64,
}

impl SqliteQueueStore {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        let defaults = SyncConfig {
            auto_sync: true,
            sync_interval: 300,
            max_retries: 3,
            backoff_base_secs: 30,
        };
        Self::with_policy(pool, &defaults)
    }

    pub fn with_policy(pool: Pool<Sqlite>, sync: &SyncConfig) -> Self {
        Self {
            pool,
            max_retries: sync.max_retries,
            backoff_base_secs: sync.backoff_base_secs,
        }
    }

    async fn fetch_row(&self, id: &EntryId) -> Result<Option<SyncQueueRow>, AppError> {
        let row = sqlx::query_as::<_, SyncQueueRow>(
            r#"
            SELECT * FROM sync_queue
            WHERE entry_id = ?1
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    fn backoff_secs(&self, retry_count: u32) -> i64 {
        let exponent = retry_count.saturating_sub(1).min(16);
        (self.backoff_base_secs as i64).saturating_mul(1i64 << exponent)
    }

    fn rows_to_entries(rows: Vec<SyncQueueRow>) -> Vec<QueueEntry> {
        // A corrupt row is treated as "no pending work" for that entry, never
        // as a fatal read failure.
        rows.into_iter()
            .filter_map(|row| {
                let rowid = row.id;
                match entry_from_row(row) {
                    Ok(entry) => Some(entry),
                    Err(e) => {
                        warn!("Skipping corrupt sync_queue row {rowid}: {e}");
                        None
                    }
                }
            })
            .collect()
    }
}

#[async_trait]
impl QueueStore for SqliteQueueStore {
    async fn enqueue(&self, draft: QueueEntryDraft) -> Result<QueueEntry, AppError> {
        let entry_id = EntryId::generate();
        let payload = serde_json::to_string(draft.payload.as_json())?;
        let meta = draft.meta.as_ref().map(serde_json::to_string).transpose()?;
        let now = Utc::now().timestamp();

        sqlx::query(
            r#"
            INSERT INTO sync_queue (
                entry_id, op, user_id, payload, status, remote_row_id,
                depends_on, retry_count, max_retries, created_at, updated_at, meta
            ) VALUES (?1, ?2, ?3, ?4, 'pending', ?5, ?6, 0, ?7, ?8, ?8, ?9)
            "#,
        )
        .bind(entry_id.as_str())
        .bind(draft.op.as_str())
        .bind(draft.user_id.as_str())
        .bind(&payload)
        .bind(draft.remote_row_id.as_ref().map(RemoteRowId::as_str))
        .bind(draft.depends_on.as_ref().map(EntryId::as_str))
        .bind(self.max_retries as i64)
        .bind(now)
        .bind(meta)
        .execute(&self.pool)
        .await?;

        let row = self
            .fetch_row(&entry_id)
            .await?
            .ok_or_else(|| AppError::Queue(format!("Enqueued entry {entry_id} not found")))?;
        entry_from_row(row)
    }

    async fn pending(&self) -> Result<Vec<QueueEntry>, AppError> {
        let now = Utc::now().timestamp();
        let rows = sqlx::query_as::<_, SyncQueueRow>(
            r#"
            SELECT * FROM sync_queue
            WHERE status IN ('pending', 'failed')
              AND (next_attempt_at IS NULL OR next_attempt_at <= ?1)
              AND NOT EXISTS (
                  SELECT 1 FROM sync_queue earlier
                  WHERE earlier.id < sync_queue.id
                    AND earlier.status IN ('pending', 'in_flight', 'failed')
                    AND earlier.next_attempt_at > ?1
                    AND earlier.remote_row_id = sync_queue.remote_row_id
              )
            ORDER BY id ASC
            "#,
        )
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        Ok(Self::rows_to_entries(rows))
    }

    async fn pending_count(&self) -> Result<u32, AppError> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) as count FROM sync_queue
            WHERE status IN ('pending', 'in_flight', 'failed')
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        let count: i64 = row.try_get("count").unwrap_or(0);
        Ok(count.max(0) as u32)
    }

    async fn find(&self, id: &EntryId) -> Result<Option<QueueEntry>, AppError> {
        match self.fetch_row(id).await? {
            Some(row) => Ok(Some(entry_from_row(row)?)),
            None => Ok(None),
        }
    }

    async fn mark_in_flight(&self, id: &EntryId) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE sync_queue
            SET status = 'in_flight', updated_at = ?1
            WHERE entry_id = ?2
            "#,
        )
        .bind(Utc::now().timestamp())
        .bind(id.as_str())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn mark_completed(
        &self,
        id: &EntryId,
        assigned_row_id: Option<&RemoteRowId>,
    ) -> Result<(), AppError> {
        let now = Utc::now().timestamp();
        sqlx::query(
            r#"
            UPDATE sync_queue
            SET status = 'completed', synced_at = ?1, updated_at = ?1,
                error_message = NULL,
                remote_row_id = COALESCE(?2, remote_row_id)
            WHERE entry_id = ?3
            "#,
        )
        .bind(now)
        .bind(assigned_row_id.map(RemoteRowId::as_str))
        .bind(id.as_str())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn record_failure(&self, id: &EntryId, error: &str) -> Result<EntryStatus, AppError> {
        let row = self
            .fetch_row(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Queue entry {id}")))?;

        let retry_count = (row.retry_count.max(0) as u32) + 1;
        let max_retries = row.max_retries.max(0) as u32;
        let now = Utc::now().timestamp();

        let (status, next_attempt_at) = if retry_count >= max_retries {
            (EntryStatus::DeadLettered, None)
        } else {
            (EntryStatus::Failed, Some(now + self.backoff_secs(retry_count)))
        };

        sqlx::query(
            r#"
            UPDATE sync_queue
            SET status = ?1, retry_count = ?2, next_attempt_at = ?3,
                error_message = ?4, updated_at = ?5
            WHERE entry_id = ?6
            "#,
        )
        .bind(status.as_str())
        .bind(retry_count as i64)
        .bind(next_attempt_at)
        .bind(error)
        .bind(now)
        .bind(id.as_str())
        .execute(&self.pool)
        .await?;

        Ok(status)
    }

    async fn record_interruption(&self, id: &EntryId, error: &str) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE sync_queue
            SET status = 'failed', next_attempt_at = NULL,
                error_message = ?1, updated_at = ?2
            WHERE entry_id = ?3
            "#,
        )
        .bind(error)
        .bind(Utc::now().timestamp())
        .bind(id.as_str())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn recover_in_flight(&self) -> Result<u32, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE sync_queue
            SET status = 'pending', updated_at = ?1
            WHERE status = 'in_flight'
            "#,
        )
        .bind(Utc::now().timestamp())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() as u32)
    }

    async fn resolve_dependents(
        &self,
        create_id: &EntryId,
        row_id: &RemoteRowId,
    ) -> Result<u32, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE sync_queue
            SET remote_row_id = ?1, depends_on = NULL, updated_at = ?2
            WHERE depends_on = ?3 AND status IN ('pending', 'failed')
            "#,
        )
        .bind(row_id.as_str())
        .bind(Utc::now().timestamp())
        .bind(create_id.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() as u32)
    }

    async fn dead_letters(&self) -> Result<Vec<QueueEntry>, AppError> {
        let rows = sqlx::query_as::<_, SyncQueueRow>(
            r#"
            SELECT * FROM sync_queue
            WHERE status = 'dead_lettered'
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(Self::rows_to_entries(rows))
    }

    async fn discard(&self, id: &EntryId) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            DELETE FROM sync_queue
            WHERE entry_id = ?1 AND status = 'dead_lettered'
            "#,
        )
        .bind(id.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn retry_dead_letter(&self, id: &EntryId) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE sync_queue
            SET status = 'pending', retry_count = 0, next_attempt_at = NULL,
                error_message = NULL, updated_at = ?1
            WHERE entry_id = ?2 AND status = 'dead_lettered'
            "#,
        )
        .bind(Utc::now().timestamp())
        .bind(id.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn purge_completed(&self, older_than_secs: i64) -> Result<u32, AppError> {
        let cutoff = Utc::now().timestamp() - older_than_secs;
        let result = sqlx::query(
            r#"
            DELETE FROM sync_queue
            WHERE status = 'completed' AND synced_at IS NOT NULL AND synced_at < ?1
            "#,
        )
        .bind(cutoff)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::{UserId, WorkoutPayload, WriteOp};
    use crate::infrastructure::database::ConnectionPool;
    use serde_json::json;

    async fn setup_store() -> SqliteQueueStore {
        let pool = ConnectionPool::from_memory().await.unwrap();
        pool.migrate().await.unwrap();
        SqliteQueueStore::new(pool.get_pool().clone())
    }

    fn create_draft(tag: &str) -> QueueEntryDraft {
        QueueEntryDraft::create(
            UserId::parse("user-1").unwrap(),
            WorkoutPayload::new(json!({ "tag": tag })).unwrap(),
            None,
        )
    }

    fn update_draft(tag: &str, row_id: &RemoteRowId) -> QueueEntryDraft {
        QueueEntryDraft::update(
            UserId::parse("user-1").unwrap(),
            WorkoutPayload::new(json!({ "tag": tag })).unwrap(),
            row_id.clone(),
            None,
        )
    }

    #[tokio::test]
    async fn pending_preserves_enqueue_order() {
        let store = setup_store().await;

        for tag in ["first", "second", "third"] {
            store.enqueue(create_draft(tag)).await.unwrap();
        }

        let pending = store.pending().await.unwrap();
        let tags: Vec<&str> = pending
            .iter()
            .map(|e| e.payload.as_json()["tag"].as_str().unwrap())
            .collect();
        assert_eq!(tags, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn mark_completed_removes_from_pending() {
        let store = setup_store().await;
        let entry = store.enqueue(create_draft("only")).await.unwrap();

        let row_id = RemoteRowId::parse("row-7").unwrap();
        store
            .mark_completed(&entry.id, Some(&row_id))
            .await
            .unwrap();

        assert!(store.pending().await.unwrap().is_empty());
        assert_eq!(store.pending_count().await.unwrap(), 0);

        let completed = store.find(&entry.id).await.unwrap().unwrap();
        assert_eq!(completed.status, EntryStatus::Completed);
        assert!(completed.synced_at.is_some());
        assert_eq!(completed.remote_row_id, Some(row_id));
    }

    #[tokio::test]
    async fn record_failure_backs_off_then_dead_letters() {
        let store = setup_store().await;
        let entry = store.enqueue(create_draft("failing")).await.unwrap();
        assert_eq!(entry.max_retries, 3);

        let status = store.record_failure(&entry.id, "boom").await.unwrap();
        assert_eq!(status, EntryStatus::Failed);

        // Backoff keeps the entry out of the due set but it is still owed.
        assert!(store.pending().await.unwrap().is_empty());
        assert_eq!(store.pending_count().await.unwrap(), 1);

        store.record_failure(&entry.id, "boom").await.unwrap();
        let status = store.record_failure(&entry.id, "boom").await.unwrap();
        assert_eq!(status, EntryStatus::DeadLettered);

        let dead = store.dead_letters().await.unwrap();
        assert_eq!(dead.len(), 1);
        assert_eq!(dead[0].retry_count, 3);
        assert_eq!(dead[0].last_error.as_deref(), Some("boom"));
        assert_eq!(store.pending_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn record_interruption_keeps_the_retry_count() {
        let store = setup_store().await;
        let entry = store.enqueue(create_draft("interrupted")).await.unwrap();

        store.mark_in_flight(&entry.id).await.unwrap();
        store
            .record_interruption(&entry.id, "connection reset")
            .await
            .unwrap();

        let reloaded = store.find(&entry.id).await.unwrap().unwrap();
        assert_eq!(reloaded.status, EntryStatus::Failed);
        assert_eq!(reloaded.retry_count, 0);
        assert_eq!(reloaded.last_error.as_deref(), Some("connection reset"));
        // Due again immediately, no backoff window.
        assert_eq!(store.pending().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn recover_in_flight_returns_stranded_entries_to_pending() {
        let store = setup_store().await;
        let entry = store.enqueue(create_draft("stranded")).await.unwrap();

        store.mark_in_flight(&entry.id).await.unwrap();
        assert!(store.pending().await.unwrap().is_empty());

        let recovered = store.recover_in_flight().await.unwrap();
        assert_eq!(recovered, 1);

        let reloaded = store.find(&entry.id).await.unwrap().unwrap();
        assert_eq!(reloaded.status, EntryStatus::Pending);
        assert_eq!(store.pending().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn backed_off_update_holds_later_updates_to_the_same_row() {
        let store = setup_store().await;
        let row_a = RemoteRowId::parse("row-a").unwrap();
        let row_b = RemoteRowId::parse("row-b").unwrap();

        let first = store.enqueue(update_draft("older", &row_a)).await.unwrap();
        store.enqueue(update_draft("newer", &row_a)).await.unwrap();
        let other = store.enqueue(update_draft("other", &row_b)).await.unwrap();

        store.record_failure(&first.id, "boom").await.unwrap();

        // The newer write to row-a waits for the backed-off older one so
        // the row never sees them out of order.
        let due = store.pending().await.unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].id, other.id);
        assert_eq!(store.pending_count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn corrupt_rows_are_skipped_not_fatal() {
        let store = setup_store().await;
        store.enqueue(create_draft("good")).await.unwrap();
        sqlx::query(
            r#"
            INSERT INTO sync_queue (
                entry_id, op, user_id, payload, status,
                retry_count, max_retries, created_at, updated_at
            ) VALUES ('bad', 'upsert', 'user-1', '{}', 'pending', 0, 3, 0, 0)
            "#,
        )
        .execute(&store.pool)
        .await
        .unwrap();
        store.enqueue(create_draft("also-good")).await.unwrap();

        let pending = store.pending().await.unwrap();
        let tags: Vec<&str> = pending
            .iter()
            .map(|e| e.payload.as_json()["tag"].as_str().unwrap())
            .collect();
        assert_eq!(tags, vec!["good", "also-good"]);
    }

    #[tokio::test]
    async fn resolve_dependents_fills_in_the_row_id() {
        let store = setup_store().await;
        let create = store.enqueue(create_draft("create")).await.unwrap();

        let dependent = store
            .enqueue(QueueEntryDraft::dependent_update(
                UserId::parse("user-1").unwrap(),
                WorkoutPayload::new(json!({ "tag": "edit" })).unwrap(),
                create.id.clone(),
                None,
            ))
            .await
            .unwrap();
        assert!(dependent.awaits_prerequisite());

        let row_id = RemoteRowId::parse("row-42").unwrap();
        let resolved = store.resolve_dependents(&create.id, &row_id).await.unwrap();
        assert_eq!(resolved, 1);

        let reloaded = store.find(&dependent.id).await.unwrap().unwrap();
        assert_eq!(reloaded.remote_row_id, Some(row_id));
        assert!(reloaded.depends_on.is_none());
        assert_eq!(reloaded.op, WriteOp::Update);
    }

    #[tokio::test]
    async fn discard_and_retry_only_touch_dead_letters() {
        let store = setup_store().await;
        let alive = store.enqueue(create_draft("alive")).await.unwrap();
        let doomed = store.enqueue(create_draft("doomed")).await.unwrap();

        for _ in 0..3 {
            store.record_failure(&doomed.id, "boom").await.unwrap();
        }

        assert!(!store.discard(&alive.id).await.unwrap());
        assert!(store.retry_dead_letter(&doomed.id).await.unwrap());

        let revived = store.find(&doomed.id).await.unwrap().unwrap();
        assert_eq!(revived.status, EntryStatus::Pending);
        assert_eq!(revived.retry_count, 0);
        assert!(revived.last_error.is_none());
    }

    #[tokio::test]
    async fn purge_completed_leaves_outstanding_work_alone() {
        let store = setup_store().await;
        let done = store.enqueue(create_draft("done")).await.unwrap();
        store.enqueue(create_draft("waiting")).await.unwrap();

        store.mark_completed(&done.id, None).await.unwrap();

        let purged = store.purge_completed(-1).await.unwrap();
        assert_eq!(purged, 1);
        assert_eq!(store.pending().await.unwrap().len(), 1);
    }
}
