use crate::domain::entities::{DayContext, QueueEntry};
use crate::domain::value_objects::{
    EntryId, EntryStatus, RemoteRowId, UserId, WorkoutPayload, WriteOp,
};
use crate::infrastructure::queue::rows::SyncQueueRow;
use crate::shared::error::AppError;
use chrono::{DateTime, Utc};

pub fn entry_from_row(row: SyncQueueRow) -> Result<QueueEntry, AppError> {
    let id = EntryId::new(row.entry_id).map_err(AppError::Queue)?;
    let op = WriteOp::parse(&row.op).map_err(AppError::Queue)?;
    let user_id = UserId::new(row.user_id).map_err(AppError::Queue)?;
    let payload = WorkoutPayload::from_json_str(&row.payload).map_err(AppError::Queue)?;

    let remote_row_id = row
        .remote_row_id
        .map(RemoteRowId::new)
        .transpose()
        .map_err(AppError::Queue)?;
    let depends_on = row
        .depends_on
        .map(EntryId::new)
        .transpose()
        .map_err(AppError::Queue)?;

    let meta = row
        .meta
        .as_deref()
        .map(serde_json::from_str::<DayContext>)
        .transpose()
        .map_err(|e| AppError::Queue(format!("Corrupt day context: {e}")))?;

    Ok(QueueEntry {
        id,
        op,
        user_id,
        payload,
        status: EntryStatus::from(row.status.as_str()),
        remote_row_id,
        depends_on,
        retry_count: row.retry_count.max(0) as u32,
        max_retries: row.max_retries.max(0) as u32,
        next_attempt_at: row.next_attempt_at.map(timestamp_to_datetime),
        saved_at: timestamp_to_datetime(row.created_at),
        updated_at: timestamp_to_datetime(row.updated_at),
        synced_at: row.synced_at.map(timestamp_to_datetime),
        last_error: row.error_message,
        meta,
    })
}

fn timestamp_to_datetime(secs: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(secs, 0).unwrap_or_default()
}
