use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct SyncQueueRow {
    pub id: i64,
    pub entry_id: String,
    pub op: String,
    pub user_id: String,
    pub payload: String,
    pub status: String,
    pub remote_row_id: Option<String>,
    pub depends_on: Option<String>,
    pub retry_count: i64,
    pub max_retries: i64,
    pub next_attempt_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
    pub synced_at: Option<i64>,
    pub error_message: Option<String>,
    pub meta: Option<String>,
}
