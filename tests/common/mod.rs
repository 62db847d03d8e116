use async_trait::async_trait;
use chrono::Utc;
use liftlog_sync::{
    ConnectionPool, ConnectivityMonitor, Notice, Notifier, RemoteRowId, RemoteStoreError,
    SqliteQueueStore, SubmissionService, SyncConfig, SyncService, UserId, WorkoutDraft,
    WorkoutRemote,
};
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

pub const TEST_USER: &str = "user-1";

#[derive(Debug, Clone, PartialEq)]
pub enum RemoteCall {
    Insert,
    Update(String),
}

/// Scriptable stand-in for the hosted workout table. Each call consumes the
/// next scripted outcome; calls without a script succeed. Inserts assign
/// sequential row ids ("row-1", "row-2", ...).
#[derive(Default)]
pub struct MockRemote {
    outcomes: Mutex<VecDeque<Result<(), RemoteStoreError>>>,
    calls: Mutex<Vec<RemoteCall>>,
    next_row: AtomicU32,
}

impl MockRemote {
    pub fn script(&self, outcome: Result<(), RemoteStoreError>) {
        self.outcomes.lock().unwrap().push_back(outcome);
    }

    pub fn calls(&self) -> Vec<RemoteCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl WorkoutRemote for MockRemote {
    async fn insert_workout(&self, _draft: &WorkoutDraft) -> Result<RemoteRowId, RemoteStoreError> {
        self.calls.lock().unwrap().push(RemoteCall::Insert);
        let outcome = self.outcomes.lock().unwrap().pop_front().unwrap_or(Ok(()));
        outcome?;
        let n = self.next_row.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(RemoteRowId::parse(&format!("row-{n}")).unwrap())
    }

    async fn update_workout(
        &self,
        row_id: &RemoteRowId,
        _draft: &WorkoutDraft,
    ) -> Result<(), RemoteStoreError> {
        self.calls
            .lock()
            .unwrap()
            .push(RemoteCall::Update(row_id.to_string()));
        self.outcomes.lock().unwrap().pop_front().unwrap_or(Ok(()))
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }

    pub fn contains(&self, notice: &Notice) -> bool {
        self.notices.lock().unwrap().contains(notice)
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }
}

pub struct TestContext {
    pub submission: SubmissionService,
    pub sync: SyncService,
    pub queue: Arc<SqliteQueueStore>,
    pub remote: Arc<MockRemote>,
    pub connectivity: Arc<ConnectivityMonitor>,
    pub notifier: Arc<RecordingNotifier>,
    pub pool: ConnectionPool,
}

pub async fn setup(online: bool) -> TestContext {
    setup_with_sync_config(
        online,
        SyncConfig {
            auto_sync: true,
            sync_interval: 300,
            max_retries: 3,
            backoff_base_secs: 30,
        },
    )
    .await
}

pub async fn setup_with_sync_config(online: bool, sync_config: SyncConfig) -> TestContext {
    let pool = ConnectionPool::from_memory().await.expect("sqlite pool");
    pool.migrate().await.expect("migrations");

    let queue = Arc::new(SqliteQueueStore::with_policy(
        pool.get_pool().clone(),
        &sync_config,
    ));
    let remote = Arc::new(MockRemote::default());
    let connectivity = Arc::new(ConnectivityMonitor::new(online));
    let notifier = Arc::new(RecordingNotifier::default());

    let submission = SubmissionService::new(
        remote.clone(),
        queue.clone(),
        connectivity.clone(),
        notifier.clone(),
    );
    let sync = SyncService::new(
        connectivity.clone(),
        queue.clone(),
        remote.clone(),
        notifier.clone(),
    );

    TestContext {
        submission,
        sync,
        queue,
        remote,
        connectivity,
        notifier,
        pool,
    }
}

pub fn sample_workout() -> WorkoutDraft {
    workout_with_reps(&[8, 8, 5])
}

pub fn workout_with_reps(reps: &[u32]) -> WorkoutDraft {
    let sets = reps.len();
    WorkoutDraft::new(
        UserId::parse(TEST_USER).expect("user id"),
        vec!["Bench Press".to_string(); sets],
        reps.to_vec(),
        vec![80.0; sets],
        vec![2; sets],
        vec![Some(Utc::now()); sets],
        Utc::now(),
    )
    .expect("workout draft")
}
