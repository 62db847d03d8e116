use crate::domain::value_objects::{RemoteRowId, UserId, WorkoutPayload};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One day's logged workout, flattened to parallel arrays with one slot per
/// set across all exercises performed that day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkoutDraft {
    pub user_id: UserId,
    pub exercise_names: Vec<String>,
    pub reps: Vec<u32>,
    pub weights: Vec<f64>,
    pub rir: Vec<i32>,
    pub set_completed_at: Vec<Option<DateTime<Utc>>>,
    pub all_sets_done: bool,
    pub performed_at: DateTime<Utc>,
}

impl WorkoutDraft {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_id: UserId,
        exercise_names: Vec<String>,
        reps: Vec<u32>,
        weights: Vec<f64>,
        rir: Vec<i32>,
        set_completed_at: Vec<Option<DateTime<Utc>>>,
        performed_at: DateTime<Utc>,
    ) -> Result<Self, String> {
        let sets = exercise_names.len();
        if reps.len() != sets
            || weights.len() != sets
            || rir.len() != sets
            || set_completed_at.len() != sets
        {
            return Err(format!(
                "Workout set arrays must have equal length (names: {}, reps: {}, weights: {}, rir: {}, completed: {})",
                sets,
                reps.len(),
                weights.len(),
                rir.len(),
                set_completed_at.len()
            ));
        }

        let all_sets_done = sets > 0 && set_completed_at.iter().all(Option::is_some);

        Ok(Self {
            user_id,
            exercise_names,
            reps,
            weights,
            rir,
            set_completed_at,
            all_sets_done,
            performed_at,
        })
    }

    pub fn set_count(&self) -> usize {
        self.exercise_names.len()
    }

    pub fn to_payload(&self) -> Result<WorkoutPayload, String> {
        let value =
            serde_json::to_value(self).map_err(|e| format!("Workout serialization failed: {e}"))?;
        WorkoutPayload::new(value)
    }

    pub fn from_payload(payload: &WorkoutPayload) -> Result<Self, String> {
        serde_json::from_value(payload.as_json().clone())
            .map_err(|e| format!("Workout payload does not match the row schema: {e}"))
    }
}

/// A workout as stored remotely, i.e. a draft plus its assigned row id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkoutRecord {
    pub row_id: RemoteRowId,
    #[serde(flatten)]
    pub workout: WorkoutDraft,
}

impl WorkoutRecord {
    pub fn new(row_id: RemoteRowId, workout: WorkoutDraft) -> Self {
        Self { row_id, workout }
    }
}
