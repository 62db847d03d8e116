use crate::domain::entities::WorkoutDraft;
use crate::domain::value_objects::RemoteRowId;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RemoteStoreError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error("Row not found: {0}")]
    NotFound(String),

    #[error("Backend error: {0}")]
    Backend(String),
}

impl RemoteStoreError {
    /// Transient failures are recovered by queueing locally; everything else
    /// is surfaced to the caller.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            RemoteStoreError::Connection(_) | RemoteStoreError::Timeout(_)
        )
    }

    /// Maps an untyped client error message onto the taxonomy. Only for
    /// adapters wrapping clients that expose no structured error category;
    /// routing decisions branch on the typed variant, never on the text.
    pub fn classify(message: impl Into<String>) -> Self {
        let message = message.into();
        let lowered = message.to_ascii_lowercase();
        if lowered.contains("timeout") || lowered.contains("timed out") {
            RemoteStoreError::Timeout(message)
        } else if lowered.contains("fetch")
            || lowered.contains("network")
            || lowered.contains("connection")
        {
            RemoteStoreError::Connection(message)
        } else {
            RemoteStoreError::Backend(message)
        }
    }
}

/// Client of the hosted workout table, injected by the embedding
/// application. The engine only ever inserts new rows or updates existing
/// ones by id.
#[async_trait]
pub trait WorkoutRemote: Send + Sync {
    async fn insert_workout(&self, draft: &WorkoutDraft) -> Result<RemoteRowId, RemoteStoreError>;

    async fn update_workout(
        &self,
        row_id: &RemoteRowId,
        draft: &WorkoutDraft,
    ) -> Result<(), RemoteStoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_and_timeout_are_transient() {
        assert!(RemoteStoreError::Connection("refused".into()).is_transient());
        assert!(RemoteStoreError::Timeout("30s elapsed".into()).is_transient());
        assert!(!RemoteStoreError::Constraint("unique".into()).is_transient());
        assert!(!RemoteStoreError::Backend("500".into()).is_transient());
    }

    #[test]
    fn classify_maps_legacy_message_substrings() {
        assert!(matches!(
            RemoteStoreError::classify("NetworkError when attempting to fetch resource"),
            RemoteStoreError::Connection(_)
        ));
        assert!(matches!(
            RemoteStoreError::classify("statement timeout"),
            RemoteStoreError::Timeout(_)
        ));
        assert!(matches!(
            RemoteStoreError::classify("duplicate key value"),
            RemoteStoreError::Backend(_)
        ));
    }
}
