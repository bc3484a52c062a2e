use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with uid {uid}")]
    NotFound { entity: &'static str, uid: String },

    #[error("Already exists: {entity} with uid {uid}")]
    AlreadyExists { entity: &'static str, uid: String },

    #[error("Library panel {uid} is not connected to dashboard {dashboard_id}")]
    ConnectionNotFound { uid: String, dashboard_id: DbId },

    /// A lookup that must match at most one row matched several. Storage is
    /// inconsistent; callers must never treat this as a normal miss.
    #[error("Invariant violated: {0}")]
    InvariantViolation(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Operation deadline exceeded")]
    DeadlineExceeded,
}
