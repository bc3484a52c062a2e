//! The identity performing an operation.

use serde::{Deserialize, Serialize};

use crate::types::DbId;

/// The caller on whose behalf an operation runs.
///
/// Resolved outside this workspace (session, API token, ...) and passed in
/// explicitly. `org_id` scopes every library panel lookup; `user_id` is
/// recorded in the audit columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedInUser {
    pub user_id: DbId,
    pub org_id: DbId,
}

impl SignedInUser {
    pub fn new(user_id: DbId, org_id: DbId) -> Self {
        Self { user_id, org_id }
    }
}
