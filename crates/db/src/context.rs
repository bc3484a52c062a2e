//! Per-request caller context.

use std::time::Duration;

use panels_core::actor::SignedInUser;
use panels_core::error::CoreError;
use panels_core::types::DbId;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Everything an operation needs to know about its caller: who is acting,
/// in which organization, and when to give up.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub user: SignedInUser,
    cancel: CancellationToken,
    deadline: Option<Instant>,
}

impl RequestContext {
    pub fn new(user: SignedInUser) -> Self {
        Self {
            user,
            cancel: CancellationToken::new(),
            deadline: None,
        }
    }

    /// Abort operations when `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Abort operations still running at `deadline`.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn user_id(&self) -> DbId {
        self.user.user_id
    }

    pub fn org_id(&self) -> DbId {
        self.user.org_id
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Fail fast if the request is already cancelled or past its deadline.
    pub fn check(&self) -> Result<(), CoreError> {
        if self.cancel.is_cancelled() {
            return Err(CoreError::Cancelled);
        }
        if self.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            return Err(CoreError::DeadlineExceeded);
        }
        Ok(())
    }

    /// Resolves once the request is cancelled or its deadline passes.
    /// Never resolves otherwise.
    pub async fn interrupted(&self) -> CoreError {
        let deadline = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => CoreError::Cancelled,
            _ = deadline => CoreError::DeadlineExceeded,
        }
    }
}
