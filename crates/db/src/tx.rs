//! Transaction scope.
//!
//! [`in_transaction`] hands the closure a connection bound to one
//! transaction. The transaction commits only when the closure returns `Ok`;
//! an `Err`, a cancelled context, a passed deadline, a panic, or a dropped
//! future all roll it back.

use std::future::Future;

use futures::future::BoxFuture;
use sqlx::PgConnection;

use crate::context::RequestContext;
use crate::error::{RepoError, RepoResult};
use crate::DbPool;

/// Run `f` inside a single database transaction.
///
/// ```ignore
/// let panel = in_transaction(&pool, &ctx, move |conn| {
///     Box::pin(async move { LibraryPanelRepo::patch(conn, &uid, org_id, user_id, &input).await })
/// })
/// .await?;
/// ```
pub async fn in_transaction<T, F>(pool: &DbPool, ctx: &RequestContext, f: F) -> RepoResult<T>
where
    F: for<'c> FnOnce(&'c mut PgConnection) -> BoxFuture<'c, RepoResult<T>>,
{
    let mut tx =
        run_cancellable(ctx, async { pool.begin().await.map_err(RepoError::from) }).await?;

    let outcome = tokio::select! {
        biased;
        reason = ctx.interrupted() => Err(RepoError::from(reason)),
        result = f(&mut *tx) => result,
    };

    match outcome {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                tracing::warn!(error = %rollback_err, "Transaction rollback failed");
            }
            tracing::debug!(error = %err, "Transaction rolled back");
            Err(err)
        }
    }
}

/// Run `fut` unless the context is cancelled or its deadline passes first.
pub async fn run_cancellable<T, Fut>(ctx: &RequestContext, fut: Fut) -> RepoResult<T>
where
    Fut: Future<Output = RepoResult<T>>,
{
    ctx.check()?;

    tokio::select! {
        biased;
        reason = ctx.interrupted() => Err(reason.into()),
        result = fut => result,
    }
}
