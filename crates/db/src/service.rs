//! Library panel service facade.
//!
//! Applies the caller's [`RequestContext`] to every operation and runs each
//! write, and each resolve-then-act sequence, in a single transaction.

use std::sync::Arc;

use panels_core::types::DbId;
use panels_core::uid::{ShortUidGenerator, UidGenerator};

use crate::context::RequestContext;
use crate::error::RepoResult;
use crate::models::library_panel::{CreateLibraryPanel, LibraryPanel, PatchLibraryPanel};
use crate::repositories::{LibraryPanelDashboardRepo, LibraryPanelRepo, RowLock};
use crate::tx::{in_transaction, run_cancellable};
use crate::DbPool;

/// Entry point for library panel operations.
///
/// Cheaply cloneable; holds the pool and the UID generator.
#[derive(Clone)]
pub struct LibraryPanelService {
    pool: DbPool,
    uids: Arc<dyn UidGenerator>,
}

impl LibraryPanelService {
    /// Service backed by `pool`, generating short random UIDs.
    pub fn new(pool: DbPool) -> Self {
        Self::with_uid_generator(pool, Arc::new(ShortUidGenerator))
    }

    /// Service with a caller-supplied UID generator.
    pub fn with_uid_generator(pool: DbPool, uids: Arc<dyn UidGenerator>) -> Self {
        Self { pool, uids }
    }

    /// Store a new panel under the caller's org. Fails with `AlreadyExists`
    /// when the generated UID is taken.
    pub async fn create_panel(
        &self,
        ctx: &RequestContext,
        input: CreateLibraryPanel,
    ) -> RepoResult<LibraryPanel> {
        let user = ctx.user;
        let uids = Arc::clone(&self.uids);
        let panel = in_transaction(&self.pool, ctx, move |conn| {
            Box::pin(async move {
                LibraryPanelRepo::create(conn, uids.as_ref(), user.org_id, user.user_id, &input)
                    .await
            })
        })
        .await?;

        tracing::info!(
            uid = %panel.uid,
            org_id = panel.org_id,
            user_id = user.user_id,
            "Library panel created"
        );
        Ok(panel)
    }

    /// Fetch one panel by UID within the caller's org.
    pub async fn get_panel(&self, ctx: &RequestContext, uid: &str) -> RepoResult<LibraryPanel> {
        tracing::debug!(uid, org_id = ctx.org_id(), "Fetching library panel");
        run_cancellable(ctx, async {
            let mut conn = self.pool.acquire().await?;
            LibraryPanelRepo::find_by_uid(&mut *conn, uid, ctx.org_id(), RowLock::None).await
        })
        .await
    }

    /// All panels in the caller's org.
    pub async fn list_panels(&self, ctx: &RequestContext) -> RepoResult<Vec<LibraryPanel>> {
        tracing::debug!(org_id = ctx.org_id(), "Listing library panels");
        run_cancellable(ctx, async {
            let mut conn = self.pool.acquire().await?;
            LibraryPanelRepo::list_by_org(&mut *conn, ctx.org_id()).await
        })
        .await
    }

    /// Overwrite the fields set in `input`, keeping the rest.
    pub async fn patch_panel(
        &self,
        ctx: &RequestContext,
        uid: &str,
        input: PatchLibraryPanel,
    ) -> RepoResult<LibraryPanel> {
        let user = ctx.user;
        let uid = uid.to_string();
        let panel = in_transaction(&self.pool, ctx, move |conn| {
            Box::pin(async move {
                LibraryPanelRepo::patch(conn, &uid, user.org_id, user.user_id, &input).await
            })
        })
        .await?;

        tracing::info!(
            uid = %panel.uid,
            org_id = panel.org_id,
            user_id = user.user_id,
            "Library panel patched"
        );
        Ok(panel)
    }

    /// Hard-delete a panel. Its dashboard connections are not removed.
    pub async fn delete_panel(&self, ctx: &RequestContext, uid: &str) -> RepoResult<()> {
        let org_id = ctx.org_id();
        let owned_uid = uid.to_string();
        in_transaction(&self.pool, ctx, move |conn| {
            Box::pin(async move { LibraryPanelRepo::delete(conn, &owned_uid, org_id).await })
        })
        .await?;

        tracing::info!(uid, org_id, user_id = ctx.user_id(), "Library panel deleted");
        Ok(())
    }

    /// Connect a panel to a dashboard. Connecting an already connected pair
    /// succeeds without creating a second row.
    pub async fn connect_dashboard(
        &self,
        ctx: &RequestContext,
        uid: &str,
        dashboard_id: DbId,
    ) -> RepoResult<()> {
        let user = ctx.user;
        let owned_uid = uid.to_string();
        let created = in_transaction(&self.pool, ctx, move |conn| {
            Box::pin(async move {
                let panel = LibraryPanelRepo::find_by_uid(
                    &mut *conn,
                    &owned_uid,
                    user.org_id,
                    RowLock::Share,
                )
                .await?;
                LibraryPanelDashboardRepo::connect(conn, &panel, dashboard_id, user.user_id).await
            })
        })
        .await?;

        tracing::info!(
            uid,
            dashboard_id,
            org_id = user.org_id,
            created,
            "Library panel connected to dashboard"
        );
        Ok(())
    }

    /// Remove a panel's connection to a dashboard. Fails with
    /// `ConnectionNotFound` when the pair was never connected.
    pub async fn disconnect_dashboard(
        &self,
        ctx: &RequestContext,
        uid: &str,
        dashboard_id: DbId,
    ) -> RepoResult<()> {
        let org_id = ctx.org_id();
        let owned_uid = uid.to_string();
        in_transaction(&self.pool, ctx, move |conn| {
            Box::pin(async move {
                let panel = LibraryPanelRepo::find_by_uid(
                    &mut *conn,
                    &owned_uid,
                    org_id,
                    RowLock::Share,
                )
                .await?;
                LibraryPanelDashboardRepo::disconnect(conn, &panel, dashboard_id).await
            })
        })
        .await?;

        tracing::info!(uid, dashboard_id, org_id, "Library panel disconnected from dashboard");
        Ok(())
    }

    /// Dashboard ids connected to a panel. Treat the result as a set; the
    /// order is unspecified.
    pub async fn list_connected_dashboards(
        &self,
        ctx: &RequestContext,
        uid: &str,
    ) -> RepoResult<Vec<DbId>> {
        tracing::debug!(uid, org_id = ctx.org_id(), "Listing connected dashboards");
        let org_id = ctx.org_id();
        let uid = uid.to_string();
        in_transaction(&self.pool, ctx, move |conn| {
            Box::pin(async move {
                let panel =
                    LibraryPanelRepo::find_by_uid(&mut *conn, &uid, org_id, RowLock::Share).await?;
                LibraryPanelDashboardRepo::list_dashboard_ids(conn, &panel).await
            })
        })
        .await
    }

    /// Whether the backing database answers a trivial query.
    pub async fn health_check(&self) -> RepoResult<()> {
        crate::health_check(&self.pool).await?;
        Ok(())
    }
}
