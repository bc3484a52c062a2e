//! Repository for the `library_panel_dashboards` join table.

use chrono::Utc;
use panels_core::error::CoreError;
use panels_core::types::DbId;
use sqlx::PgConnection;

use crate::error::RepoResult;
use crate::models::library_panel::LibraryPanel;

/// Provides connect/disconnect operations between library panels and
/// dashboards. Dashboard ids are not checked against any dashboard table.
pub struct LibraryPanelDashboardRepo;

impl LibraryPanelDashboardRepo {
    /// Connect `panel` to `dashboard_id`.
    ///
    /// Idempotent: an existing connection is left alone. Returns `true` when
    /// a new row was inserted.
    pub async fn connect(
        conn: &mut PgConnection,
        panel: &LibraryPanel,
        dashboard_id: DbId,
        user_id: DbId,
    ) -> RepoResult<bool> {
        let result = sqlx::query(
            "INSERT INTO library_panel_dashboards
                (library_panel_id, dashboard_id, created_at, created_by)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT ON CONSTRAINT uq_library_panel_dashboards_panel_dashboard
             DO NOTHING",
        )
        .bind(panel.id)
        .bind(dashboard_id)
        .bind(Utc::now())
        .bind(user_id)
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Remove the connection between `panel` and `dashboard_id`.
    ///
    /// Fails with [`CoreError::ConnectionNotFound`] unless exactly one row
    /// was removed.
    pub async fn disconnect(
        conn: &mut PgConnection,
        panel: &LibraryPanel,
        dashboard_id: DbId,
    ) -> RepoResult<()> {
        let result = sqlx::query(
            "DELETE FROM library_panel_dashboards
             WHERE library_panel_id = $1 AND dashboard_id = $2",
        )
        .bind(panel.id)
        .bind(dashboard_id)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() != 1 {
            return Err(CoreError::ConnectionNotFound {
                uid: panel.uid.clone(),
                dashboard_id,
            }
            .into());
        }
        Ok(())
    }

    /// Dashboard ids connected to `panel`, in no particular order.
    pub async fn list_dashboard_ids(
        conn: &mut PgConnection,
        panel: &LibraryPanel,
    ) -> RepoResult<Vec<DbId>> {
        let rows: Vec<(DbId,)> = sqlx::query_as(
            "SELECT dashboard_id FROM library_panel_dashboards WHERE library_panel_id = $1",
        )
        .bind(panel.id)
        .fetch_all(&mut *conn)
        .await?;
        Ok(rows.into_iter().map(|(dashboard_id,)| dashboard_id).collect())
    }

    /// Count connection rows referencing an internal panel key, whether or
    /// not the panel still exists.
    pub async fn count_for_panel_id(
        conn: &mut PgConnection,
        library_panel_id: DbId,
    ) -> RepoResult<i64> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM library_panel_dashboards WHERE library_panel_id = $1",
        )
        .bind(library_panel_id)
        .fetch_one(&mut *conn)
        .await?;
        Ok(row.0)
    }
}
