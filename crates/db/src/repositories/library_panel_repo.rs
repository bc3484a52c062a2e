//! Repository for the `library_panels` table.

use chrono::Utc;
use panels_core::error::CoreError;
use panels_core::library_panel::{merge_folder_id, merge_model, merge_name, ENTITY};
use panels_core::types::DbId;
use panels_core::uid::UidGenerator;
use sqlx::PgConnection;

use crate::error::{is_unique_violation, RepoError, RepoResult};
use crate::models::library_panel::{CreateLibraryPanel, LibraryPanel, PatchLibraryPanel};

/// Column list for `library_panels` queries.
const COLUMNS: &str = "id, uid, org_id, folder_id, name, model, \
    created_at, updated_at, created_by, updated_by";

/// Row lock taken while reading a panel inside a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowLock {
    /// Plain read.
    #[default]
    None,
    /// `FOR SHARE`: blocks concurrent updates and deletes of the row.
    Share,
    /// `FOR UPDATE`: exclusive until the transaction ends.
    Update,
}

impl RowLock {
    fn clause(self) -> &'static str {
        match self {
            RowLock::None => "",
            RowLock::Share => " FOR SHARE",
            RowLock::Update => " FOR UPDATE",
        }
    }
}

/// Provides CRUD operations for library panels.
pub struct LibraryPanelRepo;

impl LibraryPanelRepo {
    /// Insert a new panel under a freshly generated UID, returning the
    /// created row.
    ///
    /// A UID collision fails with [`CoreError::AlreadyExists`].
    pub async fn create(
        conn: &mut PgConnection,
        uids: &dyn UidGenerator,
        org_id: DbId,
        user_id: DbId,
        input: &CreateLibraryPanel,
    ) -> RepoResult<LibraryPanel> {
        let uid = uids.generate();
        let now = Utc::now();
        let query = format!(
            "INSERT INTO library_panels
                (uid, org_id, folder_id, name, model,
                 created_at, updated_at, created_by, updated_by)
             VALUES ($1, $2, $3, $4, $5, $6, $6, $7, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, LibraryPanel>(&query)
            .bind(&uid)
            .bind(org_id)
            .bind(input.folder_id)
            .bind(&input.name)
            .bind(&input.model)
            .bind(now)
            .bind(user_id)
            .fetch_one(&mut *conn)
            .await
            .map_err(|err| conflict_or_database(err, &uid))
    }

    /// Find the panel with `uid` in `org_id`.
    ///
    /// Fails with [`CoreError::NotFound`] when no row matches, and with
    /// [`CoreError::InvariantViolation`] when more than one does.
    pub async fn find_by_uid(
        conn: &mut PgConnection,
        uid: &str,
        org_id: DbId,
        lock: RowLock,
    ) -> RepoResult<LibraryPanel> {
        let query = format!(
            "SELECT {COLUMNS} FROM library_panels
             WHERE uid = $1 AND org_id = $2{}",
            lock.clause()
        );
        let mut rows = sqlx::query_as::<_, LibraryPanel>(&query)
            .bind(uid)
            .bind(org_id)
            .fetch_all(&mut *conn)
            .await?;

        if rows.len() > 1 {
            tracing::error!(
                uid,
                org_id,
                count = rows.len(),
                "Multiple library panels share one uid"
            );
            return Err(CoreError::InvariantViolation(format!(
                "found {} library panels with uid {uid}, expected at most one",
                rows.len()
            ))
            .into());
        }

        rows.pop().ok_or_else(|| not_found(uid))
    }

    /// List every panel in an organization. No ordering is guaranteed.
    pub async fn list_by_org(
        conn: &mut PgConnection,
        org_id: DbId,
    ) -> RepoResult<Vec<LibraryPanel>> {
        let query = format!("SELECT {COLUMNS} FROM library_panels WHERE org_id = $1");
        let panels = sqlx::query_as::<_, LibraryPanel>(&query)
            .bind(org_id)
            .fetch_all(&mut *conn)
            .await?;
        Ok(panels)
    }

    /// Merge `input` into the stored panel and write it back.
    ///
    /// The stored row is locked for the rest of the transaction before the
    /// merge, so no concurrent write can land between the read and the
    /// update.
    pub async fn patch(
        conn: &mut PgConnection,
        uid: &str,
        org_id: DbId,
        user_id: DbId,
        input: &PatchLibraryPanel,
    ) -> RepoResult<LibraryPanel> {
        let existing = Self::find_by_uid(&mut *conn, uid, org_id, RowLock::Update).await?;

        let folder_id = merge_folder_id(input.folder_id, existing.folder_id);
        let name = merge_name(input.name.as_deref(), &existing.name);
        let model = merge_model(input.model.as_ref(), &existing.model);

        let query = format!(
            "UPDATE library_panels SET
                folder_id = $1,
                name = $2,
                model = $3,
                updated_at = $4,
                updated_by = $5
             WHERE id = $6
             RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, LibraryPanel>(&query)
            .bind(folder_id)
            .bind(&name)
            .bind(&model)
            .bind(Utc::now())
            .bind(user_id)
            .bind(existing.id)
            .fetch_optional(&mut *conn)
            .await
            .map_err(|err| conflict_or_database(err, uid))?;

        updated.ok_or_else(|| not_found(uid))
    }

    /// Hard-delete the panel with `uid` in `org_id`.
    ///
    /// Connection rows referencing the panel are left in place.
    pub async fn delete(conn: &mut PgConnection, uid: &str, org_id: DbId) -> RepoResult<()> {
        let result = sqlx::query("DELETE FROM library_panels WHERE uid = $1 AND org_id = $2")
            .bind(uid)
            .bind(org_id)
            .execute(&mut *conn)
            .await?;

        if result.rows_affected() != 1 {
            return Err(not_found(uid));
        }
        Ok(())
    }
}

fn not_found(uid: &str) -> RepoError {
    CoreError::NotFound {
        entity: ENTITY,
        uid: uid.to_string(),
    }
    .into()
}

fn conflict_or_database(err: sqlx::Error, uid: &str) -> RepoError {
    if is_unique_violation(&err) {
        CoreError::AlreadyExists {
            entity: ENTITY,
            uid: uid.to_string(),
        }
        .into()
    } else {
        err.into()
    }
}
