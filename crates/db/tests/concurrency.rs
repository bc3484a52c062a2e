//! Integration tests for concurrent access to panels and their connections.
//!
//! - Racing connects on one pair leave exactly one connection row
//! - Patch and delete racing on one panel both resolve cleanly
//! - Row locks taken by patch (`FOR UPDATE`) and connect (`FOR SHARE`)
//!   hold off a concurrent delete until they commit

use std::time::Duration;

use assert_matches::assert_matches;
use panels_core::actor::SignedInUser;
use panels_core::error::CoreError;
use panels_db::models::library_panel::{CreateLibraryPanel, LibraryPanel, PatchLibraryPanel};
use panels_db::repositories::{LibraryPanelDashboardRepo, LibraryPanelRepo, RowLock};
use panels_db::{LibraryPanelService, RepoError, RequestContext};
use serde_json::json;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn ctx() -> RequestContext {
    RequestContext::new(SignedInUser::new(42, 1))
}

async fn create_panel(service: &LibraryPanelService, name: &str) -> LibraryPanel {
    service
        .create_panel(
            &ctx(),
            CreateLibraryPanel {
                folder_id: 0,
                name: name.to_string(),
                model: json!({"type": "graph"}),
            },
        )
        .await
        .unwrap()
}

fn rename(name: &str) -> PatchLibraryPanel {
    PatchLibraryPanel {
        name: Some(name.to_string()),
        ..Default::default()
    }
}

/// Time given to a blocked task before asserting it is still waiting.
const LOCK_WAIT: Duration = Duration::from_millis(300);

// ---------------------------------------------------------------------------
// Test: Racing writers
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_concurrent_connects_create_one_row(pool: PgPool) {
    let service = LibraryPanelService::new(pool.clone());
    let panel = create_panel(&service, "CPU").await;

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let service = service.clone();
            let uid = panel.uid.clone();
            tokio::spawn(async move { service.connect_dashboard(&ctx(), &uid, 5).await })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let mut conn = pool.acquire().await.unwrap();
    let count = LibraryPanelDashboardRepo::count_for_panel_id(&mut *conn, panel.id)
        .await
        .unwrap();
    assert_eq!(count, 1);
    let ids = service.list_connected_dashboards(&ctx(), &panel.uid).await.unwrap();
    assert_eq!(ids, vec![5]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_patch_racing_delete_resolves_cleanly(pool: PgPool) {
    let service = LibraryPanelService::new(pool);

    for round in 0..20 {
        let panel = create_panel(&service, &format!("Panel {round}")).await;

        let patcher = {
            let service = service.clone();
            let uid = panel.uid.clone();
            tokio::spawn(async move { service.patch_panel(&ctx(), &uid, rename("Renamed")).await })
        };
        let deleter = {
            let service = service.clone();
            let uid = panel.uid.clone();
            tokio::spawn(async move { service.delete_panel(&ctx(), &uid).await })
        };

        let patched = patcher.await.unwrap();
        let deleted = deleter.await.unwrap();

        assert!(deleted.is_ok(), "delete failed in round {round}: {deleted:?}");
        match patched {
            Ok(p) => assert_eq!(p.name, "Renamed"),
            Err(err) => assert_matches!(err, RepoError::Core(CoreError::NotFound { .. })),
        }
        let result = service.get_panel(&ctx(), &panel.uid).await;
        assert_matches!(result, Err(RepoError::Core(CoreError::NotFound { .. })));
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_concurrent_patches_both_apply(pool: PgPool) {
    let service = LibraryPanelService::new(pool);
    let panel = create_panel(&service, "CPU").await;

    let by_name = {
        let service = service.clone();
        let uid = panel.uid.clone();
        tokio::spawn(async move { service.patch_panel(&ctx(), &uid, rename("Memory")).await })
    };
    let by_folder = {
        let service = service.clone();
        let uid = panel.uid.clone();
        tokio::spawn(async move {
            let patch = PatchLibraryPanel {
                folder_id: Some(8),
                ..Default::default()
            };
            service.patch_panel(&ctx(), &uid, patch).await
        })
    };
    by_name.await.unwrap().unwrap();
    by_folder.await.unwrap().unwrap();

    // Each patch re-reads under FOR UPDATE, so neither overwrites the other.
    let stored = service.get_panel(&ctx(), &panel.uid).await.unwrap();
    assert_eq!(stored.name, "Memory");
    assert_eq!(stored.folder_id, 8);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_connect_racing_delete_resolves_cleanly(pool: PgPool) {
    let service = LibraryPanelService::new(pool);
    let panel = create_panel(&service, "CPU").await;

    let connector = {
        let service = service.clone();
        let uid = panel.uid.clone();
        tokio::spawn(async move { service.connect_dashboard(&ctx(), &uid, 3).await })
    };
    let deleter = {
        let service = service.clone();
        let uid = panel.uid.clone();
        tokio::spawn(async move { service.delete_panel(&ctx(), &uid).await })
    };

    let connected = connector.await.unwrap();
    deleter.await.unwrap().unwrap();
    match connected {
        Ok(()) => {}
        Err(err) => assert_matches!(err, RepoError::Core(CoreError::NotFound { .. })),
    }
}

// ---------------------------------------------------------------------------
// Test: Row locks
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_share_lock_holds_off_delete(pool: PgPool) {
    let service = LibraryPanelService::new(pool.clone());
    let panel = create_panel(&service, "CPU").await;

    let mut tx = pool.begin().await.unwrap();
    LibraryPanelRepo::find_by_uid(&mut *tx, &panel.uid, 1, RowLock::Share)
        .await
        .unwrap();

    let deleter = {
        let service = service.clone();
        let uid = panel.uid.clone();
        tokio::spawn(async move { service.delete_panel(&ctx(), &uid).await })
    };
    tokio::time::sleep(LOCK_WAIT).await;
    assert!(!deleter.is_finished(), "delete did not wait for the share lock");

    tx.commit().await.unwrap();
    deleter.await.unwrap().unwrap();
    let result = service.get_panel(&ctx(), &panel.uid).await;
    assert_matches!(result, Err(RepoError::Core(CoreError::NotFound { .. })));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_lock_holds_off_patch(pool: PgPool) {
    let service = LibraryPanelService::new(pool.clone());
    let panel = create_panel(&service, "CPU").await;

    let mut tx = pool.begin().await.unwrap();
    LibraryPanelRepo::patch(&mut *tx, &panel.uid, 1, 42, &rename("First"))
        .await
        .unwrap();

    let patcher = {
        let service = service.clone();
        let uid = panel.uid.clone();
        tokio::spawn(async move { service.patch_panel(&ctx(), &uid, rename("Second")).await })
    };
    tokio::time::sleep(LOCK_WAIT).await;
    assert!(!patcher.is_finished(), "patch did not wait for the row lock");

    tx.commit().await.unwrap();
    let patched = patcher.await.unwrap().unwrap();
    assert_eq!(patched.name, "Second");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_unlocked_read_does_not_block_delete(pool: PgPool) {
    let service = LibraryPanelService::new(pool.clone());
    let panel = create_panel(&service, "CPU").await;

    let mut tx = pool.begin().await.unwrap();
    LibraryPanelRepo::find_by_uid(&mut *tx, &panel.uid, 1, RowLock::None)
        .await
        .unwrap();

    tokio::time::timeout(Duration::from_secs(5), service.delete_panel(&ctx(), &panel.uid))
        .await
        .expect("delete blocked behind a plain read")
        .unwrap();
    tx.commit().await.unwrap();
}
