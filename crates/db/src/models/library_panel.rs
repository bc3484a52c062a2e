//! Library panel entity model and DTOs.

use panels_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `library_panels` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct LibraryPanel {
    pub id: DbId,
    pub uid: String,
    pub org_id: DbId,
    pub folder_id: DbId,
    pub name: String,
    /// Panel definition, stored and returned verbatim.
    pub model: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub created_by: DbId,
    pub updated_by: DbId,
}

/// DTO for creating a new library panel.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateLibraryPanel {
    #[serde(default)]
    pub folder_id: DbId,
    pub name: String,
    pub model: serde_json::Value,
}

/// DTO for patching a library panel. Unset fields keep their stored value
/// (see `panels_core::library_panel`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PatchLibraryPanel {
    pub folder_id: Option<DbId>,
    pub name: Option<String>,
    pub model: Option<serde_json::Value>,
}
