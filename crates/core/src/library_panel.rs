//! Library panel constants and patch-merge rules.
//!
//! A patch only overrides the fields the caller actually set. "Unset" means
//! a zero folder id, an empty name, or an absent/JSON-null model; in each
//! case the stored value is carried forward.

use serde_json::Value;

use crate::types::DbId;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Entity label used in error messages.
pub const ENTITY: &str = "LibraryPanel";

// ---------------------------------------------------------------------------
// Patch merge
// ---------------------------------------------------------------------------

/// Folder id after a patch. `None` and `Some(0)` keep the current folder.
pub fn merge_folder_id(requested: Option<DbId>, current: DbId) -> DbId {
    match requested {
        Some(folder_id) if folder_id != 0 => folder_id,
        _ => current,
    }
}

/// Name after a patch. `None` and `Some("")` keep the current name.
pub fn merge_name(requested: Option<&str>, current: &str) -> String {
    match requested {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => current.to_string(),
    }
}

/// Model after a patch. `None` and JSON `null` keep the current model.
pub fn merge_model(requested: Option<&Value>, current: &Value) -> Value {
    match requested {
        Some(model) if !model.is_null() => model.clone(),
        _ => current.clone(),
    }
}
