//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&mut PgConnection` as the first argument, so callers decide which
//! transaction the statements run in.

pub mod library_panel_dashboard_repo;
pub mod library_panel_repo;

pub use library_panel_dashboard_repo::LibraryPanelDashboardRepo;
pub use library_panel_repo::{LibraryPanelRepo, RowLock};
