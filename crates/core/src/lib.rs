//! Domain types and rules shared by the library panel crates.

pub mod actor;
pub mod error;
pub mod library_panel;
pub mod types;
pub mod uid;
