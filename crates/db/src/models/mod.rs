//! Row models and DTOs.

pub mod library_panel;
