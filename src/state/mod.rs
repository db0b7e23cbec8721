/// State management module
///
/// This module handles all application state, including:
/// - Database connection and queries (library.rs)
/// - Shared data structures (data.rs)
/// - Asset-type catalog rules (catalog.rs)
/// - License auto-completion table (license.rs)
/// - Form models and field dependency rules (form.rs)
/// - Selection state machine for the main window (session.rs)

pub mod catalog;
pub mod data;
pub mod error;
pub mod form;
pub mod library;
pub mod license;
pub mod session;
