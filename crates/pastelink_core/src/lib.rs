//! Core domain library for PasteLink (config, storage, lifecycle, analytics).

/// View recording and owner-facing analytics summaries.
pub mod analytics;
/// Clock abstraction used by lifecycle operations.
pub mod clock;
/// Configuration loading and defaults.
pub mod config;
/// Shared constants for limits and defaults.
pub mod constants;
/// Database access layer and atomic storage operations.
pub mod db;
/// Application error types (storage/domain).
pub mod error;
/// Paste lifecycle orchestration (create/fetch/update/delete/autosave).
pub mod lifecycle;
/// Data models for API requests and persistence.
pub mod models;
/// Share identifier type and allocation.
pub mod share_id;

pub use config::Config;
pub use constants::DEFAULT_PORT;
pub use db::Database;
pub use error::AppError;
pub use lifecycle::PasteService;
pub use share_id::ShareId;
