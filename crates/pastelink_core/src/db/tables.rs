//! redb table definitions shared by storage modules.

use redb::TableDefinition;

/// File name for the redb database within the configured DB directory.
pub const REDB_FILE_NAME: &str = "data.redb";

/// Canonical paste rows (`Paste`, bincode-encoded), keyed by internal id.
pub const PASTES: TableDefinition<&str, &[u8]> = TableDefinition::new("pastes");

/// Share id -> internal paste id.
///
/// Deleting a paste rewrites its entry to an empty value instead of removing
/// it, so retired share ids are never handed out again.
pub const SHARE_IDS: TableDefinition<&str, &str> = TableDefinition::new("share_ids");

/// Recency index ordered by reverse created-at millis then id.
pub const PASTES_BY_CREATED: TableDefinition<(u64, &str), ()> =
    TableDefinition::new("pastes_by_created");

/// Per-view records (`ViewRecord`, bincode-encoded) keyed by paste id and
/// 1-based view ordinal.
pub const VIEW_EVENTS: TableDefinition<(&str, u64), &[u8]> = TableDefinition::new("view_events");
