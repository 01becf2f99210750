//! Shared constants for limits and defaults.

/// Default API port.
pub const DEFAULT_PORT: u16 = 5000;

/// Maximum title length in characters.
pub const MAX_TITLE_CHARS: usize = 200;

/// Maximum content length in characters.
pub const MAX_CONTENT_CHARS: usize = 100_000;

/// Title given to drafts autosaved without one.
pub const UNTITLED_DRAFT_TITLE: &str = "Untitled";

/// Random bytes drawn for a generated share id (hex encoding doubles this).
pub const SHARE_ID_BYTES: usize = 8;

/// Attempt budget when drawing generated share ids against taken ones.
pub const MAX_GENERATE_ATTEMPTS: u32 = 16;

/// Default page size for list queries.
pub const DEFAULT_LIST_LIMIT: usize = 50;

/// Hard cap on list query page size.
pub const MAX_LIST_LIMIT: usize = 100;

/// Default request timeout in seconds applied by the HTTP layer.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default maximum request body size in bytes.
///
/// Sized above [`MAX_CONTENT_CHARS`] worst-case UTF-8 (four bytes per
/// character) plus JSON envelope overhead.
pub const DEFAULT_MAX_BODY_BYTES: usize = 2 * 1024 * 1024;
