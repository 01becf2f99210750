//! Data models for API requests and persistence.

/// Three-state field updates for partial patches.
pub mod field;
/// Paste rows, identifiers, and request payloads.
pub mod paste;

#[cfg(test)]
mod tests;
