//! HTTP request handlers.

/// Health endpoint.
pub mod health;
/// Paste lifecycle endpoints.
pub mod paste;
