//! Paste rows, identifiers, and request payloads.

use crate::constants::{MAX_CONTENT_CHARS, MAX_TITLE_CHARS, UNTITLED_DRAFT_TITLE};
use crate::error::AppError;
use crate::models::field::FieldUpdate;
use crate::share_id::ShareId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;
use uuid::Uuid;

/// Internal paste identifier, distinct from the public share id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PasteId(Uuid);

impl PasteId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PasteId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PasteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PasteId {
    type Err = uuid::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(value)?))
    }
}

/// Opaque identity of the authenticated actor owning a paste.
///
/// The authentication layer resolves credentials to this id before requests
/// reach the service; ownership checks compare it with strict equality and
/// nothing else is ever derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = uuid::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(value)?))
    }
}

/// Paste row stored in the database and returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paste {
    pub id: PasteId,
    pub owner: UserId,
    pub title: String,
    pub content: String,
    pub share_id: ShareId,
    pub is_draft: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub view_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One recorded view of a paste.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewRecord {
    pub viewed_at: DateTime<Utc>,
    /// Best-effort network origin; informational only, never authorization.
    pub origin: Option<IpAddr>,
}

/// Request payload for creating a paste.
#[derive(Debug, Deserialize)]
pub struct CreatePasteRequest {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub is_draft: bool,
    pub expires_at: Option<DateTime<Utc>>,
    /// Vanity share id; a free random one is generated when absent.
    pub share_id: Option<String>,
}

/// Request payload for updating a paste.
///
/// Every field is a [`FieldUpdate`]: absent keys leave the stored value
/// untouched, explicit `null` resets it (cleared expiry means "never
/// expires"), and a value replaces it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePasteRequest {
    #[serde(default)]
    pub title: FieldUpdate<String>,
    #[serde(default)]
    pub content: FieldUpdate<String>,
    #[serde(default)]
    pub is_draft: FieldUpdate<bool>,
    #[serde(default)]
    pub expires_at: FieldUpdate<DateTime<Utc>>,
}

/// Request payload for draft autosave.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AutosaveRequest {
    pub title: Option<String>,
    pub content: Option<String>,
}

/// Query parameters for listing pastes.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
    pub draft: Option<bool>,
    pub limit: Option<usize>,
}

/// Owner-facing analytics summary for one paste.
#[derive(Debug, Serialize)]
pub struct PasteAnalytics {
    pub total_views: u64,
    pub view_history: Vec<ViewRecord>,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_expired: bool,
}

impl Paste {
    /// Create a new paste row with both timestamps set to `now`.
    ///
    /// The title is stored trimmed; content is stored verbatim.
    pub fn new(
        owner: UserId,
        title: &str,
        content: String,
        is_draft: bool,
        expires_at: Option<DateTime<Utc>>,
        share_id: ShareId,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: PasteId::new(),
            owner,
            title: title.trim().to_string(),
            content,
            share_id,
            is_draft,
            expires_at,
            view_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the paste is expired at `now`.
    ///
    /// Expiry is strict: a paste fetched exactly at its `expires_at` instant
    /// is still readable.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| now > expires_at)
    }

    /// Apply a partial update and bump `updated_at` to `now`.
    ///
    /// Cleared fields reset to their defaults: empty title, empty content,
    /// published (`is_draft = false`), never-expiring. Validity of the result
    /// is the caller's concern.
    pub fn apply_patch(&mut self, patch: UpdatePasteRequest, now: DateTime<Utc>) {
        match patch.title {
            FieldUpdate::Keep => {}
            FieldUpdate::Clear => self.title.clear(),
            FieldUpdate::Set(title) => self.title = title.trim().to_string(),
        }
        match patch.content {
            FieldUpdate::Keep => {}
            FieldUpdate::Clear => self.content.clear(),
            FieldUpdate::Set(content) => self.content = content,
        }
        match patch.is_draft {
            FieldUpdate::Keep => {}
            FieldUpdate::Clear => self.is_draft = false,
            FieldUpdate::Set(is_draft) => self.is_draft = is_draft,
        }
        match patch.expires_at {
            FieldUpdate::Keep => {}
            FieldUpdate::Clear => self.expires_at = None,
            FieldUpdate::Set(expires_at) => self.expires_at = Some(expires_at),
        }
        self.updated_at = now;
    }

    /// Validate the row against data-model invariants.
    ///
    /// Length caps always apply; the non-emptiness requirements for title and
    /// content are relaxed while the paste is a draft. Expiry is validated at
    /// set time by the lifecycle layer, not here: an already-stored expiry in
    /// the past means the paste expired, not that the row is invalid.
    ///
    /// # Errors
    /// Returns [`AppError::Validation`] naming the offending field.
    pub fn validate(&self) -> Result<(), AppError> {
        validate_length_caps(&self.title, &self.content)?;
        if !self.is_draft {
            validate_published_fields(&self.title, &self.content)?;
        }
        Ok(())
    }
}

/// Check title and content against their length caps.
///
/// Limits are measured in characters, not bytes, so multibyte text is not
/// penalized.
///
/// # Errors
/// Returns [`AppError::Validation`] naming the offending field.
pub fn validate_length_caps(title: &str, content: &str) -> Result<(), AppError> {
    if title.chars().count() > MAX_TITLE_CHARS {
        return Err(AppError::validation(
            "title",
            format!("Title exceeds maximum length of {} characters", MAX_TITLE_CHARS),
        ));
    }
    if content.chars().count() > MAX_CONTENT_CHARS {
        return Err(AppError::validation(
            "content",
            format!(
                "Content exceeds maximum length of {} characters",
                MAX_CONTENT_CHARS
            ),
        ));
    }
    Ok(())
}

/// Require the non-empty fields a published paste must carry.
///
/// Whitespace-only values do not count.
///
/// # Errors
/// Returns [`AppError::Validation`] naming the offending field.
pub fn validate_published_fields(title: &str, content: &str) -> Result<(), AppError> {
    if title.trim().is_empty() {
        return Err(AppError::validation(
            "title",
            "Title is required for published pastes",
        ));
    }
    if content.trim().is_empty() {
        return Err(AppError::validation(
            "content",
            "Content is required for published pastes",
        ));
    }
    Ok(())
}

/// Normalize a draft title: trimmed, with a placeholder when empty.
pub fn normalized_draft_title(title: &str) -> String {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        UNTITLED_DRAFT_TITLE.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Require an expiry strictly after `now`.
///
/// # Errors
/// Returns [`AppError::Validation`] for the `expires_at` field otherwise.
pub fn validate_future_expiry(
    expires_at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<(), AppError> {
    if expires_at <= now {
        return Err(AppError::validation(
            "expires_at",
            "Expiry must be in the future",
        ));
    }
    Ok(())
}
