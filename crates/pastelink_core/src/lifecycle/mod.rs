//! Paste lifecycle orchestration: create, fetch, list, update, autosave,
//! delete, and analytics.
//!
//! All clock reads happen here, once per operation, so every decision inside
//! one call (expiry gates, validation, timestamps, view records) agrees on a
//! single instant.

use crate::analytics::ViewRecorder;
use crate::clock::Clock;
use crate::constants::{DEFAULT_LIST_LIMIT, MAX_GENERATE_ATTEMPTS, MAX_LIST_LIMIT};
use crate::db::Database;
use crate::error::AppError;
use crate::models::field::FieldUpdate;
use crate::models::paste::{
    normalized_draft_title, validate_future_expiry, validate_length_caps,
    validate_published_fields, AutosaveRequest, CreatePasteRequest, ListQuery, Paste,
    PasteAnalytics, PasteId, UpdatePasteRequest, UserId, ViewRecord,
};
use crate::share_id::{generate_share_id, ShareIdAllocator};
use chrono::{DateTime, Utc};
use std::net::IpAddr;
use std::sync::Arc;

/// Domain service owning the paste lifecycle rules.
///
/// Handlers translate HTTP to these calls and back; everything that must hold
/// regardless of transport (ownership, expiry, share-id uniqueness, draft
/// relaxations) lives here.
pub struct PasteService {
    db: Database,
    clock: Arc<dyn Clock>,
}

impl PasteService {
    pub fn new(db: Database, clock: Arc<dyn Clock>) -> Self {
        Self { db, clock }
    }

    /// Create a paste for `owner`, allocating a share id.
    ///
    /// Request validation runs before allocation, so an invalid payload never
    /// reports a share-id conflict. A requested vanity id is used verbatim or
    /// rejected; otherwise random ids are drawn, retrying on commit-time
    /// races, until one wins or the attempt budget runs out.
    ///
    /// # Errors
    /// - [`AppError::Validation`] for length caps, past expiry, or missing
    ///   title/content on a published paste.
    /// - [`AppError::IdentifierConflict`] when the requested id is taken.
    /// - [`AppError::AllocatorExhausted`] when generated ids keep colliding.
    pub fn create(&self, owner: UserId, request: CreatePasteRequest) -> Result<Paste, AppError> {
        self.create_at(owner, request, self.clock.now())
    }

    fn create_at(
        &self,
        owner: UserId,
        request: CreatePasteRequest,
        now: DateTime<Utc>,
    ) -> Result<Paste, AppError> {
        validate_length_caps(&request.title, &request.content)?;
        if let Some(expires_at) = request.expires_at {
            validate_future_expiry(expires_at, now)?;
        }
        if !request.is_draft {
            validate_published_fields(&request.title, &request.content)?;
        }

        let requested = request
            .share_id
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty());
        let vanity = requested.is_some();
        let allocator = ShareIdAllocator::new(&self.db.pastes);
        let share_id = allocator.allocate(requested)?;

        let mut paste = Paste::new(
            owner,
            &request.title,
            request.content,
            request.is_draft,
            request.expires_at,
            share_id,
            now,
        );

        if vanity {
            self.db.pastes.insert(&paste)?;
            tracing::debug!(
                "Created paste {} with requested share id '{}'",
                paste.id,
                paste.share_id
            );
            return Ok(paste);
        }

        // The allocator's availability check is advisory; the insert
        // transaction decides races, so retry with fresh draws.
        for _ in 0..MAX_GENERATE_ATTEMPTS {
            match self.db.pastes.insert(&paste) {
                Ok(()) => {
                    tracing::debug!(
                        "Created paste {} with share id '{}'",
                        paste.id,
                        paste.share_id
                    );
                    return Ok(paste);
                }
                Err(AppError::IdentifierConflict(_)) => {
                    tracing::warn!(
                        "Generated share id '{}' lost an insert race, drawing a fresh one",
                        paste.share_id
                    );
                    paste.share_id = generate_share_id();
                }
                Err(other) => return Err(other),
            }
        }
        Err(AppError::AllocatorExhausted {
            attempts: MAX_GENERATE_ATTEMPTS,
        })
    }

    /// Fetch a paste by public reference and record the view.
    ///
    /// `reference` is tried as a share id first, then as an internal id, so
    /// both the share link and the canonical id resolve. The view write is
    /// best effort and never fails the read.
    ///
    /// # Errors
    /// - [`AppError::NotFound`] for unknown or retired references.
    /// - [`AppError::Expired`] when the paste's expiry has passed.
    pub fn get_public(&self, reference: &str, origin: Option<IpAddr>) -> Result<Paste, AppError> {
        let now = self.clock.now();
        let paste = self
            .resolve_reference(reference)?
            .ok_or(AppError::NotFound)?;
        if paste.is_expired(now) {
            return Err(AppError::Expired);
        }
        let recorder = ViewRecorder::new(&self.db);
        Ok(recorder.record(
            &paste,
            ViewRecord {
                viewed_at: now,
                origin,
            },
        ))
    }

    /// List `owner`'s pastes, newest first, excluding expired rows.
    ///
    /// # Errors
    /// Returns an error when storage access fails.
    pub fn list(&self, owner: UserId, query: &ListQuery) -> Result<Vec<Paste>, AppError> {
        let now = self.clock.now();
        let limit = normalized_limit(query.limit);
        self.db
            .pastes
            .list_for_owner(&owner, query.search.as_deref(), query.draft, now, limit)
    }

    /// Apply a partial update to an owned, unexpired paste.
    ///
    /// A newly set expiry must be in the future; clearing it makes the paste
    /// permanent again. The ownership check precedes the expiry check:
    /// non-owners get [`AppError::Forbidden`] even for expired pastes.
    ///
    /// # Errors
    /// - [`AppError::Validation`] for past expiry, length caps, or a patch
    ///   that would leave a published paste without title or content.
    /// - [`AppError::NotFound`] / [`AppError::Forbidden`] /
    ///   [`AppError::Expired`] per the gates above.
    pub fn update(
        &self,
        owner: UserId,
        id: PasteId,
        patch: UpdatePasteRequest,
    ) -> Result<Paste, AppError> {
        let now = self.clock.now();
        if let FieldUpdate::Set(expires_at) = &patch.expires_at {
            validate_future_expiry(*expires_at, now)?;
        }
        let updated = self.db.pastes.update_with(&id, |paste| {
            if paste.owner != owner {
                return Err(AppError::Forbidden);
            }
            if paste.is_expired(now) {
                return Err(AppError::Expired);
            }
            paste.apply_patch(patch, now);
            paste.validate()
        })?;
        updated.ok_or(AppError::NotFound)
    }

    /// Delete an owned paste, retiring its share id.
    ///
    /// Expired pastes can still be deleted by their owner.
    ///
    /// # Errors
    /// [`AppError::NotFound`] when missing, [`AppError::Forbidden`] for
    /// non-owners.
    pub fn delete(&self, owner: UserId, id: PasteId) -> Result<(), AppError> {
        let paste = self.db.pastes.get(&id)?.ok_or(AppError::NotFound)?;
        if paste.owner != owner {
            return Err(AppError::Forbidden);
        }
        match self.db.pastes.delete(&id)? {
            Some(deleted) => {
                tracing::debug!(
                    "Deleted paste {} and retired share id '{}'",
                    deleted.id,
                    deleted.share_id
                );
                Ok(())
            }
            // Lost a race with another delete of the same paste.
            None => Err(AppError::NotFound),
        }
    }

    /// Autosave draft state, updating the addressed paste or creating a new
    /// draft.
    ///
    /// Only length caps are enforced: drafts may be empty, expired pastes may
    /// still be autosaved, and the paste is forced back to draft state. When
    /// `id` is absent or no longer resolves, a fresh draft is created with a
    /// placeholder title if none was given.
    ///
    /// # Errors
    /// - [`AppError::Validation`] for length caps.
    /// - [`AppError::Forbidden`] when `id` names another owner's paste.
    pub fn autosave(
        &self,
        owner: UserId,
        id: Option<PasteId>,
        request: AutosaveRequest,
    ) -> Result<Paste, AppError> {
        let now = self.clock.now();
        let title = request.title.unwrap_or_default();
        let content = request.content.unwrap_or_default();
        validate_length_caps(&title, &content)?;

        if let Some(id) = id {
            if let Some(existing) = self.db.pastes.get(&id)? {
                if existing.owner != owner {
                    return Err(AppError::Forbidden);
                }
                let updated = self.db.pastes.update_with(&id, |paste| {
                    paste.title = normalized_draft_title(&title);
                    paste.content = content.clone();
                    paste.is_draft = true;
                    paste.updated_at = now;
                    Ok(())
                })?;
                if let Some(paste) = updated {
                    tracing::debug!("Autosaved draft {}", paste.id);
                    return Ok(paste);
                }
                // Deleted between lookup and write; fall through to a new
                // draft so the editor's work is not lost.
            }
        }

        let draft = CreatePasteRequest {
            title: normalized_draft_title(&title),
            content,
            is_draft: true,
            expires_at: None,
            share_id: None,
        };
        let paste = self.create_at(owner, draft, now)?;
        tracing::debug!("Autosave created new draft {}", paste.id);
        Ok(paste)
    }

    /// Owner-only analytics summary for one paste.
    ///
    /// Works for expired pastes too; `is_expired` in the summary reports the
    /// current state.
    ///
    /// # Errors
    /// [`AppError::NotFound`] when missing, [`AppError::Forbidden`] for
    /// non-owners.
    pub fn analytics(&self, owner: UserId, id: PasteId) -> Result<PasteAnalytics, AppError> {
        let now = self.clock.now();
        let paste = self.db.pastes.get(&id)?.ok_or(AppError::NotFound)?;
        if paste.owner != owner {
            return Err(AppError::Forbidden);
        }
        let recorder = ViewRecorder::new(&self.db);
        recorder.summary(&paste, now)
    }

    fn resolve_reference(&self, reference: &str) -> Result<Option<Paste>, AppError> {
        if let Some(paste) = self.db.pastes.get_by_share_id(reference)? {
            return Ok(Some(paste));
        }
        // Share ids take precedence; fall back to the internal id form.
        match reference.parse::<PasteId>() {
            Ok(id) => self.db.pastes.get(&id),
            Err(_) => Ok(None),
        }
    }
}

fn normalized_limit(limit: Option<usize>) -> usize {
    limit.unwrap_or(DEFAULT_LIST_LIMIT).min(MAX_LIST_LIMIT)
}
