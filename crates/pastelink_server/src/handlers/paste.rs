//! Paste HTTP handlers.

use crate::auth::AuthenticatedActor;
use crate::error::HttpError;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use pastelink_core::models::paste::{
    AutosaveRequest, CreatePasteRequest, ListQuery, Paste, PasteAnalytics, PasteId,
    UpdatePasteRequest,
};
use pastelink_core::AppError;
use std::net::IpAddr;

const FORWARDED_FOR_HEADER: &str = "x-forwarded-for";
const REAL_IP_HEADER: &str = "x-real-ip";

/// Best-effort client address from proxy headers.
///
/// Takes the first hop of `x-forwarded-for`, falling back to `x-real-ip`.
/// The value feeds view analytics only and is never used for authorization.
fn client_origin(headers: &HeaderMap) -> Option<IpAddr> {
    for name in [FORWARDED_FOR_HEADER, REAL_IP_HEADER] {
        let Some(value) = headers.get(name) else {
            continue;
        };
        let Ok(raw) = value.to_str() else {
            continue;
        };
        let first = raw.split(',').next().unwrap_or_default().trim();
        if let Ok(ip) = first.parse() {
            return Some(ip);
        }
    }
    None
}

/// Mutation routes address pastes by internal id only; any other token
/// cannot name a paste.
fn parse_paste_id(raw: &str) -> Result<PasteId, HttpError> {
    raw.parse::<PasteId>()
        .map_err(|_| HttpError::App(AppError::NotFound))
}

/// Create a new paste.
///
/// # Arguments
/// - `state`: Application state.
/// - `actor`: Authenticated owner of the new paste.
/// - `request`: Paste creation payload.
///
/// # Returns
/// `201 Created` with the created paste as JSON.
///
/// # Errors
/// Returns an error if validation, allocation, or persistence fails.
pub async fn create_paste(
    State(state): State<AppState>,
    AuthenticatedActor(actor): AuthenticatedActor,
    Json(request): Json<CreatePasteRequest>,
) -> Result<(StatusCode, Json<Paste>), HttpError> {
    let paste = state.service.create(actor, request)?;
    Ok((StatusCode::CREATED, Json(paste)))
}

/// Fetch a paste by share id or internal id.
///
/// This is the public share-link endpoint: no authentication is required,
/// and each successful fetch records a view.
///
/// # Returns
/// The paste as JSON.
///
/// # Errors
/// `404` for unknown references, `410` for expired pastes.
pub async fn get_paste(
    State(state): State<AppState>,
    Path(reference): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Paste>, HttpError> {
    let origin = client_origin(&headers);
    let paste = state.service.get_public(&reference, origin)?;
    Ok(Json(paste))
}

/// List the authenticated actor's pastes, newest first.
///
/// # Arguments
/// - `query`: Optional `search`, `draft`, and `limit` filters.
///
/// # Returns
/// The matching pastes as a JSON array.
///
/// # Errors
/// Returns an error if storage access fails.
pub async fn list_pastes(
    State(state): State<AppState>,
    AuthenticatedActor(actor): AuthenticatedActor,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Paste>>, HttpError> {
    let pastes = state.service.list(actor, &query)?;
    Ok(Json(pastes))
}

/// Apply a partial update to an owned paste.
///
/// Fields absent from the payload are kept, explicit `null` clears them, and
/// values replace them.
///
/// # Returns
/// The updated paste as JSON.
///
/// # Errors
/// `400` for invalid patches, `403` for foreign pastes, `404` when missing,
/// `410` when expired.
pub async fn update_paste(
    State(state): State<AppState>,
    AuthenticatedActor(actor): AuthenticatedActor,
    Path(id): Path<String>,
    Json(patch): Json<UpdatePasteRequest>,
) -> Result<Json<Paste>, HttpError> {
    let id = parse_paste_id(&id)?;
    let paste = state.service.update(actor, id, patch)?;
    Ok(Json(paste))
}

/// Delete an owned paste, retiring its share id.
///
/// # Returns
/// `204 No Content` on success.
///
/// # Errors
/// `403` for foreign pastes, `404` when missing.
pub async fn delete_paste(
    State(state): State<AppState>,
    AuthenticatedActor(actor): AuthenticatedActor,
    Path(id): Path<String>,
) -> Result<StatusCode, HttpError> {
    let id = parse_paste_id(&id)?;
    state.service.delete(actor, id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Autosave draft state into a fresh paste.
///
/// # Returns
/// The created draft as JSON.
///
/// # Errors
/// `400` when a field exceeds its length cap.
pub async fn autosave_new(
    State(state): State<AppState>,
    AuthenticatedActor(actor): AuthenticatedActor,
    Json(request): Json<AutosaveRequest>,
) -> Result<Json<Paste>, HttpError> {
    let paste = state.service.autosave(actor, None, request)?;
    Ok(Json(paste))
}

/// Autosave draft state into an existing paste.
///
/// An id that cannot address any paste (unknown or malformed) falls back to
/// creating a fresh draft instead of dropping the editor's work.
///
/// # Returns
/// The saved draft as JSON.
///
/// # Errors
/// `400` when a field exceeds its length cap, `403` for foreign pastes.
pub async fn autosave_existing(
    State(state): State<AppState>,
    AuthenticatedActor(actor): AuthenticatedActor,
    Path(id): Path<String>,
    Json(request): Json<AutosaveRequest>,
) -> Result<Json<Paste>, HttpError> {
    let id = id.parse::<PasteId>().ok();
    let paste = state.service.autosave(actor, id, request)?;
    Ok(Json(paste))
}

/// Owner-only analytics summary for one paste.
///
/// # Returns
/// View totals, per-view history, and expiry state as JSON.
///
/// # Errors
/// `403` for foreign pastes, `404` when missing.
pub async fn paste_analytics(
    State(state): State<AppState>,
    AuthenticatedActor(actor): AuthenticatedActor,
    Path(id): Path<String>,
) -> Result<Json<PasteAnalytics>, HttpError> {
    let id = parse_paste_id(&id)?;
    let summary = state.service.analytics(actor, id)?;
    Ok(Json(summary))
}
