//! Authenticated-actor extraction from request headers.

use crate::error::HttpError;
use axum::{extract::FromRequestParts, http::request::Parts};
use pastelink_core::models::paste::UserId;

/// Header carrying the authenticated account id, set by the fronting auth
/// proxy after it has verified credentials.
pub const ACTOR_ID_HEADER: &str = "x-actor-id";

/// Actor identity for the current request.
///
/// The server trusts the deployment boundary: credentials are terminated
/// upstream and only the resolved account id reaches this process. The
/// extractor checks that the header is present and is a well-formed id,
/// nothing more.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedActor(pub UserId);

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthenticatedActor
where
    S: Send + Sync,
{
    type Rejection = HttpError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(ACTOR_ID_HEADER)
            .ok_or(HttpError::Unauthenticated("Missing x-actor-id header"))?;
        let raw = value
            .to_str()
            .map_err(|_| HttpError::Unauthenticated("Invalid x-actor-id header"))?;
        let actor = raw
            .trim()
            .parse::<UserId>()
            .map_err(|_| HttpError::Unauthenticated("Invalid x-actor-id header"))?;
        Ok(Self(actor))
    }
}
