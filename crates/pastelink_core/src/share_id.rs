//! Share identifier type and allocation.

use crate::constants::{MAX_GENERATE_ATTEMPTS, SHARE_ID_BYTES};
use crate::db::paste::PasteStore;
use crate::error::AppError;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Public lookup token for a paste.
///
/// Share ids are opaque strings: generated ones are hex, caller-supplied ones
/// can be any non-empty token. Once issued, an id is never reassigned, even
/// after the paste it names is deleted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShareId(String);

impl ShareId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ShareId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Draw a random share id from the OS-seeded CSPRNG.
///
/// # Returns
/// A hex token of `SHARE_ID_BYTES * 2` lowercase characters.
pub fn generate_share_id() -> ShareId {
    let mut bytes = [0u8; SHARE_ID_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    let token = bytes.iter().map(|byte| format!("{:02x}", byte)).collect();
    ShareId(token)
}

/// Allocates share ids against the paste store.
///
/// Allocation is a read-only availability check; the insert transaction is
/// the final arbiter, so two racing allocations of the same id resolve to one
/// insert and one [`AppError::IdentifierConflict`].
pub struct ShareIdAllocator<'a> {
    pastes: &'a PasteStore,
}

impl<'a> ShareIdAllocator<'a> {
    pub fn new(pastes: &'a PasteStore) -> Self {
        Self { pastes }
    }

    /// Resolve a share id for a new paste.
    ///
    /// A non-empty `requested` id (after trimming) is honored verbatim when
    /// free and rejected with the colliding paste's public fields when taken.
    /// Without a usable request, random ids are drawn until one is free or
    /// the attempt budget runs out.
    ///
    /// # Errors
    /// - [`AppError::IdentifierConflict`] when the requested id is taken.
    /// - [`AppError::AllocatorExhausted`] when no free generated id was found
    ///   within [`MAX_GENERATE_ATTEMPTS`] draws.
    pub fn allocate(&self, requested: Option<&str>) -> Result<ShareId, AppError> {
        if let Some(trimmed) = requested.map(str::trim).filter(|value| !value.is_empty()) {
            let candidate = ShareId::new(trimmed);
            if let Some(conflict) = self.pastes.share_id_conflict(&candidate)? {
                return Err(AppError::IdentifierConflict(conflict));
            }
            return Ok(candidate);
        }

        for _ in 0..MAX_GENERATE_ATTEMPTS {
            let candidate = generate_share_id();
            if self.pastes.share_id_conflict(&candidate)?.is_none() {
                return Ok(candidate);
            }
        }
        Err(AppError::AllocatorExhausted {
            attempts: MAX_GENERATE_ATTEMPTS,
        })
    }
}
