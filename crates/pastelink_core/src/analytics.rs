//! View recording and owner-facing analytics summaries.

use crate::db::Database;
use crate::error::AppError;
use crate::models::paste::{Paste, PasteAnalytics, ViewRecord};
use chrono::{DateTime, Utc};

/// Records views and assembles analytics against the paste store.
pub struct ViewRecorder<'a> {
    db: &'a Database,
}

impl<'a> ViewRecorder<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Record one view of `paste` and return the refreshed row.
    ///
    /// Recording is best effort: a successful fetch is never turned into an
    /// error here. When the write fails or the paste was deleted mid-request,
    /// the failure is logged and the pre-view snapshot is served instead.
    pub fn record(&self, paste: &Paste, record: ViewRecord) -> Paste {
        match self.db.pastes.record_view(&paste.id, &record) {
            Ok(Some(updated)) => updated,
            Ok(None) => {
                tracing::warn!(
                    "View on paste {} raced a delete; serving final snapshot",
                    paste.id
                );
                paste.clone()
            }
            Err(err) => {
                tracing::warn!("Could not record view for paste {}: {}", paste.id, err);
                paste.clone()
            }
        }
    }

    /// Assemble the analytics summary for `paste` as of `now`.
    ///
    /// # Errors
    /// Returns an error when the view history cannot be read.
    pub fn summary(&self, paste: &Paste, now: DateTime<Utc>) -> Result<PasteAnalytics, AppError> {
        let view_history = self.db.pastes.view_history(&paste.id)?;
        Ok(PasteAnalytics {
            total_views: paste.view_count,
            view_history,
            created_at: paste.created_at,
            expires_at: paste.expires_at,
            is_expired: paste.is_expired(now),
        })
    }
}
