//! Paste storage operations backed by redb.

use crate::db::tables::*;
use crate::error::{AppError, ShareIdConflict};
use crate::models::paste::*;
use crate::share_id::ShareId;
use chrono::{DateTime, Utc};
use redb::{ReadableDatabase, ReadableTable};
use std::sync::Arc;

/// Accessor for paste-related redb tables.
pub struct PasteStore {
    db: Arc<redb::Database>,
}

impl PasteStore {
    /// Initialize paste tables if they do not exist yet.
    ///
    /// # Returns
    /// A new [`PasteStore`] accessor bound to `db`.
    ///
    /// # Errors
    /// Returns an error when redb transaction/table initialization fails.
    pub fn new(db: Arc<redb::Database>) -> Result<Self, AppError> {
        let write_txn = db.begin_write()?;
        write_txn.open_table(PASTES)?;
        write_txn.open_table(SHARE_IDS)?;
        write_txn.open_table(PASTES_BY_CREATED)?;
        write_txn.open_table(VIEW_EVENTS)?;
        write_txn.commit()?;
        Ok(Self { db })
    }

    /// Insert a new paste row plus its share-id claim and recency index row
    /// atomically.
    ///
    /// The share-id uniqueness check runs inside the same write transaction
    /// as the claim, making this the final arbiter for allocation races:
    /// of N concurrent inserts with the same id, exactly one commits.
    ///
    /// # Errors
    /// - [`AppError::IdentifierConflict`] when the share id is already taken
    ///   (by a live paste or a retired tombstone).
    /// - Storage/serialization errors otherwise.
    pub fn insert(&self, paste: &Paste) -> Result<(), AppError> {
        let encoded = bincode::serialize(paste)?;
        let id = paste.id.to_string();
        let recency_key = reverse_timestamp_key(paste.created_at);

        let write_txn = self.db.begin_write()?;
        {
            let mut pastes = write_txn.open_table(PASTES)?;
            let mut share_ids = write_txn.open_table(SHARE_IDS)?;
            let mut by_created = write_txn.open_table(PASTES_BY_CREATED)?;

            if let Some(holder_guard) = share_ids.get(paste.share_id.as_str())? {
                let holder_id = holder_guard.value().to_string();
                drop(holder_guard);
                let title = live_holder_title(&pastes, &holder_id)?;
                return Err(AppError::IdentifierConflict(ShareIdConflict {
                    share_id: paste.share_id.clone(),
                    title,
                }));
            }

            if pastes.get(id.as_str())?.is_some() {
                return Err(AppError::StorageMessage(format!(
                    "Paste id '{}' already exists",
                    id
                )));
            }

            pastes.insert(id.as_str(), encoded.as_slice())?;
            share_ids.insert(paste.share_id.as_str(), id.as_str())?;
            by_created.insert((recency_key, id.as_str()), ())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Fetch a paste by internal id.
    ///
    /// # Returns
    /// `Ok(Some(paste))` when found, `Ok(None)` when missing.
    ///
    /// # Errors
    /// Returns an error when storage access or deserialization fails.
    pub fn get(&self, id: &PasteId) -> Result<Option<Paste>, AppError> {
        let key = id.to_string();
        let read_txn = self.db.begin_read()?;
        let pastes = read_txn.open_table(PASTES)?;
        match pastes.get(key.as_str())? {
            Some(value) => Ok(Some(deserialize_paste(value.value())?)),
            None => Ok(None),
        }
    }

    /// Fetch a paste by its public share id.
    ///
    /// Retired ids (tombstones left by deletion) resolve to `None`, exactly
    /// like ids that were never issued.
    ///
    /// # Errors
    /// Returns an error when storage access or deserialization fails.
    pub fn get_by_share_id(&self, share_id: &str) -> Result<Option<Paste>, AppError> {
        let read_txn = self.db.begin_read()?;
        let share_ids = read_txn.open_table(SHARE_IDS)?;
        let Some(holder_guard) = share_ids.get(share_id)? else {
            return Ok(None);
        };
        let holder_id = holder_guard.value().to_string();
        drop(holder_guard);
        if holder_id.is_empty() {
            return Ok(None);
        }
        let pastes = read_txn.open_table(PASTES)?;
        match pastes.get(holder_id.as_str())? {
            Some(value) => Ok(Some(deserialize_paste(value.value())?)),
            None => Ok(None),
        }
    }

    /// Report whether `candidate` is already taken, and by what.
    ///
    /// This is the allocator's advisory availability check; only the insert
    /// transaction decides races.
    ///
    /// # Returns
    /// `Ok(Some(conflict))` when taken (with the holder's title for live
    /// pastes, `None` title for retired ids), `Ok(None)` when free.
    ///
    /// # Errors
    /// Returns an error when storage access or deserialization fails.
    pub fn share_id_conflict(
        &self,
        candidate: &ShareId,
    ) -> Result<Option<ShareIdConflict>, AppError> {
        let read_txn = self.db.begin_read()?;
        let share_ids = read_txn.open_table(SHARE_IDS)?;
        let Some(holder_guard) = share_ids.get(candidate.as_str())? else {
            return Ok(None);
        };
        let holder_id = holder_guard.value().to_string();
        drop(holder_guard);
        let pastes = read_txn.open_table(PASTES)?;
        let title = live_holder_title(&pastes, &holder_id)?;
        Ok(Some(ShareIdConflict {
            share_id: candidate.clone(),
            title,
        }))
    }

    /// Atomically mutate a paste row inside one write transaction.
    ///
    /// `mutate` sees the current row and may fail, in which case the
    /// transaction aborts with the row untouched. The recency index is keyed
    /// by `created_at`, which never changes, so updates leave it alone.
    ///
    /// # Returns
    /// `Ok(Some(paste))` with the committed row, `Ok(None)` when missing.
    ///
    /// # Errors
    /// Propagates the closure's error, or storage/serialization errors.
    pub fn update_with<F>(&self, id: &PasteId, mutate: F) -> Result<Option<Paste>, AppError>
    where
        F: FnOnce(&mut Paste) -> Result<(), AppError>,
    {
        let key = id.to_string();
        let write_txn = self.db.begin_write()?;
        let updated = {
            let mut pastes = write_txn.open_table(PASTES)?;
            let Some(old_guard) = pastes.get(key.as_str())? else {
                return Ok(None);
            };
            let mut paste = deserialize_paste(old_guard.value())?;
            drop(old_guard);

            mutate(&mut paste)?;

            let encoded = bincode::serialize(&paste)?;
            pastes.insert(key.as_str(), encoded.as_slice())?;
            Some(paste)
        };
        write_txn.commit()?;
        Ok(updated)
    }

    /// Delete a paste and return the deleted canonical row.
    ///
    /// Removes the row, its recency index entry, and its view history, but
    /// rewrites the share-id entry to an empty tombstone so the id is never
    /// reallocated.
    ///
    /// # Returns
    /// `Ok(Some(paste))` when deleted, `Ok(None)` when missing.
    ///
    /// # Errors
    /// Returns an error when storage access or deserialization fails.
    pub fn delete(&self, id: &PasteId) -> Result<Option<Paste>, AppError> {
        let key = id.to_string();
        let write_txn = self.db.begin_write()?;
        let deleted = {
            let mut pastes = write_txn.open_table(PASTES)?;
            let mut share_ids = write_txn.open_table(SHARE_IDS)?;
            let mut by_created = write_txn.open_table(PASTES_BY_CREATED)?;
            let mut events = write_txn.open_table(VIEW_EVENTS)?;

            let Some(old_guard) = pastes.get(key.as_str())? else {
                return Ok(None);
            };
            let paste = deserialize_paste(old_guard.value())?;
            drop(old_guard);
            let recency_key = reverse_timestamp_key(paste.created_at);

            let _ = pastes.remove(key.as_str())?;
            let _ = by_created.remove((recency_key, key.as_str()))?;
            share_ids.insert(paste.share_id.as_str(), "")?;

            let ordinals: Vec<u64> = events
                .range((key.as_str(), 0u64)..=(key.as_str(), u64::MAX))?
                .map(|item| item.map(|(event_key, _)| event_key.value().1))
                .collect::<Result<_, _>>()?;
            for ordinal in ordinals {
                let _ = events.remove((key.as_str(), ordinal))?;
            }

            Some(paste)
        };
        write_txn.commit()?;
        Ok(deleted)
    }

    /// Record one view: increment the counter and append the view record in
    /// the same transaction.
    ///
    /// The event ordinal is the post-increment counter value, so the counter
    /// always equals the number of stored records and concurrent views can
    /// never overwrite each other's events.
    ///
    /// # Returns
    /// `Ok(Some(paste))` with the incremented row, `Ok(None)` when the paste
    /// vanished before the write.
    ///
    /// # Errors
    /// Returns an error when storage access or serialization fails.
    pub fn record_view(
        &self,
        id: &PasteId,
        record: &ViewRecord,
    ) -> Result<Option<Paste>, AppError> {
        let key = id.to_string();
        let encoded_record = bincode::serialize(record)?;
        let write_txn = self.db.begin_write()?;
        let viewed = {
            let mut pastes = write_txn.open_table(PASTES)?;
            let mut events = write_txn.open_table(VIEW_EVENTS)?;

            let Some(old_guard) = pastes.get(key.as_str())? else {
                return Ok(None);
            };
            let mut paste = deserialize_paste(old_guard.value())?;
            drop(old_guard);

            paste.view_count += 1;
            let encoded_paste = bincode::serialize(&paste)?;
            pastes.insert(key.as_str(), encoded_paste.as_slice())?;
            events.insert((key.as_str(), paste.view_count), encoded_record.as_slice())?;
            Some(paste)
        };
        write_txn.commit()?;
        Ok(viewed)
    }

    /// Ordered view history for a paste, oldest first.
    ///
    /// # Errors
    /// Returns an error when storage access or deserialization fails.
    pub fn view_history(&self, id: &PasteId) -> Result<Vec<ViewRecord>, AppError> {
        let key = id.to_string();
        let read_txn = self.db.begin_read()?;
        let events = read_txn.open_table(VIEW_EVENTS)?;
        let mut history = Vec::new();
        for item in events.range((key.as_str(), 0u64)..=(key.as_str(), u64::MAX))? {
            let (_, value) = item?;
            history.push(deserialize_view_record(value.value())?);
        }
        Ok(history)
    }

    /// List an owner's pastes, newest first.
    ///
    /// Rows expired at `now` are skipped. `search` matches title or content
    /// case-insensitively; `draft` filters on the draft flag when present.
    ///
    /// # Returns
    /// Up to `limit` canonical rows in descending creation order.
    ///
    /// # Errors
    /// Returns an error when storage access or deserialization fails.
    pub fn list_for_owner(
        &self,
        owner: &UserId,
        search: Option<&str>,
        draft: Option<bool>,
        now: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<Paste>, AppError> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let query_lower = search
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_lowercase);

        let read_txn = self.db.begin_read()?;
        let by_created = read_txn.open_table(PASTES_BY_CREATED)?;
        let pastes_table = read_txn.open_table(PASTES)?;
        let mut pastes = Vec::new();

        // Reverse-millis keys iterate newest first.
        for item in by_created.iter()? {
            let (key, _) = item?;
            let (_, paste_id) = key.value();
            let Some(paste_guard) = pastes_table.get(paste_id)? else {
                continue;
            };
            let paste = deserialize_paste(paste_guard.value())?;
            if paste.owner != *owner {
                continue;
            }
            if paste.is_expired(now) {
                continue;
            }
            if let Some(want_draft) = draft {
                if paste.is_draft != want_draft {
                    continue;
                }
            }
            if let Some(ref query) = query_lower {
                if !matches_search(&paste, query) {
                    continue;
                }
            }
            pastes.push(paste);
            if pastes.len() >= limit {
                break;
            }
        }

        Ok(pastes)
    }
}

fn live_holder_title(
    pastes: &impl ReadableTable<&'static str, &'static [u8]>,
    holder_id: &str,
) -> Result<Option<String>, AppError> {
    if holder_id.is_empty() {
        return Ok(None);
    }
    match pastes.get(holder_id)? {
        Some(value) => Ok(Some(deserialize_paste(value.value())?.title)),
        None => Ok(None),
    }
}

fn matches_search(paste: &Paste, query_lower: &str) -> bool {
    contains_case_insensitive(&paste.title, query_lower)
        || contains_case_insensitive(&paste.content, query_lower)
}

fn contains_case_insensitive(haystack: &str, query_lower: &str) -> bool {
    if query_lower.is_empty() {
        return true;
    }
    if query_lower.is_ascii() {
        let needle = query_lower.as_bytes();
        let hay = haystack.as_bytes();
        if needle.len() > hay.len() {
            return false;
        }
        for idx in 0..=hay.len() - needle.len() {
            if hay[idx..idx + needle.len()]
                .iter()
                .map(u8::to_ascii_lowercase)
                .eq(needle.iter().copied())
            {
                return true;
            }
        }
        return false;
    }
    haystack.to_lowercase().contains(query_lower)
}

pub(crate) fn reverse_timestamp_key(created_at: DateTime<Utc>) -> u64 {
    // Timestamps before the epoch clamp to zero so the negative-to-u64 cast
    // cannot underflow; ordering for real data is unaffected.
    let millis = created_at.timestamp_millis().max(0) as u64;
    u64::MAX.saturating_sub(millis)
}

fn deserialize_paste(bytes: &[u8]) -> Result<Paste, bincode::Error> {
    bincode::deserialize(bytes)
}

fn deserialize_view_record(bytes: &[u8]) -> Result<ViewRecord, bincode::Error> {
    bincode::deserialize(bytes)
}

#[cfg(test)]
mod tests {
    use super::{contains_case_insensitive, reverse_timestamp_key};
    use chrono::{TimeZone, Utc};

    #[test]
    fn reverse_timestamp_key_clamps_pre_epoch_values() {
        let pre_epoch = Utc
            .with_ymd_and_hms(1960, 1, 1, 0, 0, 0)
            .single()
            .expect("valid timestamp");
        assert_eq!(reverse_timestamp_key(pre_epoch), u64::MAX);
    }

    #[test]
    fn reverse_timestamp_key_orders_newer_first() {
        let older = Utc
            .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
            .single()
            .expect("valid timestamp");
        let newer = Utc
            .with_ymd_and_hms(2024, 6, 1, 0, 0, 0)
            .single()
            .expect("valid timestamp");
        assert!(reverse_timestamp_key(newer) < reverse_timestamp_key(older));
    }

    #[test]
    fn case_insensitive_matching_covers_ascii_and_unicode() {
        assert!(contains_case_insensitive("Deploy Notes", "deploy"));
        assert!(contains_case_insensitive("deploy notes", "NOTES".to_lowercase().as_str()));
        assert!(!contains_case_insensitive("deploy", "deployment"));
        // Non-ASCII falls back to full lowercase comparison.
        assert!(contains_case_insensitive("GRÜSSE aus Berlin", "grüsse"));
    }
}
