//! Database access layer and atomic storage operations.

/// Paste storage operations.
pub mod paste;
/// redb table definitions.
pub mod tables;

use crate::error::AppError;
use std::path::Path;
use std::sync::Arc;

/// Database handle with access to the underlying redb instance.
pub struct Database {
    pub db: Arc<redb::Database>,
    pub pastes: paste::PasteStore,
}

impl Database {
    /// Open (creating if needed) the database under `path` and initialize
    /// tables.
    ///
    /// `path` is a directory; the redb file lives inside it.
    ///
    /// # Errors
    /// Returns an error when the directory cannot be created or redb cannot
    /// open the file.
    pub fn new(path: &str) -> Result<Self, AppError> {
        std::fs::create_dir_all(path).map_err(|err| {
            AppError::UnavailableMessage(format!(
                "Could not create database directory '{}': {}",
                path, err
            ))
        })?;
        let file = Path::new(path).join(tables::REDB_FILE_NAME);
        let db = redb::Database::create(file)?;
        Self::from_shared(Arc::new(db))
    }

    /// Build a database handle from an existing shared redb instance.
    ///
    /// # Errors
    /// Returns an error if table initialization fails.
    pub fn from_shared(db: Arc<redb::Database>) -> Result<Self, AppError> {
        Ok(Self {
            pastes: paste::PasteStore::new(db.clone())?,
            db,
        })
    }

    /// Clone this handle for another subsystem in the same process.
    ///
    /// redb allows a single open instance per file, so additional handles
    /// must share the instance instead of reopening the path.
    ///
    /// # Errors
    /// Returns an error if table initialization fails.
    pub fn share(&self) -> Result<Self, AppError> {
        Self::from_shared(self.db.clone())
    }
}

#[cfg(test)]
mod tests;
