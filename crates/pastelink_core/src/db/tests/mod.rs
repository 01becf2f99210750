//! Database integration tests.

use super::*;
use crate::error::AppError;
use crate::models::paste::*;
use crate::share_id::ShareId;
use chrono::{DateTime, Duration, Utc};
use std::sync::{Arc, Barrier};
use std::thread;
use tempfile::TempDir;

fn setup_test_db() -> (Database, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test-db");
    let db = Database::new(db_path.to_str().unwrap()).unwrap();
    (db, temp_dir)
}

fn sample_paste(owner: UserId, title: &str, share_id: &str, now: DateTime<Utc>) -> Paste {
    Paste::new(
        owner,
        title,
        format!("{} body", title),
        false,
        None,
        ShareId::new(share_id),
        now,
    )
}

mod concurrency;
