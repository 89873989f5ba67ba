//! Lock contention detection.
//!
//! Two processes writing the same database file contend on SQLite's write
//! lock. Once `busy_timeout` expires, the losing statement fails with
//! `SQLITE_BUSY` or `SQLITE_LOCKED`. Those errors become
//! [`StoreError::Conflict`](mp_status::StoreError::Conflict) so the caller can
//! retry the whole unit of work with `mp_status::retry::retry_on_conflict`.

/// Detect write-lock contention errors.
///
/// The predicate is intentionally narrow to avoid retrying genuine
/// SQL or constraint errors.
pub fn is_lock_contention(e: &libsql::Error) -> bool {
    let msg = e.to_string().to_ascii_lowercase();
    msg.contains("database is locked")
        || msg.contains("database table is locked")
        || msg.contains("sqlite_busy")
        || msg.contains("sqlite_locked")
}
