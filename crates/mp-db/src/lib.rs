//! # mp-db
//!
//! libSQL persistence for Milepost.
//!
//! Holds the delivery tree (projects, milestones, tasks, tickets), delivery
//! templates, users, notifications, and the audit trail. [`store::SqlStore`]
//! implements the `mp-status` ports on top of a single connection; a unit of
//! work is one `BEGIN IMMEDIATE` transaction.
//!
//! Uses the `libsql` crate (C `SQLite` fork, v0.9.29).

pub mod error;
pub mod helpers;
mod migrations;
pub mod repos;
pub mod retry;
pub mod store;

#[cfg(test)]
mod test_support;

use std::time::Duration;

use error::DatabaseError;
use libsql::Builder;

pub use store::SqlStore;

/// Default wait for a competing writer before reporting a conflict.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_millis(5000);

/// Database handle: one libSQL database and the connection all work runs on.
pub struct DeliveryDb {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
}

impl DeliveryDb {
    /// Open a local database at the given path, or `":memory:"`.
    ///
    /// Runs migrations automatically on first open.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local(path: &str, busy_timeout: Duration) -> Result<Self, DatabaseError> {
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;

        // Enable foreign keys (must be per-connection in SQLite)
        conn.execute("PRAGMA foreign_keys = ON", ())
            .await
            .map_err(|e| DatabaseError::Migration(format!("PRAGMA foreign_keys: {e}")))?;
        // PRAGMA busy_timeout echoes the new value as a row
        conn.query(
            &format!("PRAGMA busy_timeout = {}", busy_timeout.as_millis()),
            (),
        )
        .await
        .map_err(|e| DatabaseError::Migration(format!("PRAGMA busy_timeout: {e}")))?;

        let delivery_db = Self { db, conn };
        delivery_db.run_migrations().await?;
        tracing::debug!(path, ?busy_timeout, "database opened");
        Ok(delivery_db)
    }

    /// Access the underlying libSQL connection for direct queries.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }

    /// Generate a prefixed ID via libSQL. Returns e.g., `"tsk-a3f8b2c1"`.
    ///
    /// Uses `randomblob(4)` in SQL to produce 8-char hex, then prepends the prefix.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails or returns no rows.
    pub async fn generate_id(&self, prefix: &str) -> Result<String, DatabaseError> {
        let mut rows = self
            .conn
            .query("SELECT ?1 || '-' || lower(hex(randomblob(4)))", [prefix])
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        Ok(row.get::<String>(0)?)
    }
}
