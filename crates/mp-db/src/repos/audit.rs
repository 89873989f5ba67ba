//! Audit trail repository.
//!
//! Append-only entries recording every mutation: creation, soft deletion, and
//! each status change with its `from`/`to`/`reason` detail.

use chrono::{DateTime, Utc};

use mp_core::entities::AuditEntry;
use mp_core::enums::{AuditAction, EntityType};
use mp_core::ids::PREFIX_AUDIT;

use crate::error::DatabaseError;
use crate::helpers::{get_opt_string, parse_datetime, parse_enum, parse_optional_json};
use crate::store::SqlStore;

const SELECT_COLS: &str = "id, entity_type, entity_id, action, detail, created_at";

fn row_to_audit(row: &libsql::Row) -> Result<AuditEntry, DatabaseError> {
    Ok(AuditEntry {
        id: row.get(0)?,
        entity_type: parse_enum(&row.get::<String>(1)?)?,
        entity_id: row.get(2)?,
        action: parse_enum(&row.get::<String>(3)?)?,
        detail: parse_optional_json(get_opt_string(row, 4)?.as_deref())?,
        created_at: parse_datetime(&row.get::<String>(5)?)?,
    })
}

impl SqlStore {
    /// Append an audit entry. Called by every engine mutation.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the INSERT fails.
    pub async fn append_audit(
        &self,
        entity_type: EntityType,
        entity_id: &str,
        action: AuditAction,
        detail: Option<&serde_json::Value>,
        now: DateTime<Utc>,
    ) -> Result<AuditEntry, DatabaseError> {
        let id = self.db().generate_id(PREFIX_AUDIT).await?;
        self.conn()
            .execute(
                &format!("INSERT INTO audit_trail ({SELECT_COLS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)"),
                libsql::params![
                    id.as_str(),
                    entity_type.as_str(),
                    entity_id,
                    action.as_str(),
                    detail.map(ToString::to_string),
                    now.to_rfc3339()
                ],
            )
            .await?;
        Ok(AuditEntry {
            id,
            entity_type,
            entity_id: entity_id.to_string(),
            action,
            detail: detail.cloned(),
            created_at: now,
        })
    }

    /// Entries for one entity, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_audit(
        &self,
        entity_id: &str,
        limit: u32,
    ) -> Result<Vec<AuditEntry>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM audit_trail WHERE entity_id = ?1
                     ORDER BY rowid LIMIT ?2"
                ),
                libsql::params![entity_id, i64::from(limit)],
            )
            .await?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next().await? {
            entries.push(row_to_audit(&row)?);
        }
        Ok(entries)
    }
}
