//! Notification repository.

use chrono::Utc;

use mp_core::entities::Notification;
use mp_core::ids::PREFIX_NOTIFICATION;

use crate::error::DatabaseError;
use crate::helpers::{get_opt_string, parse_datetime, parse_optional_json};
use crate::store::SqlStore;

const SELECT_COLS: &str = "id, user_id, kind, message, metadata, created_at";

fn row_to_notification(row: &libsql::Row) -> Result<Notification, DatabaseError> {
    Ok(Notification {
        id: row.get(0)?,
        user_id: row.get(1)?,
        kind: row.get(2)?,
        message: row.get(3)?,
        metadata: parse_optional_json(get_opt_string(row, 4)?.as_deref())?,
        created_at: parse_datetime(&row.get::<String>(5)?)?,
    })
}

impl SqlStore {
    pub async fn create_notification(
        &self,
        user_id: &str,
        kind: &str,
        message: &str,
        metadata: Option<&serde_json::Value>,
    ) -> Result<Notification, DatabaseError> {
        let now = Utc::now();
        let id = self.db().generate_id(PREFIX_NOTIFICATION).await?;
        self.conn()
            .execute(
                &format!("INSERT INTO notifications ({SELECT_COLS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)"),
                libsql::params![
                    id.as_str(),
                    user_id,
                    kind,
                    message,
                    metadata.map(ToString::to_string),
                    now.to_rfc3339()
                ],
            )
            .await?;
        Ok(Notification {
            id,
            user_id: user_id.to_string(),
            kind: kind.to_string(),
            message: message.to_string(),
            metadata: metadata.cloned(),
            created_at: now,
        })
    }

    /// Most recent first.
    pub async fn list_notifications(
        &self,
        user_id: &str,
        limit: u32,
    ) -> Result<Vec<Notification>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM notifications WHERE user_id = ?1
                     ORDER BY rowid DESC LIMIT ?2"
                ),
                libsql::params![user_id, i64::from(limit)],
            )
            .await?;
        let mut notifications = Vec::new();
        while let Some(row) = rows.next().await? {
            notifications.push(row_to_notification(&row)?);
        }
        Ok(notifications)
    }
}
