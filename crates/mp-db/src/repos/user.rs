//! User repository.

use chrono::Utc;

use mp_core::entities::User;
use mp_core::enums::UserRole;
use mp_core::ids::PREFIX_USER;

use crate::error::DatabaseError;
use crate::helpers::{get_bool, get_opt_string, parse_datetime, parse_enum};
use crate::store::SqlStore;

const SELECT_COLS: &str = "id, name, email, role, deleted, created_at";

fn row_to_user(row: &libsql::Row) -> Result<User, DatabaseError> {
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        email: get_opt_string(row, 2)?,
        role: parse_enum(&row.get::<String>(3)?)?,
        deleted: get_bool(row, 4)?,
        created_at: parse_datetime(&row.get::<String>(5)?)?,
    })
}

impl SqlStore {
    pub async fn create_user(
        &self,
        name: &str,
        email: Option<&str>,
        role: UserRole,
    ) -> Result<User, DatabaseError> {
        let now = Utc::now();
        let id = self.db().generate_id(PREFIX_USER).await?;
        self.conn()
            .execute(
                &format!("INSERT INTO users ({SELECT_COLS}) VALUES (?1, ?2, ?3, ?4, 0, ?5)"),
                libsql::params![id.as_str(), name, email, role.as_str(), now.to_rfc3339()],
            )
            .await?;
        Ok(User {
            id,
            name: name.to_string(),
            email: email.map(String::from),
            role,
            deleted: false,
            created_at: now,
        })
    }

    pub async fn get_user(&self, id: &str) -> Result<Option<User>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                &format!("SELECT {SELECT_COLS} FROM users WHERE id = ?1 AND deleted = 0"),
                [id],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_to_user(&row)?)),
            None => Ok(None),
        }
    }

    /// Recipients of completion notifications.
    pub async fn list_admin_user_ids(&self) -> Result<Vec<String>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT id FROM users WHERE role = ?1 AND deleted = 0 ORDER BY rowid",
                [UserRole::Admin.as_str()],
            )
            .await?;
        let mut ids = Vec::new();
        while let Some(row) = rows.next().await? {
            ids.push(row.get::<String>(0)?);
        }
        Ok(ids)
    }
}
