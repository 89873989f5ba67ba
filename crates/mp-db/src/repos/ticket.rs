//! Ticket repository.

use chrono::{DateTime, Utc};

use mp_core::entities::Ticket;
use mp_core::ids::PREFIX_TICKET;
use mp_status::store::NewTicket;

use crate::error::DatabaseError;
use crate::helpers::{get_bool, get_opt_string, parse_datetime};
use crate::store::SqlStore;

const SELECT_COLS: &str =
    "id, milestone_id, task_id, title, status, deleted, created_at, updated_at";

fn row_to_ticket(row: &libsql::Row) -> Result<Ticket, DatabaseError> {
    Ok(Ticket {
        id: row.get(0)?,
        milestone_id: row.get(1)?,
        task_id: get_opt_string(row, 2)?,
        title: row.get(3)?,
        status: row.get(4)?,
        deleted: get_bool(row, 5)?,
        created_at: parse_datetime(&row.get::<String>(6)?)?,
        updated_at: parse_datetime(&row.get::<String>(7)?)?,
    })
}

impl SqlStore {
    pub async fn insert_ticket(
        &self,
        new: &NewTicket,
        now: DateTime<Utc>,
    ) -> Result<Ticket, DatabaseError> {
        let id = self.db().generate_id(PREFIX_TICKET).await?;
        self.conn()
            .execute(
                &format!(
                    "INSERT INTO tickets ({SELECT_COLS})
                     VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6, ?7)"
                ),
                libsql::params![
                    id.as_str(),
                    new.milestone_id.as_str(),
                    new.task_id.as_deref(),
                    new.title.as_str(),
                    new.status.as_str(),
                    now.to_rfc3339(),
                    now.to_rfc3339()
                ],
            )
            .await?;

        Ok(Ticket {
            id,
            milestone_id: new.milestone_id.clone(),
            task_id: new.task_id.clone(),
            title: new.title.clone(),
            status: new.status.as_str().to_string(),
            deleted: false,
            created_at: now,
            updated_at: now,
        })
    }

    pub async fn get_ticket(&self, id: &str) -> Result<Option<Ticket>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                &format!("SELECT {SELECT_COLS} FROM tickets WHERE id = ?1 AND deleted = 0"),
                [id],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_to_ticket(&row)?)),
            None => Ok(None),
        }
    }

    pub async fn list_tickets(&self, milestone_id: &str) -> Result<Vec<Ticket>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM tickets
                     WHERE milestone_id = ?1 AND deleted = 0
                     ORDER BY rowid"
                ),
                [milestone_id],
            )
            .await?;
        let mut tickets = Vec::new();
        while let Some(row) = rows.next().await? {
            tickets.push(row_to_ticket(&row)?);
        }
        Ok(tickets)
    }

    pub async fn save_ticket(&self, ticket: &Ticket) -> Result<(), DatabaseError> {
        let changed = self
            .conn()
            .execute(
                "UPDATE tickets SET status = ?1, updated_at = ?2 WHERE id = ?3",
                libsql::params![
                    ticket.status.as_str(),
                    ticket.updated_at.to_rfc3339(),
                    ticket.id.as_str()
                ],
            )
            .await?;
        if changed == 0 {
            return Err(DatabaseError::NoResult);
        }
        Ok(())
    }

    pub async fn delete_ticket(&self, id: &str, now: DateTime<Utc>) -> Result<(), DatabaseError> {
        let changed = self
            .conn()
            .execute(
                "UPDATE tickets SET deleted = 1, updated_at = ?1 WHERE id = ?2 AND deleted = 0",
                libsql::params![now.to_rfc3339(), id],
            )
            .await?;
        if changed == 0 {
            return Err(DatabaseError::NoResult);
        }
        Ok(())
    }
}
