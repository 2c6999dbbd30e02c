//! Data access for the `event` table.
//!
//! Each operation is one SQL statement run in autocommit mode, so a write is
//! durable by the time the call returns.

use chrono::NaiveDate;
use sqlx::SqlitePool;

use crate::models::{Event, NewEvent};

#[derive(Clone)]
pub struct EventStore {
    pool: SqlitePool,
}

impl EventStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Inserts the event and returns it with the id assigned by the database.
    pub async fn create(&self, new_event: &NewEvent) -> Result<Event, sqlx::Error> {
        sqlx::query_as::<_, Event>(
            "INSERT INTO event (event, date) VALUES (?, ?)
             RETURNING id, event, date",
        )
        .bind(&new_event.name)
        .bind(new_event.date)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn list_all(&self) -> Result<Vec<Event>, sqlx::Error> {
        sqlx::query_as::<_, Event>("SELECT id, event, date FROM event ORDER BY id")
            .fetch_all(&self.pool)
            .await
    }

    /// Events dated within `[start, end]`, both ends included.
    pub async fn list_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Event>, sqlx::Error> {
        sqlx::query_as::<_, Event>(
            "SELECT id, event, date FROM event
             WHERE date BETWEEN ? AND ?
             ORDER BY id",
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn list_on(&self, date: NaiveDate) -> Result<Vec<Event>, sqlx::Error> {
        sqlx::query_as::<_, Event>("SELECT id, event, date FROM event WHERE date = ? ORDER BY id")
            .bind(date)
            .fetch_all(&self.pool)
            .await
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<Event>, sqlx::Error> {
        sqlx::query_as::<_, Event>("SELECT id, event, date FROM event WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    /// Returns `false` when no event had this id.
    pub async fn delete_by_id(&self, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM event WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn count(&self) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM event")
            .fetch_one(&self.pool)
            .await
    }
}
