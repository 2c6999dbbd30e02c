use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Width of the `event` column.
pub const EVENT_NAME_MAX_LEN: usize = 80;

/// A stored calendar event. Serializes as `{"id", "event", "date"}` with the
/// date rendered as `YYYY-MM-DD`.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    #[serde(rename = "event")]
    #[sqlx(rename = "event")]
    pub name: String,
    pub date: NaiveDate,
}

/// An event that has passed request validation but has no id yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    pub name: String,
    pub date: NaiveDate,
}
