use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Sqlite,
};
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

#[derive(Clone)]
pub struct Database {
    pub pool: Pool<Sqlite>,
}

impl Database {
    /// Opens a pool on `database_url`, creating the database file if it does not exist yet.
    pub async fn new(database_url: &str, pool_size: u32) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(Duration::from_secs(5))
            .connect_with(options)
            .await?;

        Ok(Database { pool })
    }

    /// Single-connection in-memory database. The connection is pinned so the
    /// data lives as long as the pool does.
    pub async fn in_memory() -> Result<Self, sqlx::Error> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;

        Ok(Database { pool })
    }

    pub async fn init_schema(&self) -> Result<(), sqlx::Error> {
        info!("Ensuring event table exists...");
        // AUTOINCREMENT keeps SQLite from handing out the id of a deleted row again
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS event (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                event VARCHAR(80) NOT NULL,
                date DATE NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;
        info!("Schema ready");
        Ok(())
    }
}
