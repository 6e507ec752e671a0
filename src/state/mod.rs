/// Device registry state layer.
///
/// The registry is the only persistent state the server keeps: a set of
/// enrolled device ids backed by SQLite. All key material is derived, so
/// "a device exists" is exactly one row — deleting it is full revocation.
pub mod repository;

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::error::Result;

/// Registry operations the request gate and the device RPCs depend on.
///
/// The gate only ever calls [`DeviceRegistry::device_exists`], and only
/// after the request token has been authenticated.
#[async_trait]
pub trait DeviceRegistry: Send + Sync {
    async fn add_device(&self, id: &str) -> Result<()>;
    async fn device_exists(&self, id: &str) -> Result<bool>;
    async fn delete_device(&self, id: &str) -> Result<()>;
    async fn list_devices(&self) -> Result<Vec<String>>;
}

/// SQLite connection pool wrapper.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (creating if missing) the database at `url`,
    /// e.g. `sqlite://byte.db` or `sqlite::memory:`.
    pub async fn connect(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);

        // an in-memory database lives and dies with its connection, so it
        // must not be spread across a pool
        let max_connections = if url.contains(":memory:") { 1 } else { 5 };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    /// Run pending migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
