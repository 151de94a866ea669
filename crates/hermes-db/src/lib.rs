pub mod config;
pub mod error;
pub mod memory;
pub mod migrations;
pub mod models;
pub mod queries;
pub mod store;

pub use config::DbConfig;
pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use store::RecordStore;

use rusqlite::Connection;
use std::path::Path;
use std::sync::Mutex;
use tracing::{info, warn};

/// SQLite-backed record store. Each collection is one table of JSON bodies.
pub struct Database {
    conn: Mutex<Connection>,
    table_prefix: String,
}

impl Database {
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        Self::from_config(&DbConfig {
            path: path.to_path_buf(),
            ..DbConfig::default()
        })
    }

    pub fn open_in_memory() -> anyhow::Result<Self> {
        Self::from_config(&DbConfig::in_memory())
    }

    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_config(&DbConfig::from_env()?)
    }

    pub fn from_config(config: &DbConfig) -> anyhow::Result<Self> {
        crate::config::validate_table_prefix(&config.table_prefix)?;
        // SQLite treats "" as a private temporary file.
        if config.path.as_os_str().is_empty() {
            anyhow::bail!("database path is empty");
        }

        let conn = if config.is_in_memory() {
            Connection::open_in_memory()?
        } else {
            let conn = Connection::open(&config.path)?;
            // WAL mode for concurrent readers in other processes
            let mode: String =
                conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
            if !mode.eq_ignore_ascii_case("wal") {
                warn!("journal_mode is {} instead of WAL", mode);
            }
            conn
        };
        conn.busy_timeout(config.busy_timeout)?;

        migrations::run(&conn, &config.table_prefix)?;

        info!("Database opened at {}", config.path.display());
        Ok(Self {
            conn: Mutex::new(conn),
            table_prefix: config.table_prefix.clone(),
        })
    }

    pub fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))?;
        f(&conn)
    }

    /// Quoted table name for a known collection.
    pub(crate) fn table(&self, collection: &str) -> Result<String> {
        store::check_collection(collection)?;
        Ok(format!("\"{}{}\"", self.table_prefix, collection))
    }
}
