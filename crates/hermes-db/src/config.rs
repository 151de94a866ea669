use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};

use crate::error::StoreError;

pub const IN_MEMORY_PATH: &str = ":memory:";

/// Storage settings, read from `HERMES_DB_*` environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    /// Database file, or `:memory:`.
    pub path: PathBuf,
    /// Prepended to every collection table name.
    pub table_prefix: String,
    pub busy_timeout: Duration,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("hermes.db"),
            table_prefix: String::new(),
            busy_timeout: Duration::from_millis(5000),
        }
    }
}

impl DbConfig {
    pub fn in_memory() -> Self {
        Self {
            path: PathBuf::from(IN_MEMORY_PATH),
            ..Self::default()
        }
    }

    /// Load from the process environment, reading `.env` first if present.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = lookup("HERMES_DB_PATH") {
            if path.trim().is_empty() {
                bail!("HERMES_DB_PATH is set but empty");
            }
            config.path = PathBuf::from(path);
        }
        if let Some(prefix) = lookup("HERMES_DB_TABLE_PREFIX") {
            validate_table_prefix(&prefix)?;
            config.table_prefix = prefix;
        }
        if let Some(ms) = lookup("HERMES_DB_BUSY_TIMEOUT_MS") {
            let ms: u64 = ms
                .parse()
                .with_context(|| format!("HERMES_DB_BUSY_TIMEOUT_MS is not a number: {ms:?}"))?;
            config.busy_timeout = Duration::from_millis(ms);
        }

        Ok(config)
    }

    pub fn is_in_memory(&self) -> bool {
        self.path.as_os_str() == IN_MEMORY_PATH
    }
}

/// Table names are built by string formatting, so the prefix is restricted
/// to identifier characters.
pub fn validate_table_prefix(prefix: &str) -> std::result::Result<(), StoreError> {
    if prefix.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Ok(())
    } else {
        Err(StoreError::InvalidTablePrefix(prefix.to_string()))
    }
}
