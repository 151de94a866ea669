use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

use crate::store::COLLECTIONS;

pub const LATEST_VERSION: i64 = 1;

/// Bring the schema up to [`LATEST_VERSION`]. Returns the version found
/// before anything ran.
pub fn run(conn: &Connection, table_prefix: &str) -> Result<i64> {
    let version_table = format!("{table_prefix}schema_version");

    conn.execute_batch(&format!(
        "CREATE TABLE IF NOT EXISTS \"{version_table}\" (version INTEGER NOT NULL);"
    ))?;

    let version: i64 = conn.query_row(
        &format!("SELECT COALESCE(MAX(version), 0) FROM \"{version_table}\""),
        [],
        |r| r.get(0),
    )?;

    if version < 1 {
        info!("Running migration v1 (record collections)");

        let mut sql = String::new();
        for collection in COLLECTIONS {
            sql.push_str(&format!(
                "CREATE TABLE \"{table_prefix}{collection}\" (
                    id          TEXT PRIMARY KEY,
                    body        TEXT NOT NULL,
                    created_at  TEXT NOT NULL DEFAULT (datetime('now')),
                    updated_at  TEXT NOT NULL DEFAULT (datetime('now'))
                );\n"
            ));
        }
        sql.push_str(&format!(
            "INSERT INTO \"{version_table}\" (version) VALUES (1);"
        ));

        // Rolled back on drop if any statement fails.
        let tx = conn.unchecked_transaction()?;
        tx.execute_batch(&sql)?;
        tx.commit()?;
    }

    info!("Database migrations complete (v{})", LATEST_VERSION);
    Ok(version)
}
