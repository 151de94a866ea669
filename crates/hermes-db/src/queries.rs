use hermes_types::RecordId;
use rusqlite::{Connection, ErrorCode};
use serde_json::Value;

use crate::Database;
use crate::error::{Result, StoreError};
use crate::models::DocumentRow;
use crate::store::{DocumentBackend, impl_record_store};

impl_record_store!(Database);

impl DocumentBackend for Database {
    fn insert(&self, collection: &str, id: &RecordId, doc: Value) -> Result<()> {
        let table = self.table(collection)?;
        let body = serde_json::to_string(&doc)?;

        self.with_conn(|conn| {
            let inserted = conn.execute(
                &format!("INSERT INTO {table} (id, body) VALUES (?1, ?2)"),
                (id.as_str(), &body),
            );

            match inserted {
                Ok(_) => Ok(()),
                Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
                    Err(StoreError::DuplicateId {
                        collection: collection.to_string(),
                        id: id.clone(),
                    })
                }
                Err(e) => Err(e.into()),
            }
        })
    }

    fn fetch(&self, collection: &str, id: &RecordId) -> Result<Option<Value>> {
        match self.get_row(collection, id)? {
            Some(row) => Ok(Some(row.document()?)),
            None => Ok(None),
        }
    }

    fn replace(&self, collection: &str, id: &RecordId, doc: Value) -> Result<bool> {
        let table = self.table(collection)?;
        let body = serde_json::to_string(&doc)?;

        self.with_conn(|conn| {
            let changed = conn.execute(
                &format!(
                    "UPDATE {table} SET body = ?2, updated_at = datetime('now') WHERE id = ?1"
                ),
                (id.as_str(), &body),
            )?;
            Ok(changed > 0)
        })
    }

    fn remove(&self, collection: &str, id: &RecordId) -> Result<bool> {
        let table = self.table(collection)?;

        self.with_conn(|conn| {
            let changed = conn.execute(&format!("DELETE FROM {table} WHERE id = ?1"), [id.as_str()])?;
            Ok(changed > 0)
        })
    }

    fn scan(&self, collection: &str) -> Result<Vec<Value>> {
        let table = self.table(collection)?;

        self.with_conn(|conn| query_rows(conn, &table))?
            .iter()
            .map(DocumentRow::document)
            .collect()
    }
}

impl Database {
    /// Raw row including storage timestamps.
    pub fn get_row(&self, collection: &str, id: &RecordId) -> Result<Option<DocumentRow>> {
        let table = self.table(collection)?;
        self.with_conn(|conn| query_row_by_id(conn, &table, id.as_str()))
    }

    pub fn count(&self, collection: &str) -> Result<u64> {
        let table = self.table(collection)?;
        self.with_conn(|conn| {
            let n: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0))?;
            Ok(n as u64)
        })
    }
}

fn query_row_by_id(conn: &Connection, table: &str, id: &str) -> Result<Option<DocumentRow>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT id, body, created_at, updated_at FROM {table} WHERE id = ?1"
    ))?;

    let row = stmt
        .query_row([id], |row| {
            Ok(DocumentRow {
                id: row.get(0)?,
                body: row.get(1)?,
                created_at: row.get(2)?,
                updated_at: row.get(3)?,
            })
        })
        .optional()?;

    Ok(row)
}

fn query_rows(conn: &Connection, table: &str) -> Result<Vec<DocumentRow>> {
    // rowid follows insertion order
    let mut stmt = conn.prepare(&format!(
        "SELECT id, body, created_at, updated_at FROM {table} ORDER BY rowid"
    ))?;

    let rows = stmt
        .query_map([], |row| {
            Ok(DocumentRow {
                id: row.get(0)?,
                body: row.get(1)?,
                created_at: row.get(2)?,
                updated_at: row.get(3)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
