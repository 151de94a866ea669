//! Database row types: one row per stored record.
//! The record itself lives in `body` as JSON; the timestamps are storage
//! metadata and are not part of the record shape.

use serde_json::Value;

use crate::error::Result;

#[derive(Debug, Clone)]
pub struct DocumentRow {
    pub id: String,
    pub body: String,
    pub created_at: String,
    pub updated_at: String,
}

impl DocumentRow {
    pub fn document(&self) -> Result<Value> {
        Ok(serde_json::from_str(&self.body)?)
    }
}
