use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use hermes_types::RecordId;
use serde_json::Value;

use crate::error::{Result, StoreError};
use crate::store::{DocumentBackend, check_collection, impl_record_store};

type Collections = HashMap<String, Vec<(RecordId, Value)>>;

/// In-process backend. Lookups are linear scans over an insertion-ordered
/// list per collection.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read_lock(&self) -> Result<RwLockReadGuard<'_, Collections>> {
        self.collections
            .read()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))
    }

    fn write_lock(&self) -> Result<RwLockWriteGuard<'_, Collections>> {
        self.collections
            .write()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))
    }
}

impl_record_store!(MemoryStore);

impl DocumentBackend for MemoryStore {
    fn insert(&self, collection: &str, id: &RecordId, doc: Value) -> Result<()> {
        check_collection(collection)?;
        let mut collections = self.write_lock()?;
        let docs = collections.entry(collection.to_string()).or_default();

        if docs.iter().any(|(existing, _)| existing == id) {
            return Err(StoreError::DuplicateId {
                collection: collection.to_string(),
                id: id.clone(),
            });
        }

        docs.push((id.clone(), doc));
        Ok(())
    }

    fn fetch(&self, collection: &str, id: &RecordId) -> Result<Option<Value>> {
        check_collection(collection)?;
        let collections = self.read_lock()?;

        Ok(collections.get(collection).and_then(|docs| {
            docs.iter()
                .find(|(existing, _)| existing == id)
                .map(|(_, doc)| doc.clone())
        }))
    }

    fn replace(&self, collection: &str, id: &RecordId, doc: Value) -> Result<bool> {
        check_collection(collection)?;
        let mut collections = self.write_lock()?;

        let slot = collections
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|(existing, _)| existing == id));

        match slot {
            Some((_, stored)) => {
                *stored = doc;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn remove(&self, collection: &str, id: &RecordId) -> Result<bool> {
        check_collection(collection)?;
        let mut collections = self.write_lock()?;

        let Some(docs) = collections.get_mut(collection) else {
            return Ok(false);
        };
        let before = docs.len();
        docs.retain(|(existing, _)| existing != id);
        Ok(docs.len() != before)
    }

    fn scan(&self, collection: &str) -> Result<Vec<Value>> {
        check_collection(collection)?;
        let collections = self.read_lock()?;

        Ok(collections
            .get(collection)
            .map(|docs| docs.iter().map(|(_, doc)| doc.clone()).collect())
            .unwrap_or_default())
    }
}
