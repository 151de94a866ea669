use hermes_types::{Channel, Draft, RecordId, Schema, User, ValidationError};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{Result, StoreError};

/// Collections every backend knows about.
pub const COLLECTIONS: &[&str] = &[Channel::COLLECTION, User::COLLECTION];

pub(crate) fn check_collection(collection: &str) -> Result<()> {
    if COLLECTIONS.contains(&collection) {
        Ok(())
    } else {
        Err(StoreError::UnknownCollection(collection.to_string()))
    }
}

/// Raw document persistence, keyed by collection and id.
///
/// Backends store whatever they are handed, so this seam stays inside the
/// crate. The only public write path is [`RecordStore`], which validates.
pub(crate) trait DocumentBackend: Send + Sync {
    /// Fails with [`StoreError::DuplicateId`] if `id` is already taken.
    fn insert(&self, collection: &str, id: &RecordId, doc: Value) -> Result<()>;

    fn fetch(&self, collection: &str, id: &RecordId) -> Result<Option<Value>>;

    /// Returns false if there was nothing to replace.
    fn replace(&self, collection: &str, id: &RecordId, doc: Value) -> Result<bool>;

    fn remove(&self, collection: &str, id: &RecordId) -> Result<bool>;

    /// All documents in insertion order.
    fn scan(&self, collection: &str) -> Result<Vec<Value>>;
}

/// Typed CRUD over opaque record ids.
///
/// Every write goes through [`Draft::validate`]: required fields are checked,
/// defaults filled and the id generated before anything reaches storage.
/// The raw document layer underneath is not reachable from outside:
///
/// ```compile_fail
/// use hermes_db::store::DocumentBackend;
/// ```
pub trait RecordStore {
    fn create<D: Draft>(&self, draft: D) -> Result<D::Record>;

    fn create_document<R: Schema>(&self, doc: &Value) -> Result<R>;

    fn read<R: Schema>(&self, id: &RecordId) -> Result<Option<R>>;

    /// Replace the whole record. The id is kept.
    fn update<D: Draft>(&self, id: &RecordId, draft: D) -> Result<D::Record>;

    fn update_document<R: Schema>(&self, id: &RecordId, doc: &Value) -> Result<R>;

    fn delete<R: Schema>(&self, id: &RecordId) -> Result<bool>;

    fn list<R: Schema>(&self) -> Result<Vec<R>>;
}

/// Implements [`RecordStore`] for a type that implements [`DocumentBackend`].
macro_rules! impl_record_store {
    ($backend:ty) => {
        impl $crate::store::RecordStore for $backend {
            fn create<D: ::hermes_types::Draft>(&self, draft: D) -> $crate::Result<D::Record> {
                $crate::store::create(self, draft)
            }

            fn create_document<R: ::hermes_types::Schema>(
                &self,
                doc: &::serde_json::Value,
            ) -> $crate::Result<R> {
                $crate::store::create_document(self, doc)
            }

            fn read<R: ::hermes_types::Schema>(
                &self,
                id: &::hermes_types::RecordId,
            ) -> $crate::Result<Option<R>> {
                $crate::store::read(self, id)
            }

            fn update<D: ::hermes_types::Draft>(
                &self,
                id: &::hermes_types::RecordId,
                draft: D,
            ) -> $crate::Result<D::Record> {
                $crate::store::update(self, id, draft)
            }

            fn update_document<R: ::hermes_types::Schema>(
                &self,
                id: &::hermes_types::RecordId,
                doc: &::serde_json::Value,
            ) -> $crate::Result<R> {
                $crate::store::update_document(self, id, doc)
            }

            fn delete<R: ::hermes_types::Schema>(
                &self,
                id: &::hermes_types::RecordId,
            ) -> $crate::Result<bool> {
                $crate::store::delete::<R, _>(self, id)
            }

            fn list<R: ::hermes_types::Schema>(&self) -> $crate::Result<Vec<R>> {
                $crate::store::list(self)
            }
        }
    };
}
pub(crate) use impl_record_store;

pub(crate) fn create<B: DocumentBackend, D: Draft>(backend: &B, draft: D) -> Result<D::Record> {
    let collection = <D::Record as Schema>::COLLECTION;
    let record = draft
        .validate(RecordId::generate())
        .map_err(|e| rejected(collection, e))?;

    backend.insert(collection, record.id(), serde_json::to_value(&record)?)?;
    debug!(collection, id = %record.id(), "record created");
    Ok(record)
}

pub(crate) fn create_document<B: DocumentBackend, R: Schema>(backend: &B, doc: &Value) -> Result<R> {
    let draft = <R::Draft as Draft>::from_document(doc).map_err(|e| rejected(R::COLLECTION, e))?;
    create(backend, draft)
}

pub(crate) fn read<B: DocumentBackend, R: Schema>(backend: &B, id: &RecordId) -> Result<Option<R>> {
    match backend.fetch(R::COLLECTION, id)? {
        Some(doc) => Ok(Some(serde_json::from_value(doc)?)),
        None => Ok(None),
    }
}

pub(crate) fn update<B: DocumentBackend, D: Draft>(
    backend: &B,
    id: &RecordId,
    draft: D,
) -> Result<D::Record> {
    let collection = <D::Record as Schema>::COLLECTION;
    let record = draft.validate(id.clone()).map_err(|e| rejected(collection, e))?;

    if !backend.replace(collection, id, serde_json::to_value(&record)?)? {
        return Err(StoreError::NotFound {
            collection: collection.to_string(),
            id: id.clone(),
        });
    }

    debug!(collection, %id, "record updated");
    Ok(record)
}

pub(crate) fn update_document<B: DocumentBackend, R: Schema>(
    backend: &B,
    id: &RecordId,
    doc: &Value,
) -> Result<R> {
    let draft = <R::Draft as Draft>::from_document(doc).map_err(|e| rejected(R::COLLECTION, e))?;
    update(backend, id, draft)
}

pub(crate) fn delete<R: Schema, B: DocumentBackend>(backend: &B, id: &RecordId) -> Result<bool> {
    let removed = backend.remove(R::COLLECTION, id)?;
    if removed {
        debug!(collection = R::COLLECTION, %id, "record deleted");
    }
    Ok(removed)
}

pub(crate) fn list<B: DocumentBackend, R: Schema>(backend: &B) -> Result<Vec<R>> {
    backend
        .scan(R::COLLECTION)?
        .into_iter()
        .map(|doc| serde_json::from_value(doc).map_err(StoreError::from))
        .collect()
}

fn rejected(collection: &'static str, err: ValidationError) -> StoreError {
    warn!(collection, error = %err, "write rejected");
    StoreError::Validation(err)
}
