//! Entity store abstraction and implementations.
//!
//! Documents are opaque JSON bytes keyed by [`EntityId`]; typed
//! encoding/decoding lives with the callers.

mod disk;
mod memory;

pub use disk::SledStore;
pub use memory::MemoryStore;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Error;
use crate::model::EntityId;

/// The collections the service persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    /// Student records.
    Students,
    /// Course records.
    Courses,
}

impl Collection {
    /// Tree/map name for the collection.
    pub fn name(&self) -> &'static str {
        match self {
            Collection::Students => "students",
            Collection::Courses => "courses",
        }
    }
}

/// Collection-scoped document CRUD.
///
/// Writes are whole-document (last write wins per document); nothing here
/// spans two documents atomically.
pub trait EntityStore: Send + Sync {
    /// Fetch a document by id.
    fn get(&self, collection: Collection, id: &EntityId) -> Result<Option<Vec<u8>>, Error>;

    /// Insert or overwrite a document.
    fn put(&self, collection: Collection, id: &EntityId, doc: &[u8]) -> Result<(), Error>;

    /// Remove a document, reporting whether it existed.
    fn remove(&self, collection: Collection, id: &EntityId) -> Result<bool, Error>;

    /// All documents in a collection, ordered by id.
    fn scan(&self, collection: Collection) -> Result<Vec<(EntityId, Vec<u8>)>, Error>;
}

/// Decode a stored JSON document.
pub(crate) fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, Error> {
    serde_json::from_slice(bytes).map_err(|e| Error::Deserialization(e.to_string()))
}

/// Encode a document for storage.
pub(crate) fn encode<T: Serialize>(doc: &T) -> Result<Vec<u8>, Error> {
    serde_json::to_vec(doc).map_err(|e| Error::Serialization(e.to_string()))
}
