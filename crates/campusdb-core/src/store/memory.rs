//! Ephemeral in-memory entity store.
//!
//! Same contract as the sled store, but nothing survives the process. Backs
//! the gateway's `--ephemeral` mode and the test suites.

use dashmap::DashMap;

use super::{Collection, EntityStore};
use crate::error::Error;
use crate::model::EntityId;

/// In-memory store with one map per collection.
#[derive(Default)]
pub struct MemoryStore {
    students: DashMap<EntityId, Vec<u8>>,
    courses: DashMap<EntityId, Vec<u8>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn map(&self, collection: Collection) -> &DashMap<EntityId, Vec<u8>> {
        match collection {
            Collection::Students => &self.students,
            Collection::Courses => &self.courses,
        }
    }
}

impl EntityStore for MemoryStore {
    fn get(&self, collection: Collection, id: &EntityId) -> Result<Option<Vec<u8>>, Error> {
        Ok(self.map(collection).get(id).map(|doc| doc.value().clone()))
    }

    fn put(&self, collection: Collection, id: &EntityId, doc: &[u8]) -> Result<(), Error> {
        self.map(collection).insert(*id, doc.to_vec());
        Ok(())
    }

    fn remove(&self, collection: Collection, id: &EntityId) -> Result<bool, Error> {
        Ok(self.map(collection).remove(id).is_some())
    }

    fn scan(&self, collection: Collection) -> Result<Vec<(EntityId, Vec<u8>)>, Error> {
        let mut docs: Vec<(EntityId, Vec<u8>)> = self
            .map(collection)
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect();
        // Map iteration order is arbitrary; keep scans stable.
        docs.sort_by_key(|(id, _)| *id);
        Ok(docs)
    }
}
