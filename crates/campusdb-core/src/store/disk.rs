//! Sled-backed entity store.

use std::path::Path;

use sled::{Db, Tree};

use super::{Collection, EntityStore};
use crate::error::Error;
use crate::model::EntityId;

/// Persistent store with one sled tree per collection.
pub struct SledStore {
    db: Db,
    students: Tree,
    courses: Tree,
}

impl SledStore {
    /// Open or create a store under the given directory.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let db = sled::open(path)?;
        let students = db.open_tree(Collection::Students.name())?;
        let courses = db.open_tree(Collection::Courses.name())?;

        Ok(Self {
            db,
            students,
            courses,
        })
    }

    /// Flush all pending writes to disk.
    pub fn flush(&self) -> Result<(), Error> {
        self.db.flush()?;
        Ok(())
    }

    fn tree(&self, collection: Collection) -> &Tree {
        match collection {
            Collection::Students => &self.students,
            Collection::Courses => &self.courses,
        }
    }
}

impl EntityStore for SledStore {
    fn get(&self, collection: Collection, id: &EntityId) -> Result<Option<Vec<u8>>, Error> {
        Ok(self
            .tree(collection)
            .get(id.as_bytes())?
            .map(|ivec| ivec.to_vec()))
    }

    fn put(&self, collection: Collection, id: &EntityId, doc: &[u8]) -> Result<(), Error> {
        self.tree(collection).insert(id.as_bytes(), doc)?;
        Ok(())
    }

    fn remove(&self, collection: Collection, id: &EntityId) -> Result<bool, Error> {
        Ok(self.tree(collection).remove(id.as_bytes())?.is_some())
    }

    fn scan(&self, collection: Collection) -> Result<Vec<(EntityId, Vec<u8>)>, Error> {
        let mut docs = Vec::new();
        for result in self.tree(collection).iter() {
            let (key, value) = result?;
            let bytes: [u8; 16] = key
                .as_ref()
                .try_into()
                .map_err(|_| Error::Deserialization("store key is not 16 bytes".to_string()))?;
            docs.push((EntityId::from_bytes(bytes), value.to_vec()));
        }
        Ok(docs)
    }
}
