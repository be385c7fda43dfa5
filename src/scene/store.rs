use std::collections::HashMap;

use thiserror::Error;

use crate::scene::{MeshData, ObjectId};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("no mesh for object {0:?}")]
    NotFound(ObjectId),
}

/// Canonical owner of every mesh's buffers. All structural edits go through
/// the store so the replace-then-invalidate ordering is enforced in one
/// place: `replace` records the object as dirty, and the session drains the
/// dirty list into the spatial index manager before the next query.
#[derive(Default)]
pub struct MeshStore {
    meshes: HashMap<ObjectId, MeshData>,
    /// Objects whose buffers changed since the spatial index last looked.
    dirty: Vec<ObjectId>,
}

impl MeshStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: ObjectId, mesh: MeshData) {
        self.meshes.insert(id, mesh);
        self.dirty.push(id);
    }

    pub fn get(&self, id: ObjectId) -> Result<&MeshData, StoreError> {
        self.meshes.get(&id).ok_or(StoreError::NotFound(id))
    }

    /// Atomically swap an object's buffers. The old buffers are dropped; the
    /// spatial index for this object becomes stale (marked, not rebuilt).
    pub fn replace(&mut self, id: ObjectId, mesh: MeshData) -> Result<(), StoreError> {
        let slot = self.meshes.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        *slot = mesh;
        self.dirty.push(id);
        Ok(())
    }

    /// Deep copy of an object's buffers for duplication. `Vec::clone` copies
    /// the data, so the result never aliases the source.
    pub fn clone_mesh(&self, id: ObjectId) -> Result<MeshData, StoreError> {
        self.get(id).cloned()
    }

    pub fn remove(&mut self, id: ObjectId) -> Option<MeshData> {
        self.dirty.retain(|&d| d != id);
        self.meshes.remove(&id)
    }

    /// Drain the ids whose buffers changed since the last drain.
    pub fn take_dirty(&mut self) -> Vec<ObjectId> {
        std::mem::take(&mut self.dirty)
    }

    pub fn clear(&mut self) {
        self.meshes.clear();
        self.dirty.clear();
    }
}
