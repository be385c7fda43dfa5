pub mod mesh;
pub mod primitives;
pub mod store;

use std::collections::HashMap;

use glam::{Mat4, Quat, Vec3, Vec4};
use serde::{Serialize, Deserialize};

pub use mesh::{MeshData, MeshError};
pub use primitives::ShapeKind;
pub use store::{MeshStore, StoreError};

/// Stable identity of a scene object. Ids are never reused within a session,
/// so stale references (history, gesture buffer) can be detected by lookup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(pub u64);

/// Position, orientation and scale of a scene object.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn from_translation(translation: Vec3) -> Self {
        Self { translation, ..Self::default() }
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

/// Surface appearance of a shape. The emissive channel doubles as the
/// selection highlight.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub color: Vec4,
    pub emissive: Vec3,
    pub emissive_intensity: f32,
}

impl Material {
    pub fn new(color: Vec4) -> Self {
        Self { color, emissive: Vec3::ZERO, emissive_intensity: 0.0 }
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::new(Vec4::ONE)
    }
}

#[derive(Clone, Debug)]
pub enum ObjectKind {
    Shape { shape: ShapeKind, material: Material },
    Group { children: Vec<ObjectId> },
}

#[derive(Clone, Debug)]
pub struct SceneObject {
    pub name: String,
    pub visible: bool,
    pub transform: Transform,
    /// Owning group, or None for top-level objects.
    pub parent: Option<ObjectId>,
    pub kind: ObjectKind,
}

impl SceneObject {
    pub fn shape(name: impl Into<String>, shape: ShapeKind, material: Material) -> Self {
        Self {
            name: name.into(),
            visible: true,
            transform: Transform::default(),
            parent: None,
            kind: ObjectKind::Shape { shape, material },
        }
    }

    pub fn group(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            visible: true,
            transform: Transform::default(),
            parent: None,
            kind: ObjectKind::Group { children: Vec::new() },
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self.kind, ObjectKind::Group { .. })
    }

    pub fn material_mut(&mut self) -> Option<&mut Material> {
        match &mut self.kind {
            ObjectKind::Shape { material, .. } => Some(material),
            ObjectKind::Group { .. } => None,
        }
    }
}

/// Arena of scene objects with explicit root ordering.
///
/// Lookup is direct by id; iteration follows insertion order so picking
/// tie-breaks and export listings stay deterministic.
#[derive(Default)]
pub struct Scene {
    objects: HashMap<ObjectId, SceneObject>,
    roots: Vec<ObjectId>,
    next_id: u64,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    fn alloc_id(&mut self) -> ObjectId {
        self.next_id += 1;
        ObjectId(self.next_id)
    }

    /// Insert a new top-level object and return its id.
    pub fn insert(&mut self, object: SceneObject) -> ObjectId {
        let id = self.alloc_id();
        self.objects.insert(id, object);
        self.roots.push(id);
        id
    }

    /// Re-insert an object under a known id (snapshot restore). Keeps the id
    /// counter monotonic so restored ids are never reallocated.
    pub fn insert_with_id(&mut self, id: ObjectId, object: SceneObject, as_root: bool) {
        self.next_id = self.next_id.max(id.0);
        self.objects.insert(id, object);
        if as_root {
            self.roots.push(id);
        }
    }

    pub fn get(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.get(&id)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        self.objects.get_mut(&id)
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains_key(&id)
    }

    /// Top-level objects in insertion order.
    pub fn roots(&self) -> &[ObjectId] {
        &self.roots
    }

    /// Every object id, in no particular order.
    pub fn object_ids(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.objects.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Move an existing top-level object under a group.
    pub fn reparent_into_group(&mut self, child: ObjectId, group: ObjectId) {
        self.roots.retain(|&id| id != child);
        if let Some(object) = self.objects.get_mut(&child) {
            object.parent = Some(group);
        }
        if let Some(SceneObject { kind: ObjectKind::Group { children }, .. }) =
            self.objects.get_mut(&group)
        {
            children.push(child);
        }
    }

    /// Remove one object from the arena, unlinking it from its parent or the
    /// root list. Group children are not removed; callers recurse explicitly.
    pub fn remove(&mut self, id: ObjectId) -> Option<SceneObject> {
        let object = self.objects.remove(&id)?;
        match object.parent {
            Some(parent) => {
                if let Some(SceneObject { kind: ObjectKind::Group { children }, .. }) =
                    self.objects.get_mut(&parent)
                {
                    children.retain(|&c| c != id);
                }
            }
            None => self.roots.retain(|&r| r != id),
        }
        Some(object)
    }

    /// All shapes in draw order with their composed world transforms,
    /// skipping invisible objects (and everything under them).
    pub fn visible_shapes(&self) -> Vec<(ObjectId, Mat4)> {
        let mut out = Vec::new();
        for &root in &self.roots {
            self.collect_shapes(root, Mat4::IDENTITY, &mut out);
        }
        out
    }

    fn collect_shapes(&self, id: ObjectId, parent_world: Mat4, out: &mut Vec<(ObjectId, Mat4)>) {
        let Some(object) = self.objects.get(&id) else { return };
        if !object.visible {
            return;
        }
        let world = parent_world * object.transform.matrix();
        match &object.kind {
            ObjectKind::Shape { .. } => out.push((id, world)),
            ObjectKind::Group { children } => {
                for &child in children {
                    self.collect_shapes(child, world, out);
                }
            }
        }
    }

    /// Composed world transform of one object, walking the parent chain.
    pub fn world_matrix(&self, id: ObjectId) -> Mat4 {
        let Some(object) = self.objects.get(&id) else { return Mat4::IDENTITY };
        let local = object.transform.matrix();
        match object.parent {
            Some(parent) => self.world_matrix(parent) * local,
            None => local,
        }
    }

    /// Clear every object. Used by snapshot restore before rebuilding.
    pub fn clear(&mut self) {
        self.objects.clear();
        self.roots.clear();
    }
}
