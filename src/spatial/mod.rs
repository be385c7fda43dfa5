pub mod bvh;

use std::collections::HashMap;

use glam::Vec3;

use crate::scene::{MeshStore, ObjectId, Scene};
pub use bvh::{Aabb, Bvh};

/// A ray in 3D space.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    /// Intersect with a triangle (Möller–Trumbore). Returns the ray
    /// parameter if hit, None if miss. Back faces are reported too; the
    /// caller sorts by distance and takes what it needs.
    pub fn intersect_triangle(&self, v0: Vec3, v1: Vec3, v2: Vec3) -> Option<f32> {
        let edge1 = v1 - v0;
        let edge2 = v2 - v0;
        let h = self.direction.cross(edge2);
        let a = edge1.dot(h);

        if a.abs() < 1e-7 {
            return None; // Parallel to triangle
        }

        let f = 1.0 / a;
        let s = self.origin - v0;
        let u = f * s.dot(h);

        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(edge1);
        let v = f * self.direction.dot(q);

        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = f * edge2.dot(q);
        if t > 1e-7 { Some(t) } else { None }
    }

    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// One ray/mesh intersection, in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub object: ObjectId,
    pub face_index: usize,
    pub distance: f32,
    pub point: Vec3,
}

/// Per-mesh BVH cache.
///
/// The map entry is the index state for an object: absent means stale (built
/// on next use), `Some` is a live tree, `None` records a failed build so the
/// object falls back to brute-force triangle testing. Indices are a derived
/// cache over the mesh store's buffers, never the source of truth.
pub struct SpatialIndexManager {
    entries: HashMap<ObjectId, Option<Bvh>>,
    max_leaf_size: usize,
}

impl SpatialIndexManager {
    pub fn new(max_leaf_size: usize) -> Self {
        Self { entries: HashMap::new(), max_leaf_size: max_leaf_size.max(1) }
    }

    /// Mark an object's index stale. Lazy and idempotent: the rebuild happens
    /// on the next query (or an explicit `rebuild`).
    pub fn invalidate(&mut self, id: ObjectId) {
        self.entries.remove(&id);
    }

    /// Rebuild the index from the store's current buffers. Never fails loud:
    /// a missing or empty mesh is logged and leaves no index attached.
    pub fn rebuild(&mut self, id: ObjectId, store: &MeshStore) {
        match store.get(id) {
            Ok(mesh) if mesh.vertex_count() > 0 => {
                let bvh = Bvh::build(mesh, self.max_leaf_size);
                log::debug!("rebuilt spatial index for {id:?} ({} triangles)", bvh.triangle_count());
                self.entries.insert(id, Some(bvh));
            }
            Ok(_) => {
                log::warn!("not building spatial index for {id:?}: mesh has no vertices");
                self.entries.insert(id, None);
            }
            Err(e) => {
                log::warn!("not building spatial index: {e}");
                self.entries.remove(&id);
            }
        }
    }

    /// Absorb the store's dirty list, invalidating each changed object.
    pub fn absorb_dirty(&mut self, store: &mut MeshStore) {
        for id in store.take_dirty() {
            self.invalidate(id);
        }
    }

    pub fn has_index(&self, id: ObjectId) -> bool {
        matches!(self.entries.get(&id), Some(Some(_)))
    }

    /// Cast a world-space ray against every visible shape.
    ///
    /// `ray.direction` should be normalized so that `distance` is a world
    /// distance. Hits from all objects are merged and sorted ascending by
    /// distance; ties keep scene insertion order (stable sort over an
    /// insertion-ordered walk). Returns an empty vec on no hit.
    pub fn query(&mut self, ray: &Ray, scene: &Scene, store: &MeshStore) -> Vec<RayHit> {
        let mut out = Vec::new();

        for (id, world) in scene.visible_shapes() {
            let Ok(mesh) = store.get(id) else { continue };

            // Intersect in local space. The linear map preserves the ray
            // parameter, so local t values are world distances as long as
            // the world direction is normalized.
            let inv = world.inverse();
            let local = Ray {
                origin: inv.transform_point3(ray.origin),
                direction: inv.transform_vector3(ray.direction),
            };

            if !self.entries.contains_key(&id) {
                self.rebuild(id, store);
            }

            let hits = match self.entries.get(&id) {
                Some(Some(bvh)) => bvh.intersect_ray(&local, mesh),
                // ResourceUnavailable: fall back to brute force, never error.
                _ => brute_force(&local, mesh),
            };

            for (face_index, t) in hits {
                out.push(RayHit {
                    object: id,
                    face_index,
                    distance: t,
                    point: ray.point_at(t),
                });
            }
        }

        out.sort_by(|a, b| {
            a.distance.partial_cmp(&b.distance).unwrap_or(std::cmp::Ordering::Equal)
        });
        out
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

fn brute_force(ray: &Ray, mesh: &crate::scene::MeshData) -> Vec<(usize, f32)> {
    (0..mesh.face_count())
        .filter_map(|face| {
            let [a, b, c] = mesh.face_corners(face)?;
            ray.intersect_triangle(a, b, c).map(|t| (face, t))
        })
        .collect()
}
