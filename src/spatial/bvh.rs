use glam::Vec3;
use smallvec::SmallVec;

use crate::scene::MeshData;
use crate::spatial::Ray;

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn empty() -> Self {
        Self { min: Vec3::splat(f32::MAX), max: Vec3::splat(f32::MIN) }
    }

    pub fn from_triangle(v0: Vec3, v1: Vec3, v2: Vec3) -> Self {
        Self {
            min: v0.min(v1).min(v2),
            max: v0.max(v1).max(v2),
        }
    }

    pub fn expand(&mut self, other: &Self) {
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Index of the longest axis (0=X, 1=Y, 2=Z).
    pub fn longest_axis(&self) -> usize {
        let extent = self.max - self.min;
        if extent.x >= extent.y && extent.x >= extent.z {
            0
        } else if extent.y >= extent.z {
            1
        } else {
            2
        }
    }

    /// Slab test. Works with unnormalized ray directions; zero components
    /// divide to infinities, which the min/max form handles.
    pub fn intersects_ray(&self, ray: &Ray) -> bool {
        let inv = ray.direction.recip();
        let t0 = (self.min - ray.origin) * inv;
        let t1 = (self.max - ray.origin) * inv;
        let t_near = t0.min(t1);
        let t_far = t0.max(t1);
        let enter = t_near.max_element();
        let exit = t_far.min_element();
        exit >= enter.max(0.0)
    }
}

#[derive(Debug)]
enum BvhNode {
    Leaf {
        bbox: Aabb,
        triangles: SmallVec<[u32; 8]>,
    },
    Internal {
        bbox: Aabb,
        left: Box<BvhNode>,
        right: Box<BvhNode>,
    },
}

impl BvhNode {
    fn bbox(&self) -> &Aabb {
        match self {
            Self::Leaf { bbox, .. } | Self::Internal { bbox, .. } => bbox,
        }
    }
}

/// Bounding volume hierarchy over one mesh's triangles.
///
/// Median split on the longest axis; leaves hold small triangle lists. The
/// tree stores triangle indices only, so exact intersection tests read the
/// mesh buffers passed to `intersect_ray` — callers keep tree and buffers in
/// sync by rebuilding after every topology change.
#[derive(Debug)]
pub struct Bvh {
    root: Option<BvhNode>,
    triangle_count: usize,
}

impl Bvh {
    pub fn build(mesh: &MeshData, max_leaf_size: usize) -> Self {
        let face_count = mesh.face_count();
        if face_count == 0 {
            return Self { root: None, triangle_count: 0 };
        }

        let triangles: Vec<(u32, Aabb)> = (0..face_count)
            .filter_map(|face| {
                let [a, b, c] = mesh.face_corners(face)?;
                Some((face as u32, Aabb::from_triangle(a, b, c)))
            })
            .collect();

        let indices: Vec<usize> = (0..triangles.len()).collect();
        let root = Self::build_recursive(&triangles, indices, max_leaf_size.max(1));

        Self { root: Some(root), triangle_count: face_count }
    }

    fn build_recursive(
        triangles: &[(u32, Aabb)],
        indices: Vec<usize>,
        max_leaf_size: usize,
    ) -> BvhNode {
        let mut bbox = Aabb::empty();
        for &i in &indices {
            bbox.expand(&triangles[i].1);
        }

        if indices.len() <= max_leaf_size {
            let leaf: SmallVec<[u32; 8]> = indices.iter().map(|&i| triangles[i].0).collect();
            return BvhNode::Leaf { bbox, triangles: leaf };
        }

        let axis = bbox.longest_axis();
        let mut sorted = indices;
        sorted.sort_by(|&a, &b| {
            let ca = triangles[a].1.center()[axis];
            let cb = triangles[b].1.center()[axis];
            ca.partial_cmp(&cb).unwrap_or(std::cmp::Ordering::Equal)
        });

        let mid = sorted.len() / 2;
        let right_indices = sorted.split_off(mid);
        let left = Self::build_recursive(triangles, sorted, max_leaf_size);
        let right = Self::build_recursive(triangles, right_indices, max_leaf_size);

        BvhNode::Internal { bbox, left: Box::new(left), right: Box::new(right) }
    }

    pub fn triangle_count(&self) -> usize {
        self.triangle_count
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// All triangles hit by the ray, as (face index, ray parameter) pairs,
    /// in no particular order.
    pub fn intersect_ray(&self, ray: &Ray, mesh: &MeshData) -> Vec<(usize, f32)> {
        let mut hits = Vec::new();
        if let Some(root) = &self.root {
            Self::intersect_recursive(root, ray, mesh, &mut hits);
        }
        hits
    }

    fn intersect_recursive(
        node: &BvhNode,
        ray: &Ray,
        mesh: &MeshData,
        hits: &mut Vec<(usize, f32)>,
    ) {
        if !node.bbox().intersects_ray(ray) {
            return;
        }
        match node {
            BvhNode::Leaf { triangles, .. } => {
                for &face in triangles {
                    let face = face as usize;
                    if let Some([a, b, c]) = mesh.face_corners(face)
                        && let Some(t) = ray.intersect_triangle(a, b, c)
                    {
                        hits.push((face, t));
                    }
                }
            }
            BvhNode::Internal { left, right, .. } => {
                Self::intersect_recursive(left, ray, mesh, hits);
                Self::intersect_recursive(right, ray, mesh, hits);
            }
        }
    }
}
