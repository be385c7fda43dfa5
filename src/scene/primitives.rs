use std::f32::consts::{PI, TAU};

use glam::Vec3;
use serde::{Serialize, Deserialize};

use crate::scene::mesh::MeshData;

/// Parametric shape tag. Each variant carries the construction parameters
/// needed to rebuild its base mesh.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum ShapeKind {
    Cube { width: f32, height: f32, depth: f32 },
    Sphere { radius: f32, segments: u32 },
    Cylinder { radius_top: f32, radius_bottom: f32, height: f32, segments: u32 },
    Pyramid { radius: f32, height: f32, sides: u32 },
    Plane { width: f32, height: f32, width_segments: u32, height_segments: u32 },
}

impl ShapeKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Cube { .. } => "Cube",
            Self::Sphere { .. } => "Sphere",
            Self::Cylinder { .. } => "Cylinder",
            Self::Pyramid { .. } => "Pyramid",
            Self::Plane { .. } => "Plane",
        }
    }

    /// Build the indexed mesh for this shape, centered at the origin, with
    /// smooth vertex normals already computed.
    pub fn build_mesh(&self) -> MeshData {
        let mut mesh = match *self {
            Self::Cube { width, height, depth } => cube(width, height, depth),
            Self::Sphere { radius, segments } => sphere(radius, segments.max(3)),
            Self::Cylinder { radius_top, radius_bottom, height, segments } => {
                cylinder(radius_top, radius_bottom, height, segments.max(3))
            }
            Self::Pyramid { radius, height, sides } => {
                // A pyramid is a cone with few radial segments.
                cylinder(0.0, radius, height, sides.max(3))
            }
            Self::Plane { width, height, width_segments, height_segments } => {
                plane(width, height, width_segments.max(1), height_segments.max(1))
            }
        };
        mesh.recompute_normals();
        mesh
    }
}

/// Box with 4 vertices per side (24 total) so faces stay flat under smooth
/// normal recomputation.
fn cube(width: f32, height: f32, depth: f32) -> MeshData {
    let (hx, hy, hz) = (width * 0.5, height * 0.5, depth * 0.5);
    let mut mesh = MeshData::default();

    // (normal, right, up, half extents along right/up, offset along normal)
    let sides = [
        (Vec3::X, Vec3::NEG_Z, Vec3::Y, hz, hy, hx),
        (Vec3::NEG_X, Vec3::Z, Vec3::Y, hz, hy, hx),
        (Vec3::Y, Vec3::X, Vec3::NEG_Z, hx, hz, hy),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z, hx, hz, hy),
        (Vec3::Z, Vec3::X, Vec3::Y, hx, hy, hz),
        (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y, hx, hy, hz),
    ];

    for (normal, right, up, hw, hh, offset) in sides {
        let center = normal * offset;
        let base = mesh.vertex_count() as u32;
        mesh.push_vertex(center - right * hw - up * hh);
        mesh.push_vertex(center + right * hw - up * hh);
        mesh.push_vertex(center + right * hw + up * hh);
        mesh.push_vertex(center - right * hw + up * hh);
        mesh.indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    mesh
}

/// UV sphere: `segments` rings and `segments` slices, poles included.
fn sphere(radius: f32, segments: u32) -> MeshData {
    let mut mesh = MeshData::default();
    let rings = segments;

    for ring in 0..=rings {
        let theta = PI * ring as f32 / rings as f32;
        let (sin_t, cos_t) = theta.sin_cos();
        for seg in 0..=segments {
            let phi = TAU * seg as f32 / segments as f32;
            let (sin_p, cos_p) = phi.sin_cos();
            let p = Vec3::new(sin_t * cos_p, cos_t, sin_t * sin_p) * radius;
            mesh.positions.extend_from_slice(&[p.x, p.y, p.z]);
            mesh.uvs.extend_from_slice(&[
                seg as f32 / segments as f32,
                ring as f32 / rings as f32,
            ]);
        }
    }

    let stride = segments + 1;
    for ring in 0..rings {
        for seg in 0..segments {
            let a = ring * stride + seg;
            let b = a + stride;
            if ring > 0 {
                mesh.indices.extend_from_slice(&[a, b, a + 1]);
            }
            if ring < rings - 1 {
                mesh.indices.extend_from_slice(&[a + 1, b, b + 1]);
            }
        }
    }

    mesh
}

/// Cylinder (or cone when `radius_top` is zero) with side wall and caps.
fn cylinder(radius_top: f32, radius_bottom: f32, height: f32, segments: u32) -> MeshData {
    let half_h = height * 0.5;
    let mut mesh = MeshData::default();

    // Side wall: two rings of shared vertices.
    for (y, radius) in [(-half_h, radius_bottom), (half_h, radius_top)] {
        for seg in 0..=segments {
            let phi = TAU * seg as f32 / segments as f32;
            let (sin_p, cos_p) = phi.sin_cos();
            mesh.positions.extend_from_slice(&[radius * sin_p, y, radius * cos_p]);
        }
    }
    let stride = segments + 1;
    for seg in 0..segments {
        let a = seg;
        let b = seg + stride;
        mesh.indices.extend_from_slice(&[a, a + 1, b, a + 1, b + 1, b]);
    }

    // Caps: fan around a center vertex. The top cap collapses for cones.
    for (y, radius, flip) in [(-half_h, radius_bottom, true), (half_h, radius_top, false)] {
        if radius <= 0.0 {
            continue;
        }
        let center = mesh.push_vertex(Vec3::new(0.0, y, 0.0));
        let ring_start = mesh.vertex_count() as u32;
        for seg in 0..=segments {
            let phi = TAU * seg as f32 / segments as f32;
            let (sin_p, cos_p) = phi.sin_cos();
            mesh.push_vertex(Vec3::new(radius * sin_p, y, radius * cos_p));
        }
        for seg in 0..segments {
            let a = ring_start + seg;
            // Fans wound [center, a, a+1] face +Y; the bottom cap is reversed.
            if flip {
                mesh.indices.extend_from_slice(&[center, a + 1, a]);
            } else {
                mesh.indices.extend_from_slice(&[center, a, a + 1]);
            }
        }
    }

    mesh
}

/// Subdivided plane in the XZ plane facing +Y.
fn plane(width: f32, height: f32, width_segments: u32, height_segments: u32) -> MeshData {
    let mut mesh = MeshData::default();

    for row in 0..=height_segments {
        let z = (row as f32 / height_segments as f32 - 0.5) * height;
        for col in 0..=width_segments {
            let x = (col as f32 / width_segments as f32 - 0.5) * width;
            mesh.positions.extend_from_slice(&[x, 0.0, z]);
            mesh.uvs.extend_from_slice(&[
                col as f32 / width_segments as f32,
                row as f32 / height_segments as f32,
            ]);
        }
    }

    let stride = width_segments + 1;
    for row in 0..height_segments {
        for col in 0..width_segments {
            let a = row * stride + col;
            let b = a + stride;
            mesh.indices.extend_from_slice(&[a, b, a + 1, a + 1, b, b + 1]);
        }
    }

    mesh
}
