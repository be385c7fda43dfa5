//! Per-triangle mesh surgery. Both edits are pure: they take the current
//! buffers and produce a complete replacement mesh, so a failure partway
//! through can never leave a half-edited mesh installed anywhere.

use thiserror::Error;

use crate::scene::MeshData;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FaceEditError {
    #[error("mesh has no index buffer, face edits need indexed geometry")]
    NotIndexed,
    #[error("face {face} out of range, mesh has {face_count} faces")]
    FaceOutOfRange { face: usize, face_count: usize },
}

fn checked_indices(mesh: &MeshData, face: usize) -> Result<[u32; 3], FaceEditError> {
    if !mesh.is_indexed() {
        return Err(FaceEditError::NotIndexed);
    }
    mesh.face_indices(face)
        .ok_or(FaceEditError::FaceOutOfRange { face, face_count: mesh.face_count() })
}

/// Pull one triangle out along its geometric normal.
///
/// Three new vertices are appended at the displaced corner positions, the
/// original triangle is rewritten to reference them, and three side quads
/// (two triangles each) stitch the old corners to the new ones. Net effect:
/// three more vertices, six more faces. The original corner vertices stay in
/// place because neighboring faces still reference them.
pub fn extrude_face(mesh: &MeshData, face: usize, distance: f32) -> Result<MeshData, FaceEditError> {
    let [ia, ib, ic] = checked_indices(mesh, face)?;
    let a = mesh.position(ia as usize);
    let b = mesh.position(ib as usize);
    let c = mesh.position(ic as usize);
    let normal = (b - a).cross(c - a).normalize_or_zero();
    let offset = normal * distance;

    let mut out = mesh.clone();
    let top_a = out.push_vertex(a + offset);
    let top_b = out.push_vertex(b + offset);
    let top_c = out.push_vertex(c + offset);

    // The cap keeps the original face slot, pointed at the new vertices.
    out.indices[face * 3] = top_a;
    out.indices[face * 3 + 1] = top_b;
    out.indices[face * 3 + 2] = top_c;

    // Side walls, wound outward to match the cap.
    for (bottom0, bottom1, top0, top1) in
        [(ia, ib, top_a, top_b), (ib, ic, top_b, top_c), (ic, ia, top_c, top_a)]
    {
        out.indices.extend_from_slice(&[bottom0, bottom1, top1, bottom0, top1, top0]);
    }

    out.recompute_normals();
    Ok(out)
}

/// Remove one triangle from the index buffer, leaving a hole.
///
/// Vertex buffers are untouched; corners used only by the deleted face stay
/// behind as orphans. That keeps every other face's indices valid without a
/// compaction pass, at the cost of some dead vertex data.
pub fn delete_face(mesh: &MeshData, face: usize) -> Result<MeshData, FaceEditError> {
    checked_indices(mesh, face)?;

    let mut out = mesh.clone();
    out.indices.drain(face * 3..face * 3 + 3);
    out.recompute_normals();
    Ok(out)
}
