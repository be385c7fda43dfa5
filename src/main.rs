use glam::Vec3;

use shaper3d::{EditorSession, Ray, ShapeKind};

/// Scripted headless session: builds a small scene, edits it, and walks the
/// history. Useful as a smoke test and as an API walkthrough.
fn main() {
    env_logger::init();
    log::info!("Starting Shaper 3D (headless)");

    let mut session = EditorSession::headless();

    let cube = session.add_shape(ShapeKind::Cube { width: 1.0, height: 1.0, depth: 1.0 });
    session.add_shape(ShapeKind::Sphere { radius: 0.5, segments: 24 });
    log::info!("scene has {} objects", session.scene().len());

    // Pick the cube's front face and pull it out.
    let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);
    if session.pick_face(&ray).is_some() {
        if let Err(e) = session.extrude_selected_face(None) {
            log::error!("extrude failed: {e}");
        }
    }
    if let Ok(mesh) = session.store().get(cube) {
        log::info!(
            "cube now has {} vertices and {} faces",
            mesh.vertex_count(),
            mesh.face_count()
        );
    }

    while session.undo() {}
    log::info!("after full undo: {} objects", session.scene().len());
    while session.redo() {}
    log::info!("after full redo: {} objects", session.scene().len());
}
