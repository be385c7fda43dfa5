//! End-to-end exercises of the editing session: a host drives the public API
//! the way a UI would, and we check the invariants that hold across whole
//! edit sequences rather than single calls.

use std::cell::RefCell;
use std::rc::Rc;

use glam::{Mat4, Vec3};

use shaper3d::{
    extrude_face, EditorSession, MeshData, ObjectId, Ray, RenderHost, SessionError, Settings,
    ShapeKind, Transform, TransformGizmo,
};

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
enum HostEvent {
    Added(ObjectId),
    Removed(ObjectId),
    Redraw,
}

#[derive(Clone, Default)]
struct RecordingHost {
    events: Rc<RefCell<Vec<HostEvent>>>,
}

impl RenderHost for RecordingHost {
    fn add_to_scene(&mut self, id: ObjectId) {
        self.events.borrow_mut().push(HostEvent::Added(id));
    }
    fn remove_from_scene(&mut self, id: ObjectId) {
        self.events.borrow_mut().push(HostEvent::Removed(id));
    }
    fn request_redraw(&mut self) {
        self.events.borrow_mut().push(HostEvent::Redraw);
    }
}

#[derive(Clone, Default)]
struct RecordingGizmo {
    attached: Rc<RefCell<Option<ObjectId>>>,
}

impl TransformGizmo for RecordingGizmo {
    fn attach(&mut self, id: ObjectId, _world: Mat4) {
        *self.attached.borrow_mut() = Some(id);
    }
    fn detach(&mut self) {
        *self.attached.borrow_mut() = None;
    }
}

fn cube() -> ShapeKind {
    ShapeKind::Cube { width: 1.0, height: 1.0, depth: 1.0 }
}

fn front_ray(x: f32) -> Ray {
    Ray::new(Vec3::new(x, 0.0, 5.0), Vec3::NEG_Z)
}

fn session_with_host() -> (EditorSession, RecordingHost, RecordingGizmo) {
    let host = RecordingHost::default();
    let gizmo = RecordingGizmo::default();
    let session =
        EditorSession::new(Settings::default(), Box::new(host.clone()), Box::new(gizmo.clone()));
    (session, host, gizmo)
}

#[test]
fn full_edit_sequence_survives_undo_redo_round_trip() {
    let mut session = EditorSession::headless();

    let cube_id = session.add_shape(cube());
    let sphere = session.add_shape(ShapeKind::Sphere { radius: 0.5, segments: 16 });
    session.set_transform(sphere, Transform::from_translation(Vec3::new(4.0, 0.0, 0.0)));

    session.pick_face(&front_ray(0.0)).unwrap();
    session.extrude_selected_face(Some(0.75)).unwrap();
    let edited_faces = session.store().get(cube_id).unwrap().face_count();

    session.pick_object(&front_ray(0.0));
    session.duplicate_selected().unwrap();
    let full_count = session.scene().len();

    // Walk all the way back and forward again.
    while session.undo() {}
    assert!(session.scene().is_empty());
    while session.redo() {}

    assert_eq!(session.scene().len(), full_count);
    assert_eq!(session.store().get(cube_id).unwrap().face_count(), edited_faces);
}

#[test]
fn host_is_told_about_membership_changes() {
    let (mut session, host, _) = session_with_host();

    let id = session.add_shape(cube());
    assert!(host.events.borrow().contains(&HostEvent::Added(id)));

    session.pick_object(&front_ray(0.0));
    session.delete_selection().unwrap();
    assert!(host.events.borrow().contains(&HostEvent::Removed(id)));

    host.events.borrow_mut().clear();
    session.undo();
    let events = host.events.borrow();
    assert!(events.contains(&HostEvent::Added(id)), "restore re-adds the object");
    assert!(events.contains(&HostEvent::Redraw), "restore requests a redraw");
}

#[test]
fn gizmo_follows_selection() {
    let (mut session, _, gizmo) = session_with_host();
    let id = session.add_shape(cube());

    session.pick_object(&front_ray(0.0));
    assert_eq!(*gizmo.attached.borrow(), Some(id));

    session.pick_object(&front_ray(50.0)); // miss clears
    assert_eq!(*gizmo.attached.borrow(), None);
}

#[test]
fn face_selection_and_object_selection_exclude_each_other() {
    let mut session = EditorSession::headless();
    let id = session.add_shape(cube());

    session.pick_object(&front_ray(0.0));
    assert_eq!(session.selection().selected(), &[id]);

    session.pick_face(&front_ray(0.0)).unwrap();
    assert!(session.selection().selected().is_empty());
    assert!(session.selection().selected_face().is_some());

    session.pick_object(&front_ray(0.0));
    assert!(session.selection().selected_face().is_none());
    assert_eq!(session.selection().selected(), &[id]);
}

#[test]
fn extrude_walkthrough_counts() {
    // Two unit quads of four vertices each: 8 vertices, 12 index values.
    let mut mesh = MeshData::new(
        vec![
            0.0, 0.0, 0.0, //
            1.0, 0.0, 0.0, //
            1.0, 1.0, 0.0, //
            0.0, 1.0, 0.0, //
            0.0, 0.0, 2.0, //
            1.0, 0.0, 2.0, //
            1.0, 1.0, 2.0, //
            0.0, 1.0, 2.0,
        ],
        vec![0, 1, 2, 0, 2, 3, 4, 5, 6, 4, 6, 7],
    );
    mesh.recompute_normals();

    let out = extrude_face(&mesh, 0, 1.0).unwrap();
    assert_eq!(out.vertex_count(), 11);
    assert_eq!(out.face_count(), 10);
    assert_eq!(out.indices.len(), 12 + 18, "three side quads as two triangles each");
    assert_eq!(&out.indices[..3], &[8, 9, 10], "cap rewritten to the new vertices");
    out.validate().unwrap();
}

#[test]
fn deleting_one_of_stacked_objects_keeps_the_other_pickable() {
    let mut session = EditorSession::headless();
    let big = session.add_shape(ShapeKind::Cube { width: 2.0, height: 2.0, depth: 2.0 });
    let small = session.add_shape(ShapeKind::Cube { width: 1.0, height: 1.0, depth: 1.0 });

    // The small cube sits inside the big one; the big front face is nearest.
    assert_eq!(session.pick_object(&front_ray(0.0)), Some(big));
    session.delete_selection().unwrap();

    assert_eq!(session.pick_object(&front_ray(0.0)), Some(small));
}

#[test]
fn group_then_ungroup_by_undo() {
    let mut session = EditorSession::headless();
    let a = session.add_shape(cube());
    let b = session.add_shape(cube());
    session.set_transform(b, Transform::from_translation(Vec3::new(3.0, 0.0, 0.0)));

    session.pick_object(&front_ray(0.0));
    session.pick_object(&front_ray(3.0));
    let group = session.create_group().unwrap();
    assert_eq!(session.scene().roots(), &[group]);

    assert!(session.undo());
    assert_eq!(session.scene().roots(), &[a, b]);
    assert!(session.scene().get(a).unwrap().parent.is_none());
}

#[test]
fn invisible_objects_are_not_pickable() {
    let (mut session, _, _) = session_with_host();
    let id = session.add_shape(cube());
    assert_eq!(session.pick_object(&front_ray(0.0)), Some(id));
    session.clear_selection();

    // Hide it through the scene view used by hosts.
    let mut snapshotless = EditorSession::headless();
    let hidden = snapshotless.add_shape(cube());
    snapshotless.set_visible(hidden, false);
    assert_eq!(snapshotless.pick_object(&front_ray(0.0)), None);
}

#[test]
fn export_listing_prefers_the_selection() {
    let mut session = EditorSession::headless();
    let a = session.add_shape(cube());
    let b = session.add_shape(cube());
    session.set_transform(b, Transform::from_translation(Vec3::new(3.0, 0.0, 0.0)));

    // No selection: all visible top-level objects, in insertion order.
    assert_eq!(session.visible_or_selected_objects(), vec![a, b]);

    session.pick_object(&front_ray(3.0));
    assert_eq!(session.visible_or_selected_objects(), vec![b]);
    session.clear_selection();

    session.set_visible(a, false);
    assert_eq!(session.visible_or_selected_objects(), vec![b]);
}

#[test]
fn export_listing_covers_groups_once() {
    let mut session = EditorSession::headless();
    session.add_shape(cube());
    let b = session.add_shape(cube());
    session.set_transform(b, Transform::from_translation(Vec3::new(3.0, 0.0, 0.0)));
    let loose = session.add_shape(cube());
    session.set_transform(loose, Transform::from_translation(Vec3::new(-3.0, 0.0, 0.0)));

    session.pick_object(&front_ray(0.0));
    session.pick_object(&front_ray(3.0));
    let group = session.create_group().unwrap();

    // Grouped children are represented by the group entry only.
    assert_eq!(session.visible_or_selected_objects(), vec![loose, group]);
}

#[test]
fn errors_on_empty_selection() {
    let mut session = EditorSession::headless();
    assert_eq!(session.duplicate_selected(), Err(SessionError::NothingSelected));
    assert_eq!(session.delete_selection(), Err(SessionError::NothingSelected));
    assert_eq!(session.extrude_selected_face(None), Err(SessionError::NothingSelected));
}
