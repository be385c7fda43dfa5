//! Boundaries to the embedding application. The core never draws or owns a
//! widget; it tells the host what changed and the host decides when pixels
//! move.

use glam::Mat4;

use crate::scene::ObjectId;

/// Receives scene membership changes and redraw requests.
pub trait RenderHost {
    fn add_to_scene(&mut self, id: ObjectId);
    fn remove_from_scene(&mut self, id: ObjectId);
    /// A state change happened outside the host's own event flow (undo of a
    /// drag, snapshot restore). The host should schedule a redraw.
    fn request_redraw(&mut self);
}

/// Manipulation widget the host renders around the selection.
pub trait TransformGizmo {
    fn attach(&mut self, id: ObjectId, world: Mat4);
    fn detach(&mut self);
}

/// Host that ignores everything. Default for headless use and tests.
#[derive(Default)]
pub struct NullRenderHost;

impl RenderHost for NullRenderHost {
    fn add_to_scene(&mut self, _id: ObjectId) {}
    fn remove_from_scene(&mut self, _id: ObjectId) {}
    fn request_redraw(&mut self) {}
}

#[derive(Default)]
pub struct NullGizmo;

impl TransformGizmo for NullGizmo {
    fn attach(&mut self, _id: ObjectId, _world: Mat4) {}
    fn detach(&mut self) {}
}
