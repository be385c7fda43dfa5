//! Whole-scene undo. Every committed edit captures a deep snapshot; undo and
//! redo move a cursor over the snapshot list and restores are full rebuilds,
//! so no edit needs an inverse operation.

use crate::scene::{MeshData, MeshStore, ObjectId, ObjectKind, Scene, SceneObject, Transform};

/// Deep copy of the whole scene at one point in time. Objects are stored in
/// traversal order (roots first, then group children), which `restore`
/// replays to rebuild identical root and child ordering.
#[derive(Clone)]
pub struct SceneSnapshot {
    objects: Vec<(ObjectId, SceneObject, Option<MeshData>)>,
}

impl SceneSnapshot {
    pub fn capture(scene: &Scene, store: &MeshStore) -> Self {
        let mut objects = Vec::with_capacity(scene.len());
        for &root in scene.roots() {
            Self::capture_subtree(root, scene, store, &mut objects);
        }
        Self { objects }
    }

    fn capture_subtree(
        id: ObjectId,
        scene: &Scene,
        store: &MeshStore,
        out: &mut Vec<(ObjectId, SceneObject, Option<MeshData>)>,
    ) {
        let Some(object) = scene.get(id) else { return };
        let mesh = store.clone_mesh(id).ok();
        out.push((id, object.clone(), mesh));
        if let ObjectKind::Group { children } = &object.kind {
            for &child in children {
                Self::capture_subtree(child, scene, store, out);
            }
        }
    }

    /// Replace the live scene and store with this snapshot's contents. The
    /// store marks every restored mesh dirty, so spatial indices follow.
    pub fn restore(&self, scene: &mut Scene, store: &mut MeshStore) {
        scene.clear();
        store.clear();
        for (id, object, mesh) in &self.objects {
            let as_root = object.parent.is_none();
            scene.insert_with_id(*id, object.clone(), as_root);
            if let Some(mesh) = mesh {
                store.insert(*id, mesh.clone());
            }
        }
    }

}

/// Bounded snapshot stack with a cursor at the current state.
///
/// A commit after undos discards the redo tail before appending. When the
/// stack exceeds its capacity the oldest entry falls off the bottom, so very
/// long sessions lose their earliest states but never grow without bound.
pub struct History {
    entries: Vec<SceneSnapshot>,
    cursor: usize,
    capacity: usize,
}

impl History {
    pub fn new(capacity: usize) -> Self {
        Self { entries: Vec::new(), cursor: 0, capacity: capacity.max(1) }
    }

    pub fn commit(&mut self, snapshot: SceneSnapshot) {
        if !self.entries.is_empty() {
            self.entries.truncate(self.cursor + 1);
        }
        self.entries.push(snapshot);
        if self.entries.len() > self.capacity {
            self.entries.remove(0);
        }
        self.cursor = self.entries.len() - 1;
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    /// Step back one state. At the oldest retained state this is a no-op
    /// returning None.
    pub fn undo(&mut self) -> Option<&SceneSnapshot> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        self.entries.get(self.cursor)
    }

    /// Step forward one state. A no-op at the newest state.
    pub fn redo(&mut self) -> Option<&SceneSnapshot> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        self.entries.get(self.cursor)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One-shot transform backup taken when a gizmo drag starts.
///
/// Unlike history commits this never moves the cursor; it exists so a drag
/// can be reverted without a snapshot of the whole scene. Consumed on use
/// and overwritten by the next drag.
#[derive(Default)]
pub struct GestureBuffer {
    slot: Option<Vec<(ObjectId, Transform)>>,
}

impl GestureBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the current transforms of the given objects, replacing any
    /// previous recording.
    pub fn save(&mut self, ids: &[ObjectId], scene: &Scene) {
        let saved = ids
            .iter()
            .filter_map(|&id| scene.get(id).map(|o| (id, o.transform)))
            .collect();
        self.slot = Some(saved);
    }

    /// Take the recording. A second take without an intervening save
    /// returns None.
    pub fn take(&mut self) -> Option<Vec<(ObjectId, Transform)>> {
        self.slot.take()
    }

    pub fn clear(&mut self) {
        self.slot = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    use crate::scene::{Material, SceneObject, ShapeKind};

    fn cube() -> ShapeKind {
        ShapeKind::Cube { width: 1.0, height: 1.0, depth: 1.0 }
    }

    fn one_cube_scene() -> (Scene, MeshStore, ObjectId) {
        let mut scene = Scene::new();
        let mut store = MeshStore::new();
        let id = scene.insert(SceneObject::shape("cube", cube(), Material::default()));
        store.insert(id, cube().build_mesh());
        (scene, store, id)
    }

    #[test]
    fn snapshot_round_trip_preserves_everything() {
        let (mut scene, mut store, id) = one_cube_scene();
        scene.get_mut(id).unwrap().transform.translation = Vec3::new(1.0, 2.0, 3.0);
        let snapshot = SceneSnapshot::capture(&scene, &store);

        scene.get_mut(id).unwrap().transform.translation = Vec3::ZERO;
        store.replace(id, crate::scene::MeshData::default()).unwrap();

        snapshot.restore(&mut scene, &mut store);
        assert_eq!(scene.get(id).unwrap().transform.translation, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(store.get(id).unwrap().vertex_count(), 24);
        assert_eq!(scene.roots(), &[id]);
    }

    #[test]
    fn restore_preserves_group_structure() {
        let (mut scene, mut store, a) = one_cube_scene();
        let g = scene.insert(SceneObject::group("g"));
        scene.reparent_into_group(a, g);
        let snapshot = SceneSnapshot::capture(&scene, &store);

        scene.clear();
        snapshot.restore(&mut scene, &mut store);

        assert_eq!(scene.roots(), &[g]);
        assert_eq!(scene.get(a).unwrap().parent, Some(g));
        assert_eq!(scene.visible_shapes().len(), 1);
    }

    #[test]
    fn undo_then_commit_discards_redo_tail() {
        let (mut scene, store, id) = one_cube_scene();
        let mut history = History::new(50);

        history.commit(SceneSnapshot::capture(&scene, &store)); // state 0
        scene.get_mut(id).unwrap().transform.translation.x = 1.0;
        history.commit(SceneSnapshot::capture(&scene, &store)); // state 1
        scene.get_mut(id).unwrap().transform.translation.x = 2.0;
        history.commit(SceneSnapshot::capture(&scene, &store)); // state 2

        assert!(history.undo().is_some());
        assert!(history.undo().is_some());
        assert!(history.can_redo());

        scene.get_mut(id).unwrap().transform.translation.x = 9.0;
        history.commit(SceneSnapshot::capture(&scene, &store));

        assert!(!history.can_redo(), "redo tail gone after commit");
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn undo_at_bottom_is_a_noop() {
        let (scene, store, _) = one_cube_scene();
        let mut history = History::new(50);
        history.commit(SceneSnapshot::capture(&scene, &store));
        assert!(history.undo().is_none());
        assert!(history.redo().is_none());
    }

    #[test]
    fn capacity_evicts_oldest() {
        let (mut scene, store, id) = one_cube_scene();
        let mut history = History::new(50);

        for i in 0..60 {
            scene.get_mut(id).unwrap().transform.translation.x = i as f32;
            history.commit(SceneSnapshot::capture(&scene, &store));
        }
        assert_eq!(history.len(), 50);

        // Walk all the way back; the oldest retained state is commit 10.
        let mut last_x = None;
        while history.can_undo() {
            let snap = history.undo().unwrap();
            let mut s = Scene::new();
            let mut m = MeshStore::new();
            snap.restore(&mut s, &mut m);
            last_x = Some(s.get(id).unwrap().transform.translation.x);
        }
        assert_eq!(last_x, Some(10.0));
    }

    #[test]
    fn gesture_buffer_is_consumed_once() {
        let (mut scene, _, id) = one_cube_scene();
        let mut gesture = GestureBuffer::new();

        gesture.save(&[id], &scene);
        scene.get_mut(id).unwrap().transform.translation.x = 5.0;

        let saved = gesture.take().unwrap();
        assert_eq!(saved, vec![(id, Transform::default())]);
        assert!(gesture.take().is_none());
    }
}
