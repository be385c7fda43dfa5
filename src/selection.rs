use glam::Vec3;

use crate::host::TransformGizmo;
use crate::scene::{MeshStore, ObjectId, ObjectKind, Scene};

pub(crate) const HIGHLIGHT_COLOR: Vec3 = Vec3::new(1.0, 1.0, 0.0);

/// What the user has selected right now.
///
/// Object selection and face selection are mutually exclusive: entering one
/// leaves the other. Within object selection, groups and loose shapes never
/// mix — picking a grouped shape selects its group, and a group in the set
/// means only groups are in the set.
pub struct SelectionController {
    selected: Vec<ObjectId>,
    face: Option<(ObjectId, usize)>,
    highlight_intensity: f32,
}

impl SelectionController {
    pub fn new(highlight_intensity: f32) -> Self {
        Self { selected: Vec::new(), face: None, highlight_intensity }
    }

    /// Selected objects in the order they were selected.
    pub fn selected(&self) -> &[ObjectId] {
        &self.selected
    }

    pub fn selected_face(&self) -> Option<(ObjectId, usize)> {
        self.face
    }

    pub fn is_selected(&self, id: ObjectId) -> bool {
        self.selected.contains(&id)
    }

    /// Toggle an object in the selection.
    ///
    /// Selecting anything clears a face selection. When the new object's
    /// group-ness differs from the current set's, the set is replaced rather
    /// than extended. Returns whether the object ended up selected.
    pub fn select_object(
        &mut self,
        id: ObjectId,
        scene: &mut Scene,
        gizmo: &mut dyn TransformGizmo,
    ) -> bool {
        if !scene.contains(id) {
            log::warn!("ignoring selection of unknown object {id:?}");
            return false;
        }
        self.clear_face();

        if self.is_selected(id) {
            self.selected.retain(|&s| s != id);
            set_highlight(scene, id, Vec3::ZERO, 0.0);
            self.sync_gizmo(scene, gizmo);
            return false;
        }

        let incoming_is_group = scene.get(id).is_some_and(|o| o.is_group());
        let set_has_group = self
            .selected
            .first()
            .and_then(|&s| scene.get(s))
            .is_some_and(|o| o.is_group());
        if !self.selected.is_empty() && incoming_is_group != set_has_group {
            self.clear(scene, gizmo);
        }

        self.selected.push(id);
        set_highlight(scene, id, HIGHLIGHT_COLOR, self.highlight_intensity);
        self.sync_gizmo(scene, gizmo);
        true
    }

    /// Enter face selection on one triangle. Out-of-range faces are ignored
    /// so a stale pick after an edit cannot wedge the controller.
    pub fn select_face(
        &mut self,
        id: ObjectId,
        face: usize,
        scene: &mut Scene,
        store: &MeshStore,
        gizmo: &mut dyn TransformGizmo,
    ) {
        let face_count = match store.get(id) {
            Ok(mesh) => mesh.face_count(),
            Err(e) => {
                log::warn!("ignoring face selection: {e}");
                return;
            }
        };
        if face >= face_count {
            log::debug!("ignoring face selection {face} on {id:?} ({face_count} faces)");
            return;
        }
        self.clear(scene, gizmo);
        self.face = Some((id, face));
    }

    /// Drop any selection and remove every highlight.
    pub fn clear(&mut self, scene: &mut Scene, gizmo: &mut dyn TransformGizmo) {
        for id in std::mem::take(&mut self.selected) {
            set_highlight(scene, id, Vec3::ZERO, 0.0);
        }
        self.face = None;
        gizmo.detach();
    }

    fn clear_face(&mut self) {
        self.face = None;
    }

    /// Drop the face selection if it points at this object. Called after any
    /// edit to the object's mesh, since the stored face index may no longer
    /// refer to the same triangle.
    pub fn clear_face_for(&mut self, id: ObjectId) {
        if self.face.is_some_and(|(owner, _)| owner == id) {
            self.face = None;
        }
    }

    /// Forget everything without touching materials. For use after a
    /// snapshot restore, when the scene was rebuilt highlight-free.
    pub fn reset(&mut self) {
        self.selected.clear();
        self.face = None;
    }

    /// Drop a removed object from the selection without touching the scene.
    pub fn forget(&mut self, id: ObjectId) {
        self.selected.retain(|&s| s != id);
        self.clear_face_for(id);
    }

    fn sync_gizmo(&self, scene: &Scene, gizmo: &mut dyn TransformGizmo) {
        match self.selected.last() {
            Some(&id) => gizmo.attach(id, scene.world_matrix(id)),
            None => gizmo.detach(),
        }
    }
}

/// Apply the emissive highlight to a shape, or to every shape under a group.
pub(crate) fn set_highlight(scene: &mut Scene, id: ObjectId, color: Vec3, intensity: f32) {
    let children = match scene.get(id).map(|o| &o.kind) {
        Some(ObjectKind::Group { children }) => children.clone(),
        Some(ObjectKind::Shape { .. }) => {
            if let Some(material) = scene.get_mut(id).and_then(|o| o.material_mut()) {
                material.emissive = color;
                material.emissive_intensity = intensity;
            }
            return;
        }
        None => return,
    };
    for child in children {
        set_highlight(scene, child, color, intensity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::NullGizmo;
    use crate::scene::{Material, MeshData, SceneObject, ShapeKind};

    fn cube() -> ShapeKind {
        ShapeKind::Cube { width: 1.0, height: 1.0, depth: 1.0 }
    }

    fn shape(scene: &mut Scene, name: &str) -> ObjectId {
        scene.insert(SceneObject::shape(name, cube(), Material::default()))
    }

    fn emissive_intensity(scene: &Scene, id: ObjectId) -> f32 {
        match &scene.get(id).unwrap().kind {
            ObjectKind::Shape { material, .. } => material.emissive_intensity,
            _ => panic!("not a shape"),
        }
    }

    #[test]
    fn toggle_selects_and_deselects() {
        let mut scene = Scene::new();
        let mut gizmo = NullGizmo;
        let a = shape(&mut scene, "a");
        let mut sel = SelectionController::new(0.5);

        assert!(sel.select_object(a, &mut scene, &mut gizmo));
        assert_eq!(sel.selected(), &[a]);
        assert_eq!(emissive_intensity(&scene, a), 0.5);

        assert!(!sel.select_object(a, &mut scene, &mut gizmo));
        assert!(sel.selected().is_empty());
        assert_eq!(emissive_intensity(&scene, a), 0.0);
    }

    #[test]
    fn groups_and_shapes_never_mix() {
        let mut scene = Scene::new();
        let mut gizmo = NullGizmo;
        let a = shape(&mut scene, "a");
        let b = shape(&mut scene, "b");
        let g = scene.insert(SceneObject::group("g"));
        scene.reparent_into_group(b, g);

        let mut sel = SelectionController::new(0.5);
        sel.select_object(a, &mut scene, &mut gizmo);
        sel.select_object(g, &mut scene, &mut gizmo);

        assert_eq!(sel.selected(), &[g]);
        assert_eq!(emissive_intensity(&scene, a), 0.0, "shape unhighlighted");
        assert_eq!(emissive_intensity(&scene, b), 0.5, "group child highlighted");
    }

    #[test]
    fn face_selection_is_exclusive_with_objects() {
        let mut scene = Scene::new();
        let mut store = MeshStore::new();
        let mut gizmo = NullGizmo;
        let a = shape(&mut scene, "a");
        store.insert(a, cube().build_mesh());

        let mut sel = SelectionController::new(0.5);
        sel.select_object(a, &mut scene, &mut gizmo);
        sel.select_face(a, 0, &mut scene, &store, &mut gizmo);

        assert!(sel.selected().is_empty());
        assert_eq!(sel.selected_face(), Some((a, 0)));
        assert_eq!(emissive_intensity(&scene, a), 0.0);

        sel.select_object(a, &mut scene, &mut gizmo);
        assert!(sel.selected_face().is_none());
    }

    #[test]
    fn out_of_range_face_is_ignored() {
        let mut scene = Scene::new();
        let mut store = MeshStore::new();
        let mut gizmo = NullGizmo;
        let a = shape(&mut scene, "a");
        store.insert(a, MeshData::new(vec![0.0; 9], vec![0, 1, 2]));

        let mut sel = SelectionController::new(0.5);
        sel.select_face(a, 5, &mut scene, &store, &mut gizmo);
        assert!(sel.selected_face().is_none());
    }

    #[test]
    fn clear_face_for_only_hits_owner() {
        let mut scene = Scene::new();
        let mut store = MeshStore::new();
        let mut gizmo = NullGizmo;
        let a = shape(&mut scene, "a");
        let b = shape(&mut scene, "b");
        store.insert(a, cube().build_mesh());
        store.insert(b, cube().build_mesh());

        let mut sel = SelectionController::new(0.5);
        sel.select_face(a, 2, &mut scene, &store, &mut gizmo);
        sel.clear_face_for(b);
        assert_eq!(sel.selected_face(), Some((a, 2)));
        sel.clear_face_for(a);
        assert!(sel.selected_face().is_none());
    }
}
