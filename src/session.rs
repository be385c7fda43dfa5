//! The editing session: one facade owning the scene, mesh store, spatial
//! index, selection, and history, exposing the operations a host application
//! drives. Every state-changing operation ends in a history commit so undo
//! granularity matches user actions.

use glam::{Vec3, Vec4};
use thiserror::Error;

use crate::history::{GestureBuffer, History, SceneSnapshot};
use crate::host::{NullGizmo, NullRenderHost, RenderHost, TransformGizmo};
use crate::scene::{
    Material, MeshStore, ObjectId, ObjectKind, Scene, SceneObject, ShapeKind, StoreError,
    Transform,
};
use crate::selection::SelectionController;
use crate::settings::Settings;
use crate::spatial::{Ray, RayHit, SpatialIndexManager};
use crate::tools::{self, FaceEditError};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    FaceEdit(#[from] FaceEditError),
    #[error("nothing selected")]
    NothingSelected,
    #[error("grouping needs at least 2 objects, got {0}")]
    GroupTooSmall(usize),
}

pub struct EditorSession {
    scene: Scene,
    store: MeshStore,
    spatial: SpatialIndexManager,
    selection: SelectionController,
    history: History,
    gesture: GestureBuffer,
    settings: Settings,
    render: Box<dyn RenderHost>,
    gizmo: Box<dyn TransformGizmo>,
}

impl EditorSession {
    pub fn new(
        settings: Settings,
        render: Box<dyn RenderHost>,
        gizmo: Box<dyn TransformGizmo>,
    ) -> Self {
        let mut session = Self {
            scene: Scene::new(),
            store: MeshStore::new(),
            spatial: SpatialIndexManager::new(settings.edit.bvh_leaf_size),
            selection: SelectionController::new(settings.display.highlight_intensity),
            history: History::new(settings.display.undo_limit),
            gesture: GestureBuffer::new(),
            settings,
            render,
            gizmo,
        };
        // The empty scene is the first history entry, so the very first edit
        // can be undone.
        session.commit();
        session
    }

    /// Session with no host attached. Used headless and in tests.
    pub fn headless() -> Self {
        Self::new(Settings::default(), Box::new(NullRenderHost), Box::new(NullGizmo))
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn store(&self) -> &MeshStore {
        &self.store
    }

    pub fn selection(&self) -> &SelectionController {
        &self.selection
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    // ----- object lifecycle -------------------------------------------------

    /// Add a shape at the origin with the default material.
    pub fn add_shape(&mut self, shape: ShapeKind) -> ObjectId {
        let material = Material::new(Vec4::from_array(self.settings.display.default_shape_color));
        let id = self.scene.insert(SceneObject::shape(shape.label(), shape, material));
        self.store.insert(id, shape.build_mesh());
        self.render.add_to_scene(id);
        log::info!("added {} as {id:?}", shape.label());
        self.commit();
        id
    }

    /// Copy every selected object, offset along +X so the copies are visible
    /// next to their sources. Copies are not selected.
    pub fn duplicate_selected(&mut self) -> Result<Vec<ObjectId>, SessionError> {
        let sources: Vec<ObjectId> = self.selection.selected().to_vec();
        if sources.is_empty() {
            return Err(SessionError::NothingSelected);
        }

        let offset = Vec3::new(self.settings.edit.duplicate_offset, 0.0, 0.0);
        let mut copies = Vec::with_capacity(sources.len());
        for source in sources {
            if let Some(copy) = self.duplicate_subtree(source) {
                if let Some(object) = self.scene.get_mut(copy) {
                    object.transform.translation += offset;
                }
                copies.push(copy);
            }
        }
        self.commit();
        Ok(copies)
    }

    fn duplicate_subtree(&mut self, source: ObjectId) -> Option<ObjectId> {
        let original = self.scene.get(source)?.clone();
        match original.kind {
            ObjectKind::Shape { shape, mut material } => {
                // The source may be highlighted; the copy starts clean.
                material.emissive = Vec3::ZERO;
                material.emissive_intensity = 0.0;
                let mut copy = SceneObject::shape(original.name, shape, material);
                copy.transform = original.transform;
                copy.visible = original.visible;
                let id = self.scene.insert(copy);
                if let Ok(mesh) = self.store.clone_mesh(source) {
                    self.store.insert(id, mesh);
                }
                self.render.add_to_scene(id);
                Some(id)
            }
            ObjectKind::Group { children } => {
                let mut copy = SceneObject::group(original.name);
                copy.transform = original.transform;
                copy.visible = original.visible;
                let group = self.scene.insert(copy);
                for child in children {
                    if let Some(child_copy) = self.duplicate_subtree(child) {
                        self.scene.reparent_into_group(child_copy, group);
                    }
                }
                Some(group)
            }
        }
    }

    /// Gather the selected shapes under a new group. The group takes over as
    /// the selectable unit; the selection itself is cleared.
    pub fn create_group(&mut self) -> Result<ObjectId, SessionError> {
        let members: Vec<ObjectId> = self.selection.selected().to_vec();
        if members.len() < 2 {
            return Err(SessionError::GroupTooSmall(members.len()));
        }
        self.selection.clear(&mut self.scene, self.gizmo.as_mut());

        let group = self.scene.insert(SceneObject::group("Group"));
        for member in members {
            self.scene.reparent_into_group(member, group);
        }
        log::info!("grouped into {group:?}");
        self.commit();
        Ok(group)
    }

    /// Delete whatever is selected: the selected face if in face selection,
    /// otherwise every selected object (groups take their children along).
    pub fn delete_selection(&mut self) -> Result<(), SessionError> {
        if let Some((id, face)) = self.selection.selected_face() {
            let mesh = tools::delete_face(self.store.get(id)?, face)?;
            self.install_mesh(id, mesh)?;
            self.commit();
            return Ok(());
        }

        let doomed: Vec<ObjectId> = self.selection.selected().to_vec();
        if doomed.is_empty() {
            return Err(SessionError::NothingSelected);
        }
        self.selection.clear(&mut self.scene, self.gizmo.as_mut());
        for id in doomed {
            self.remove_subtree(id);
        }
        self.commit();
        Ok(())
    }

    fn remove_subtree(&mut self, id: ObjectId) {
        if let Some(ObjectKind::Group { children }) = self.scene.get(id).map(|o| o.kind.clone()) {
            for child in children {
                self.remove_subtree(child);
            }
        }
        if self.scene.remove(id).is_some() {
            self.store.remove(id);
            self.spatial.invalidate(id);
            self.selection.forget(id);
            self.render.remove_from_scene(id);
        }
    }

    /// Recolor every selected shape (descendants included for groups). The
    /// highlight rides on the emissive channel, so the base color changes
    /// underneath it.
    pub fn set_selection_color(&mut self, color: Vec4) -> Result<(), SessionError> {
        let selected: Vec<ObjectId> = self.selection.selected().to_vec();
        if selected.is_empty() {
            return Err(SessionError::NothingSelected);
        }
        for id in selected {
            self.set_color_recursive(id, color);
        }
        self.commit();
        Ok(())
    }

    fn set_color_recursive(&mut self, id: ObjectId, color: Vec4) {
        if let Some(ObjectKind::Group { children }) = self.scene.get(id).map(|o| o.kind.clone()) {
            for child in children {
                self.set_color_recursive(child, color);
            }
            return;
        }
        if let Some(material) = self.scene.get_mut(id).and_then(|o| o.material_mut()) {
            material.color = color;
        }
    }

    /// Show or hide an object. Hidden objects (and everything under them)
    /// are skipped by picking and by the visible-shape listing.
    pub fn set_visible(&mut self, id: ObjectId, visible: bool) {
        if let Some(object) = self.scene.get_mut(id) {
            object.visible = visible;
            self.render.request_redraw();
            self.commit();
        }
    }

    // ----- picking and selection --------------------------------------------

    /// Raycast into the scene and toggle selection of the nearest hit.
    /// Grouped shapes resolve to their outermost group. A miss clears the
    /// selection. Returns the object whose selection toggled.
    pub fn pick_object(&mut self, ray: &Ray) -> Option<ObjectId> {
        self.spatial.absorb_dirty(&mut self.store);
        let hit = self.spatial.query(ray, &self.scene, &self.store).into_iter().next();
        match hit {
            Some(RayHit { object, .. }) => {
                let target = self.outermost_group(object);
                self.selection.select_object(target, &mut self.scene, self.gizmo.as_mut());
                Some(target)
            }
            None => {
                self.selection.clear(&mut self.scene, self.gizmo.as_mut());
                None
            }
        }
    }

    /// Raycast and select the nearest hit triangle for face editing.
    pub fn pick_face(&mut self, ray: &Ray) -> Option<(ObjectId, usize)> {
        self.spatial.absorb_dirty(&mut self.store);
        let hit = self.spatial.query(ray, &self.scene, &self.store).into_iter().next()?;
        self.selection.select_face(
            hit.object,
            hit.face_index,
            &mut self.scene,
            &self.store,
            self.gizmo.as_mut(),
        );
        self.selection.selected_face()
    }

    fn outermost_group(&self, id: ObjectId) -> ObjectId {
        let mut current = id;
        while let Some(parent) = self.scene.get(current).and_then(|o| o.parent) {
            current = parent;
        }
        current
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear(&mut self.scene, self.gizmo.as_mut());
    }

    // ----- export -----------------------------------------------------------

    /// What an exporter should serialize: the current selection when one
    /// exists, otherwise every visible top-level object. Children of a
    /// visible group are covered by their group and not listed separately.
    pub fn visible_or_selected_objects(&self) -> Vec<ObjectId> {
        if !self.selection.selected().is_empty() {
            return self.selection.selected().to_vec();
        }
        if let Some((id, _)) = self.selection.selected_face() {
            return vec![id];
        }
        self.scene
            .roots()
            .iter()
            .copied()
            .filter(|&id| self.scene.get(id).is_some_and(|o| o.visible))
            .collect()
    }

    // ----- face editing -----------------------------------------------------

    /// Extrude the selected face along its normal. Pass None for the
    /// configured default distance.
    pub fn extrude_selected_face(&mut self, distance: Option<f32>) -> Result<(), SessionError> {
        let (id, face) = self.selection.selected_face().ok_or(SessionError::NothingSelected)?;
        let distance = distance.unwrap_or(self.settings.edit.extrude_distance);
        let mesh = tools::extrude_face(self.store.get(id)?, face, distance)?;
        self.install_mesh(id, mesh)?;
        self.commit();
        Ok(())
    }

    /// Swap in an edited mesh. The replace marks the spatial index stale and
    /// the face selection is dropped because its index may now point at a
    /// different triangle.
    fn install_mesh(&mut self, id: ObjectId, mesh: crate::scene::MeshData) -> Result<(), SessionError> {
        self.store.replace(id, mesh)?;
        self.spatial.absorb_dirty(&mut self.store);
        self.selection.clear_face_for(id);
        Ok(())
    }

    // ----- transform gestures -----------------------------------------------

    /// Called when a gizmo drag starts: back up the selection's transforms so
    /// the drag can be reverted.
    pub fn begin_gesture(&mut self) {
        self.gesture.save(self.selection.selected(), &self.scene);
    }

    /// Called when a gizmo drag ends. Commits the moved state.
    pub fn end_gesture(&mut self) {
        self.commit();
    }

    /// Revert the last transform gesture without touching the history cursor.
    /// Consumed on use; returns false when there is nothing to revert.
    pub fn undo_gesture(&mut self) -> bool {
        let Some(saved) = self.gesture.take() else { return false };
        for (id, transform) in saved {
            if let Some(object) = self.scene.get_mut(id) {
                object.transform = transform;
            }
        }
        self.render.request_redraw();
        true
    }

    /// Set an object's transform directly (gizmo drag updates).
    pub fn set_transform(&mut self, id: ObjectId, transform: Transform) {
        if let Some(object) = self.scene.get_mut(id) {
            object.transform = transform;
            self.render.request_redraw();
        }
    }

    // ----- history ----------------------------------------------------------

    /// Capture the current state as the newest history entry. Snapshots are
    /// taken with highlights stripped so a later restore never resurrects a
    /// selection glow.
    fn commit(&mut self) {
        self.with_highlights_stripped(|session| {
            let snapshot = SceneSnapshot::capture(&session.scene, &session.store);
            session.history.commit(snapshot);
        });
        self.gesture.clear();
    }

    fn with_highlights_stripped(&mut self, f: impl FnOnce(&mut Self)) {
        let selected: Vec<ObjectId> = self.selection.selected().to_vec();
        for &id in &selected {
            crate::selection::set_highlight(&mut self.scene, id, Vec3::ZERO, 0.0);
        }
        f(self);
        let intensity = self.settings.display.highlight_intensity;
        for &id in &selected {
            crate::selection::set_highlight(
                &mut self.scene,
                id,
                crate::selection::HIGHLIGHT_COLOR,
                intensity,
            );
        }
    }

    pub fn undo(&mut self) -> bool {
        self.step_history(true)
    }

    pub fn redo(&mut self) -> bool {
        self.step_history(false)
    }

    fn step_history(&mut self, back: bool) -> bool {
        let old_ids: Vec<ObjectId> = self
            .scene
            .object_ids()
            .filter(|&id| self.scene.get(id).is_some_and(|o| !o.is_group()))
            .collect();
        let snapshot = if back { self.history.undo() } else { self.history.redo() };
        let Some(snapshot) = snapshot else { return false };
        let snapshot = snapshot.clone();

        snapshot.restore(&mut self.scene, &mut self.store);

        for id in old_ids {
            self.render.remove_from_scene(id);
        }
        let restored: Vec<ObjectId> = self
            .scene
            .object_ids()
            .filter(|&id| self.scene.get(id).is_some_and(|o| !o.is_group()))
            .collect();
        for id in restored {
            self.render.add_to_scene(id);
        }

        // Restored buffers invalidate everything downstream of the store.
        self.spatial.clear();
        self.spatial.absorb_dirty(&mut self.store);
        self.selection.reset();
        self.gizmo.detach();
        self.gesture.clear();
        self.render.request_redraw();
        log::debug!("history {} -> {} objects", if back { "undo" } else { "redo" }, self.scene.len());
        true
    }
}
