//! Headless core of a 3D shape editor: an editable scene of parametric
//! shapes and groups, per-face mesh editing, ray picking through a BVH, and
//! whole-scene snapshot undo. Rendering and input stay on the host side of
//! the [`host`] traits.

pub mod history;
pub mod host;
pub mod scene;
pub mod selection;
pub mod session;
pub mod settings;
pub mod spatial;
pub mod tools;

pub use history::{GestureBuffer, History, SceneSnapshot};
pub use host::{NullGizmo, NullRenderHost, RenderHost, TransformGizmo};
pub use scene::{
    Material, MeshData, MeshError, MeshStore, ObjectId, ObjectKind, Scene, SceneObject,
    ShapeKind, StoreError, Transform,
};
pub use selection::SelectionController;
pub use session::{EditorSession, SessionError};
pub use settings::Settings;
pub use spatial::{Bvh, Ray, RayHit, SpatialIndexManager};
pub use tools::{delete_face, extrude_face, FaceEditError};
