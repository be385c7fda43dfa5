pub mod face;

pub use face::{delete_face, extrude_face, FaceEditError};
