//! Asset loading: OBJ meshes into CPU-friendly mesh data with typed errors.

pub mod error;
pub mod mesh;
pub mod obj;

pub use error::{AssetError, Result};
pub use mesh::{Bounds, MeshData, MeshVertex};
pub use obj::{load_obj_from_path, load_obj_from_reader, load_obj_from_str};
