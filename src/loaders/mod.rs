pub mod gltf;
pub mod obj;

use anyhow::{bail, Result};
use std::path::Path;

use crate::mesh::Mesh;

pub use self::gltf::load_gltf_meshes;
pub use obj::{load_basic_obj, parse_basic_obj, save_basic_obj};

/// Load a model file by extension: `.obj`, `.gltf` or `.glb`
pub fn load_meshes(path: impl AsRef<Path>) -> Result<Vec<Mesh>> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "obj" => Ok(vec![load_basic_obj(path)?]),
        "gltf" | "glb" => load_gltf_meshes(path),
        _ => bail!("Unsupported model format: {:?}", path),
    }
}
