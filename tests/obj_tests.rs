use std::path::PathBuf;

use glam::Vec3;
use meshview::loaders::{load_basic_obj, load_meshes, parse_basic_obj};
use meshview::{Mesh, ShadingType, Transformable};

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("meshview_{}_{}", std::process::id(), name))
}

#[cfg(test)]
mod obj_tests {
    use super::*;

    #[test]
    fn test_save_then_load_keeps_geometry() {
        let path = temp_path("cube.obj");
        let mut mesh = Mesh::cube();
        mesh.translate(Vec3::new(1.0, 0.0, 0.0));
        mesh.save_basic_obj(&path).unwrap();

        let loaded = load_basic_obj(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded.n_verts(), mesh.n_verts());
        assert_eq!(loaded.faces(), mesh.faces());
        // The transform is baked into the saved positions
        assert_eq!(loaded.verts_pos()[0], mesh.verts_pos()[0] + Vec3::X);
    }

    #[test]
    fn test_vertex_colours_survive_save() {
        let path = temp_path("colored.obj");
        let mesh = Mesh::with_color(&[Vec3::ZERO, Vec3::X, Vec3::Y], &[], Vec3::new(1.0, 0.0, 0.0), &[])
            .unwrap();
        mesh.save_basic_obj(&path).unwrap();

        let mut loaded = Mesh::new(3, 0).unwrap();
        loaded.load_basic_obj(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded.shading_type, ShadingType::Vertex);
        assert_eq!(loaded.verts_rgb()[2], Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_comments_and_blank_lines_ignored() {
        let text = "# header\n\nv 0 0 0\nv 1 0 0\n  \nv 0 1 0\nvn 0 0 1\nf 1 2 3\n";
        let mesh = parse_basic_obj(text).unwrap();
        assert_eq!(mesh.n_verts(), 3);
        assert_eq!(mesh.n_faces(), 1);
    }

    #[test]
    fn test_missing_file_is_error() {
        assert!(load_basic_obj(temp_path("does_not_exist.obj")).is_err());
    }

    #[test]
    fn test_unknown_extension_rejected() {
        let err = load_meshes("model.stl").unwrap_err();
        assert!(err.to_string().contains("Unsupported model format"));
    }
}
