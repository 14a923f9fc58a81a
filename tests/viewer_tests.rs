use glam::Vec3;
use meshview::{PointCloud, ShadingType, TextureType, Viewer, ViewerConfig};

#[cfg(test)]
mod viewer_tests {
    use super::*;

    #[test]
    fn test_add_sphere_and_cube_scene() {
        let mut viewer = Viewer::new();
        viewer.draw_axes = false;

        let sphere = viewer.add_sphere(Vec3::ZERO, 0.5);
        sphere.shading_type = ShadingType::Vertex;
        sphere.set_verts_rgb(Vec3::new(1.0, 0.0, 0.0));
        viewer.add_cube(Vec3::new(2.0, 0.0, 0.0), 0.25);

        assert_eq!(viewer.n_meshes(), 2);
        let sphere = viewer.get_mesh(0).unwrap();
        assert_eq!(sphere.n_verts(), 900);
        assert!(sphere.verts_pos().iter().all(|p| (p.length() - 0.5).abs() < 1e-4));
        assert!(sphere.verts_rgb().iter().all(|c| *c == Vec3::X));

        let cube = viewer.get_mesh(1).unwrap();
        for p in cube.verts_pos() {
            let local = *p - Vec3::new(2.0, 0.0, 0.0);
            assert!(local.abs().max_element() <= 0.125 + 1e-6);
        }
        assert_eq!(cube.shading_type, ShadingType::Texture);
        assert_eq!(cube.textures(TextureType::Diffuse).len(), 1);
    }

    #[test]
    fn test_remove_and_clear() {
        let mut viewer = Viewer::new();
        viewer.add_square(Vec3::ZERO, 1.0);
        viewer.add_cube(Vec3::ZERO, 1.0);
        viewer.add_line(Vec3::ZERO, Vec3::X);
        viewer.add_point_cloud(PointCloud::new(10));

        assert!(viewer.remove_mesh(5).is_none());
        let removed = viewer.remove_mesh(0).unwrap();
        assert_eq!(removed.n_verts(), 4);
        assert_eq!(viewer.n_meshes(), 1);

        assert!(viewer.get_point_cloud(0).unwrap().lines);
        viewer.clear_point_clouds();
        viewer.clear_meshes();
        assert_eq!(viewer.n_point_clouds(), 0);
        assert_eq!(viewer.n_meshes(), 0);
    }

    #[test]
    fn test_apply_config() {
        let config = ViewerConfig::from_json(
            r#"{
                "title": "scan",
                "width": 640,
                "height": 480,
                "background": [0.0, 0.0, 0.0],
                "wireframe": true,
                "lights": { "ambient": [0.5, 0.5, 0.5] },
                "camera": { "center": [1.0, 2.0, 3.0], "distance": 10.0, "ortho": true }
            }"#,
        )
        .unwrap();

        let mut viewer = Viewer::new();
        viewer.apply_config(&config);

        assert_eq!(viewer.title, "scan");
        assert_eq!((viewer.width(), viewer.height()), (640, 480));
        assert_eq!(viewer.background, Vec3::ZERO);
        assert!(viewer.wireframe);
        assert!(viewer.draw_axes);
        assert_eq!(viewer.light_color_ambient, Vec3::splat(0.5));
        assert_eq!(viewer.camera.center_of_rot, Vec3::new(1.0, 2.0, 3.0));
        assert!(viewer.camera.ortho);

        // The configured camera becomes the reset target
        viewer.camera.dist_to_center = 1.0;
        viewer.camera.reset_view();
        assert_eq!(viewer.camera.dist_to_center, 10.0);
    }

    #[test]
    fn test_new_geometry_needs_upload() {
        let mut viewer = Viewer::new();
        assert!(viewer.add_sphere(Vec3::ZERO, 1.0).needs_upload());
        assert!(viewer.add_line(Vec3::ZERO, Vec3::Y).needs_upload());
    }
}
