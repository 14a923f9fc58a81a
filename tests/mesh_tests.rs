use glam::{Mat3, Vec3};
use meshview::{Mesh, ShadingType, Transformable};

#[cfg(test)]
mod mesh_tests {
    use super::*;

    #[test]
    fn test_sphere_estimated_normals_point_outward() {
        let mut sphere = Mesh::sphere(12, 16);
        sphere.update();
        for (p, n) in sphere.verts_pos().iter().zip(sphere.verts_norm()) {
            assert!((p.length() - 1.0).abs() < 1e-4);
            assert!(n.dot(*p) > 0.0);
        }
    }

    #[test]
    fn test_cube_spans_unit_box() {
        let cube = Mesh::cube();
        let max = cube.verts_pos().iter().fold(Vec3::NEG_INFINITY, |m, p| m.max(*p));
        let min = cube.verts_pos().iter().fold(Vec3::INFINITY, |m, p| m.min(*p));
        assert_eq!(max, Vec3::splat(0.5));
        assert_eq!(min, Vec3::splat(-0.5));
        assert_eq!(cube.n_faces(), 12);
        assert_eq!(cube.shading_type, ShadingType::Texture);
    }

    #[test]
    fn test_soup_from_vertices() {
        let positions = [Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::Z, Vec3::X, Vec3::Y];
        let mesh = Mesh::from_vertices(&positions, &[], &[], &[]).unwrap();
        assert_eq!(mesh.faces(), &[[0, 1, 2], [3, 4, 5]]);
        assert!(mesh.auto_normals());
    }

    #[test]
    fn test_vertex_data_uses_colours_for_vertex_shading() {
        let mut mesh = Mesh::with_color(
            &[Vec3::ZERO, Vec3::X, Vec3::Y],
            &[[0, 1, 2]],
            Vec3::new(0.2, 0.4, 0.6),
            &[],
        )
        .unwrap();
        mesh.update();

        let (vertices, indices) = mesh.vertex_data().unwrap();
        assert_eq!(indices, vec![0, 1, 2]);
        assert_eq!(vertices[1].color, [0.2, 0.4, 0.6]);
        assert_eq!(vertices[0].normal, [0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_transform_does_not_touch_vertices() {
        let mut mesh = Mesh::triangle(Vec3::ZERO, Vec3::X, Vec3::Y);
        mesh.rotate(Mat3::from_rotation_z(1.0)).translate(Vec3::ONE);
        assert_eq!(mesh.verts_pos()[1], Vec3::X);
        assert_ne!(mesh.transform.transform_point3(Vec3::X), Vec3::X);
    }

    #[test]
    fn test_editing_faces_after_update() {
        let mut mesh = Mesh::new(6, 0).unwrap();
        mesh.faces_mut()[1] = [0, 0, 7];
        assert!(mesh.vertex_data().is_err());
        mesh.faces_mut()[1] = [3, 4, 5];
        assert!(mesh.vertex_data().is_ok());
    }
}
