use glam::Vec3;

use crate::error::{Error, Result};

/// Faces `[0 1 2], [3 4 5], ...` for a triangle soup of `n_verts` vertices
pub fn sequential_faces(n_verts: usize) -> Vec<[u32; 3]> {
    (0..n_verts / 3)
        .map(|i| {
            let base = (i * 3) as u32;
            [base, base + 1, base + 2]
        })
        .collect()
}

/// Per-vertex normals as the average of adjacent face normals.
///
/// With no faces, consecutive vertex triples are treated as triangles.
/// Vertices that belong to no face get a zero normal.
pub fn estimate_normals(positions: &[Vec3], faces: &[[u32; 3]]) -> Vec<Vec3> {
    if faces.is_empty() {
        let soup = sequential_faces(positions.len());
        if soup.is_empty() {
            return vec![Vec3::ZERO; positions.len()];
        }
        return estimate_normals(positions, &soup);
    }

    let mut normals = vec![Vec3::ZERO; positions.len()];
    let mut face_count = vec![0u32; positions.len()];

    for face in faces {
        let [a, b, c] = face.map(|i| positions[i as usize]);
        let normal = (b - a).cross(c - b).normalize_or_zero();
        for &i in face {
            normals[i as usize] += normal;
            face_count[i as usize] += 1;
        }
    }

    for (normal, &count) in normals.iter_mut().zip(&face_count) {
        if count > 0 {
            *normal /= count as f32;
        }
    }
    normals
}

/// Map each texture-coordinate index to the vertex at the same triangle corner
pub fn tex_to_vert_map(
    n_tex_coords: usize,
    faces: &[[u32; 3]],
    tex_faces: &[[u32; 3]],
) -> Result<Vec<u32>> {
    if faces.len() != tex_faces.len() {
        return Err(Error::LengthMismatch {
            what: "texture faces",
            expected: faces.len(),
            actual: tex_faces.len(),
        });
    }

    let mut map = vec![u32::MAX; n_tex_coords];
    for (face_idx, (face, tex_face)) in faces.iter().zip(tex_faces).enumerate() {
        for (&vert, &tex) in face.iter().zip(tex_face) {
            let slot = map.get_mut(tex as usize).ok_or(Error::FaceIndexOutOfRange {
                face: face_idx,
                index: tex,
                n_verts: n_tex_coords,
            })?;
            *slot = vert;
        }
    }

    if let Some(unmatched) = map.iter().position(|&v| v == u32::MAX) {
        return Err(Error::UnmatchedTexCoord(unmatched));
    }
    Ok(map)
}

/// Check every face index against the vertex count
pub fn validate_faces(faces: &[[u32; 3]], n_verts: usize) -> Result<()> {
    for (face_idx, face) in faces.iter().enumerate() {
        if let Some(&index) = face.iter().find(|&&i| i as usize >= n_verts) {
            return Err(Error::FaceIndexOutOfRange {
                face: face_idx,
                index,
                n_verts,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_faces() {
        assert_eq!(sequential_faces(6), vec![[0, 1, 2], [3, 4, 5]]);
        assert!(sequential_faces(0).is_empty());
    }

    #[test]
    fn test_normals_of_flat_triangle_point_up_z() {
        let positions = [Vec3::ZERO, Vec3::X, Vec3::Y];
        let normals = estimate_normals(&positions, &[[0, 1, 2]]);
        for n in normals {
            assert!((n - Vec3::Z).length() < 1e-6);
        }
    }

    #[test]
    fn test_normals_are_averaged_over_faces() {
        // Two triangles folded at a right angle along the x axis
        let positions = [Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::Z];
        let faces = [[0, 1, 2], [0, 3, 1]];
        let normals = estimate_normals(&positions, &faces);
        let shared = normals[0];
        assert!((shared - Vec3::new(0.0, 0.5, 0.5)).length() < 1e-6);
        assert!((normals[2] - Vec3::Z).length() < 1e-6);
        assert!((normals[3] - Vec3::Y).length() < 1e-6);
    }

    #[test]
    fn test_unused_vertex_gets_zero_normal() {
        let positions = [Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::ONE];
        let normals = estimate_normals(&positions, &[[0, 1, 2]]);
        assert_eq!(normals[3], Vec3::ZERO);
    }

    #[test]
    fn test_tex_map_follows_corners() {
        let faces = [[0, 1, 2], [2, 1, 3]];
        let tex_faces = [[0, 1, 2], [3, 4, 5]];
        let map = tex_to_vert_map(6, &faces, &tex_faces).unwrap();
        assert_eq!(map, vec![0, 1, 2, 2, 1, 3]);
    }

    #[test]
    fn test_tex_map_rejects_unmatched_coord() {
        let err = tex_to_vert_map(4, &[[0, 1, 2]], &[[0, 1, 2]]).unwrap_err();
        assert_eq!(err, Error::UnmatchedTexCoord(3));
    }

    #[test]
    fn test_tex_map_rejects_face_count_mismatch() {
        let err = tex_to_vert_map(3, &[[0, 1, 2]], &[]).unwrap_err();
        assert!(matches!(err, Error::LengthMismatch { .. }));
    }

    #[test]
    fn test_validate_faces() {
        assert!(validate_faces(&[[0, 1, 2]], 3).is_ok());
        assert_eq!(
            validate_faces(&[[0, 1, 2], [1, 2, 7]], 3),
            Err(Error::FaceIndexOutOfRange { face: 1, index: 7, n_verts: 3 })
        );
    }
}
