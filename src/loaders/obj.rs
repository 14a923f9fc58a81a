//! Basic OBJ reader/writer: `v` and `f` records only.
//!
//! `v` rows hold a position, optionally followed by an RGB colour; all rows in
//! a file must agree. `f` rows use the first index of each `a/b/c` group.

use anyhow::{bail, ensure, Context, Result};
use glam::Vec3;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::geometry::{sequential_faces, validate_faces};
use crate::mesh::{Mesh, MeshParts, ShadingType};

pub fn load_basic_obj(path: impl AsRef<Path>) -> Result<Mesh> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).context(format!("Failed to read OBJ file: {:?}", path))?;
    let mesh = parse_basic_obj(&text).context(format!("Failed to parse OBJ file: {:?}", path))?;
    log::info!(
        "Loaded {:?}: {} vertices, {} faces",
        path,
        mesh.n_verts(),
        mesh.n_faces()
    );
    Ok(mesh)
}

/// Parse OBJ text. Polygons with more than three corners are fan-triangulated.
pub fn parse_basic_obj(text: &str) -> Result<Mesh> {
    let mut positions = Vec::new();
    let mut colors = Vec::new();
    let mut faces = Vec::new();
    let mut attrs_per_vert = None;

    for (line_no, line) in text.lines().enumerate() {
        let line_no = line_no + 1;
        let mut tokens = line.split_whitespace();
        match tokens.next() {
            Some("v") => {
                let values = tokens
                    .map(|t| t.parse::<f32>())
                    .collect::<std::result::Result<Vec<_>, _>>()
                    .with_context(|| format!("line {}: invalid vertex", line_no))?;
                match attrs_per_vert {
                    None if values.len() == 3 || values.len() == 6 => {
                        attrs_per_vert = Some(values.len())
                    }
                    None => bail!("line {}: expected 3 or 6 numbers per vertex, got {}", line_no, values.len()),
                    Some(n) => ensure!(
                        n == values.len(),
                        "line {}: vertex has {} numbers, earlier vertices have {}",
                        line_no,
                        values.len(),
                        n
                    ),
                }
                positions.push(Vec3::new(values[0], values[1], values[2]));
                if values.len() == 6 {
                    colors.push(Vec3::new(values[3], values[4], values[5]));
                }
            }
            Some("f") => {
                let corners = tokens
                    .map(|t| parse_face_index(t, line_no))
                    .collect::<Result<Vec<u32>>>()?;
                ensure!(corners.len() >= 3, "line {}: face needs at least 3 corners", line_no);
                for i in 1..corners.len() - 1 {
                    faces.push([corners[0], corners[i], corners[i + 1]]);
                }
            }
            _ => {}
        }
    }

    let n_verts = positions.len();
    if faces.is_empty() {
        ensure!(
            n_verts % 3 == 0,
            "no faces and {} vertices is not a triangle soup",
            n_verts
        );
        faces = sequential_faces(n_verts);
    }
    validate_faces(&faces, n_verts)?;

    let shading_type = if colors.is_empty() {
        colors = vec![Vec3::ZERO; n_verts];
        ShadingType::Texture
    } else {
        ShadingType::Vertex
    };

    Ok(Mesh::from(MeshParts {
        positions,
        colors,
        normals: vec![Vec3::ZERO; n_verts],
        faces,
        shading_type,
    }))
}

fn parse_face_index(token: &str, line_no: usize) -> Result<u32> {
    let first = token.split('/').next().unwrap_or(token);
    let index: u32 = first
        .parse()
        .with_context(|| format!("line {}: invalid face index {:?}", line_no, token))?;
    ensure!(index > 0, "line {}: face indices start at 1", line_no);
    Ok(index - 1)
}

/// Write transformed positions, colours when vertex-shaded, and 1-based faces
pub fn save_basic_obj(mesh: &Mesh, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let file = fs::File::create(path).context(format!("Failed to create OBJ file: {:?}", path))?;
    let mut out = BufWriter::new(file);
    write_basic_obj(mesh, &mut out).context(format!("Failed to write OBJ file: {:?}", path))?;
    log::info!("Saved {:?}: {} vertices, {} faces", path, mesh.n_verts(), mesh.n_faces());
    Ok(())
}

pub fn write_basic_obj(mesh: &Mesh, out: &mut impl Write) -> Result<()> {
    let with_rgb = mesh.shading_type == ShadingType::Vertex;
    for (p, c) in mesh.verts_pos().iter().zip(mesh.verts_rgb()) {
        let p = mesh.transform.transform_point3(*p);
        write!(out, "v {} {} {}", p.x, p.y, p.z)?;
        if with_rgb {
            write!(out, " {} {} {}", c.x, c.y, c.z)?;
        }
        writeln!(out)?;
    }
    for [a, b, c] in mesh.faces() {
        writeln!(out, "f {} {} {}", a + 1, b + 1, c + 1)?;
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_positions_only() {
        let mesh = parse_basic_obj("# tri\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();
        assert_eq!(mesh.n_verts(), 3);
        assert_eq!(mesh.faces(), &[[0, 1, 2]]);
        assert_eq!(mesh.shading_type, ShadingType::Texture);
    }

    #[test]
    fn test_parse_colors_and_slashes() {
        let text = "v 0 0 0 1 0 0\nv 1 0 0 0 1 0\nv 0 1 0 0 0 1\nf 1/1/1 2/2/2 3//3\n";
        let mesh = parse_basic_obj(text).unwrap();
        assert_eq!(mesh.shading_type, ShadingType::Vertex);
        assert_eq!(mesh.verts_rgb()[1], Vec3::Y);
        assert_eq!(mesh.faces(), &[[0, 1, 2]]);
    }

    #[test]
    fn test_quads_are_fanned() {
        let text = "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n";
        let mesh = parse_basic_obj(text).unwrap();
        assert_eq!(mesh.faces(), &[[0, 1, 2], [0, 2, 3]]);
    }

    #[test]
    fn test_no_faces_is_soup() {
        let mesh = parse_basic_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\n").unwrap();
        assert_eq!(mesh.faces(), &[[0, 1, 2]]);
        assert!(parse_basic_obj("v 0 0 0\nv 1 0 0\n").is_err());
    }

    #[test]
    fn test_inconsistent_vertices_rejected() {
        assert!(parse_basic_obj("v 0 0 0\nv 1 0 0 1 1 1\nv 0 1 0\n").is_err());
        assert!(parse_basic_obj("v 0 0\n").is_err());
    }

    #[test]
    fn test_bad_face_index_rejected() {
        assert!(parse_basic_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 4\n").is_err());
        assert!(parse_basic_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 0 1 2\n").is_err());
    }

    #[test]
    fn test_write_applies_transform() {
        use crate::transform::Transformable;

        let mut mesh = Mesh::from_vertices(&[Vec3::ZERO, Vec3::X, Vec3::Y], &[], &[Vec3::ONE; 3], &[]).unwrap();
        mesh.translate(Vec3::Z);
        let mut out = Vec::new();
        write_basic_obj(&mesh, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "v 0 0 1 1 1 1\nv 1 0 1 1 1 1\nv 0 1 1 1 1 1\nf 1 2 3\n");
    }
}
