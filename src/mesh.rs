use std::f32::consts::PI;
use std::fmt;
use std::path::Path;

use glam::{Mat4, Vec2, Vec3};

use crate::error::{Error, Result};
use crate::geometry::{estimate_normals, sequential_faces, tex_to_vert_map, validate_faces};
use crate::loaders::obj;
use crate::renderer::GpuMesh;
use crate::texture::{Texture, TextureType};
use crate::transform::Transformable;
use crate::types::MeshVertex;

/// How the colour slot of each vertex is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ShadingType {
    /// Interpolate per-vertex RGB colours
    #[default]
    Vertex,
    /// Sample textures; the colour slot holds UV coordinates
    Texture,
}

/// Triangle mesh with per-vertex colours/UVs, normals, faces and textures.
///
/// Edits to vertex data reach the GPU after [`Mesh::update`] (or when an
/// `on_loop`/`on_gui` callback returns `true`). Meshes added to a viewer are
/// uploaded on the next frame.
pub struct Mesh {
    positions: Vec<Vec3>,
    colors: Vec<Vec3>,
    normals: Vec<Vec3>,
    faces: Vec<[u32; 3]>,

    /// Disabled meshes are not drawn
    pub enabled: bool,
    /// Specular exponent
    pub shininess: f32,
    /// Model transform
    pub transform: Mat4,
    pub shading_type: ShadingType,

    textures: [Vec<Texture>; 2],

    tex_coords: Vec<Vec2>,
    tex_faces: Vec<[u32; 3]>,
    tex_to_vert: Vec<u32>,

    auto_normals: bool,
    pub(crate) dirty: bool,
    /// Texture list changed since the material was last built
    pub(crate) material_dirty: bool,
    pub(crate) gpu: Option<GpuMesh>,
}

impl Mesh {
    /// Zero-filled mesh. With `num_triangles == 0` the faces are `0 1 2, 3 4 5, ...`
    /// and `num_verts` must be a multiple of 3.
    pub fn new(num_verts: usize, num_triangles: usize) -> Result<Self> {
        let faces = blank_faces(num_verts, num_triangles)?;
        Ok(Self::from_parts(num_verts, faces))
    }

    /// Mesh from positions plus optional faces, colours and normals.
    ///
    /// Empty `faces` means a triangle soup; empty `rgb` leaves colours at zero;
    /// empty `normals` turns on automatic normals.
    pub fn from_vertices(
        positions: &[Vec3],
        faces: &[[u32; 3]],
        rgb: &[Vec3],
        normals: &[Vec3],
    ) -> Result<Self> {
        let mut mesh = Self::new(positions.len(), faces.len())?;
        mesh.positions.copy_from_slice(positions);
        if !faces.is_empty() {
            validate_faces(faces, positions.len())?;
            mesh.faces.copy_from_slice(faces);
        }
        if !rgb.is_empty() {
            check_len("rgb", positions.len(), rgb.len())?;
            mesh.colors.copy_from_slice(rgb);
        }
        mesh.set_normals(normals)?;
        Ok(mesh)
    }

    /// Mesh whose vertices all share one colour
    pub fn with_color(
        positions: &[Vec3],
        faces: &[[u32; 3]],
        color: Vec3,
        normals: &[Vec3],
    ) -> Result<Self> {
        if positions.is_empty() {
            return Err(Error::EmptyPositions);
        }
        let mut mesh = Self::from_vertices(positions, faces, &[], normals)?;
        mesh.set_verts_rgb(color);
        Ok(mesh)
    }

    /// Mesh read from a basic OBJ file (see [`crate::loaders::obj`])
    pub fn from_basic_obj(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        obj::load_basic_obj(path)
    }

    fn from_parts(num_verts: usize, faces: Vec<[u32; 3]>) -> Self {
        Self {
            positions: vec![Vec3::ZERO; num_verts],
            colors: vec![Vec3::ZERO; num_verts],
            normals: vec![Vec3::ZERO; num_verts],
            faces,
            enabled: true,
            shininess: 10.0,
            transform: Mat4::IDENTITY,
            shading_type: ShadingType::Vertex,
            textures: [Vec::new(), Vec::new()],
            tex_coords: Vec::new(),
            tex_faces: Vec::new(),
            tex_to_vert: Vec::new(),
            auto_normals: true,
            dirty: true,
            material_dirty: true,
            gpu: None,
        }
    }

    fn set_normals(&mut self, normals: &[Vec3]) -> Result<()> {
        self.auto_normals = normals.is_empty();
        if !self.auto_normals {
            check_len("normals", self.positions.len(), normals.len())?;
            self.normals.copy_from_slice(normals);
        }
        Ok(())
    }

    /// Replace all data with a zero-filled mesh of the given size and reset the transform
    pub fn resize(&mut self, num_verts: usize, num_triangles: usize) -> Result<()> {
        let faces = blank_faces(num_verts, num_triangles)?;
        self.positions = vec![Vec3::ZERO; num_verts];
        self.colors = vec![Vec3::ZERO; num_verts];
        self.normals = vec![Vec3::ZERO; num_verts];
        self.faces = faces;
        self.tex_coords.clear();
        self.tex_faces.clear();
        self.tex_to_vert.clear();
        self.transform = Mat4::IDENTITY;
        self.dirty = true;
        Ok(())
    }

    /// Use separate texture coordinates indexed by `tex_faces`.
    /// Switches shading to [`ShadingType::Texture`].
    pub fn set_tex_coords(&mut self, coords: &[Vec2], tex_faces: &[[u32; 3]]) -> Result<&mut Self> {
        // Each tex coord maps to exactly one vertex, so there are at least as many
        if self.n_verts() > coords.len() {
            return Err(Error::TooFewTexCoords {
                n_verts: self.n_verts(),
                n_coords: coords.len(),
            });
        }
        self.tex_to_vert = tex_to_vert_map(coords.len(), &self.faces, tex_faces)?;
        self.tex_coords = coords.to_vec();
        self.tex_faces = tex_faces.to_vec();
        self.shading_type = ShadingType::Texture;
        self.dirty = true;
        Ok(self)
    }

    /// Drop texture coordinates and switch back to vertex shading
    pub fn unset_tex_coords(&mut self) -> &mut Self {
        self.tex_coords.clear();
        self.tex_faces.clear();
        self.tex_to_vert.clear();
        self.shading_type = ShadingType::Vertex;
        self.dirty = true;
        self
    }

    pub fn has_tex_coords(&self) -> bool {
        !self.tex_coords.is_empty()
    }

    pub fn add_texture(&mut self, ty: TextureType, texture: Texture) -> &mut Self {
        self.textures[ty.index()].push(texture);
        self.dirty = true;
        self.material_dirty = true;
        self
    }

    pub fn clear_textures(&mut self, ty: TextureType) -> &mut Self {
        self.textures[ty.index()].clear();
        self.dirty = true;
        self.material_dirty = true;
        self
    }

    pub fn textures(&self, ty: TextureType) -> &[Texture] {
        &self.textures[ty.index()]
    }

    /// The texture sampled for a slot: the most recently added one
    pub fn active_texture(&self, ty: TextureType) -> Option<&Texture> {
        self.textures[ty.index()].last()
    }

    pub fn set_shininess(&mut self, shininess: f32) -> &mut Self {
        self.shininess = shininess;
        self
    }

    pub fn verts_pos(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn verts_pos_mut(&mut self) -> &mut [Vec3] {
        &mut self.positions
    }

    /// Vertex colours (UV coordinates in texture shading)
    pub fn verts_rgb(&self) -> &[Vec3] {
        &self.colors
    }

    pub fn verts_rgb_mut(&mut self) -> &mut [Vec3] {
        &mut self.colors
    }

    /// Give every vertex the same colour
    pub fn set_verts_rgb(&mut self, color: Vec3) -> &mut Self {
        self.colors.fill(color);
        self.dirty = true;
        self
    }

    pub fn verts_norm(&self) -> &[Vec3] {
        &self.normals
    }

    /// Mutable normals. Calling this turns off automatic normal estimation.
    pub fn verts_norm_mut(&mut self) -> &mut [Vec3] {
        self.auto_normals = false;
        &mut self.normals
    }

    pub fn auto_normals(&self) -> bool {
        self.auto_normals
    }

    pub fn faces(&self) -> &[[u32; 3]] {
        &self.faces
    }

    pub fn faces_mut(&mut self) -> &mut [[u32; 3]] {
        &mut self.faces
    }

    pub fn n_verts(&self) -> usize {
        self.positions.len()
    }

    pub fn n_faces(&self) -> usize {
        self.faces.len()
    }

    /// Schedule a GPU upload of the current data on the next frame
    pub fn update(&mut self) {
        self.refresh_normals();
        self.dirty = true;
    }

    pub fn needs_upload(&self) -> bool {
        self.dirty
    }

    pub(crate) fn refresh_normals(&mut self) {
        if self.auto_normals && validate_faces(&self.faces, self.positions.len()).is_ok() {
            self.normals = estimate_normals(&self.positions, &self.faces);
        }
    }

    /// Interleaved vertices and triangle indices as uploaded to the GPU.
    ///
    /// With texture coordinates set, vertices follow texture-coordinate order
    /// and the UV is stored in the colour slot.
    pub fn vertex_data(&self) -> Result<(Vec<MeshVertex>, Vec<u32>)> {
        validate_faces(&self.faces, self.positions.len())?;

        if self.has_tex_coords() {
            let vertices = self
                .tex_to_vert
                .iter()
                .zip(&self.tex_coords)
                .map(|(&v, uv)| MeshVertex {
                    position: self.positions[v as usize].to_array(),
                    color: [uv.x, uv.y, 0.0],
                    normal: self.normals[v as usize].to_array(),
                })
                .collect();
            let indices = self.tex_faces.iter().flatten().copied().collect();
            return Ok((vertices, indices));
        }

        let vertices = self
            .positions
            .iter()
            .zip(&self.colors)
            .zip(&self.normals)
            .map(|((p, c), n)| MeshVertex {
                position: p.to_array(),
                color: c.to_array(),
                normal: n.to_array(),
            })
            .collect();
        let indices = self.faces.iter().flatten().copied().collect();
        Ok((vertices, indices))
    }

    /// Replace this mesh with the contents of a basic OBJ file
    pub fn load_basic_obj(&mut self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let loaded = obj::load_basic_obj(path)?;
        self.positions = loaded.positions;
        self.colors = loaded.colors;
        self.normals = loaded.normals;
        self.faces = loaded.faces;
        self.shading_type = loaded.shading_type;
        self.tex_coords.clear();
        self.tex_faces.clear();
        self.tex_to_vert.clear();
        self.auto_normals = true;
        self.transform = Mat4::IDENTITY;
        self.dirty = true;
        Ok(())
    }

    pub fn save_basic_obj(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        obj::save_basic_obj(self, path)
    }

    /// Move vertices physically: `p * scale + offset`
    pub(crate) fn bake_scale_offset(&mut self, scale: f32, offset: Vec3) {
        for p in &mut self.positions {
            *p = *p * scale + offset;
        }
        self.dirty = true;
    }

    /// Single triangle with UVs (0,0), (0,1), (1,1)
    pub fn triangle(a: Vec3, b: Vec3, c: Vec3) -> Self {
        let normal = (b - a).cross(c - b);
        let mut mesh = Self::from_parts(3, sequential_faces(3));
        mesh.positions = vec![a, b, c];
        mesh.colors = vec![Vec3::ZERO, Vec3::Y, Vec3::new(1.0, 1.0, 0.0)];
        mesh.normals = vec![normal; 3];
        mesh.shading_type = ShadingType::Texture;
        mesh
    }

    /// Unit square centered at the origin, facing +z
    pub fn square() -> Self {
        let mut mesh = Self::from_parts(4, vec![[0, 3, 1], [1, 3, 2]]);
        mesh.positions = vec![
            Vec3::new(0.5, 0.5, 0.0),
            Vec3::new(0.5, -0.5, 0.0),
            Vec3::new(-0.5, -0.5, 0.0),
            Vec3::new(-0.5, 0.5, 0.0),
        ];
        mesh.colors = vec![
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::ZERO,
            Vec3::new(0.0, 1.0, 0.0),
        ];
        mesh.normals = vec![Vec3::Z; 4];
        mesh.shading_type = ShadingType::Texture;
        mesh
    }

    /// Unit cube centered at the origin: 36 vertices, one UV square per side
    pub fn cube() -> Self {
        let mut mesh = Self::from_parts(CUBE_VERTICES.len(), sequential_faces(CUBE_VERTICES.len()));
        for (i, &[x, y, z, u, v, nx, ny, nz]) in CUBE_VERTICES.iter().enumerate() {
            mesh.positions[i] = Vec3::new(x, y, z);
            mesh.colors[i] = Vec3::new(u, v, 0.0);
            mesh.normals[i] = Vec3::new(nx, ny, nz);
        }
        mesh.shading_type = ShadingType::Texture;
        mesh
    }

    /// Unit UV sphere centered at the origin.
    /// `rings` is clamped to `2..=65535` and `sectors` to `3..=65535`, which keeps
    /// every vertex index within `u32`.
    pub fn sphere(rings: u32, sectors: u32) -> Self {
        let (rings, sectors) = sphere_resolution(rings, sectors);
        let ring_step = PI / (rings - 1) as f32;
        let sector_step = 2.0 * PI / sectors as f32;

        let n_verts = rings as usize * sectors as usize;
        let mut faces = Vec::with_capacity((rings as usize - 1) * sectors as usize * 2);
        let mut mesh = Self::from_parts(n_verts, Vec::new());

        let mut vid = 0;
        for r in 0..rings {
            for s in 0..sectors {
                let (rf, sf) = (r as f32, s as f32);
                let y = (-0.5 * PI + rf * ring_step).sin();
                let x = (sf * sector_step).cos() * (rf * ring_step).sin();
                let z = (sf * sector_step).sin() * (rf * ring_step).sin();
                mesh.positions[vid] = Vec3::new(x, y, z);
                mesh.colors[vid] = Vec3::new(sf * sector_step, rf * ring_step, 0.0);
                mesh.normals[vid] = Vec3::new(x, y, z);
                vid += 1;
            }
        }

        for r in 0..rings - 1 {
            let next_r = r + 1;
            for s in 0..sectors {
                let next_s = if s == sectors - 1 { 0 } else { s + 1 };
                faces.push([r * sectors + next_s, r * sectors + s, next_r * sectors + s]);
                faces.push([next_r * sectors + s, next_r * sectors + next_s, r * sectors + next_s]);
            }
        }

        mesh.faces = faces;
        mesh.shading_type = ShadingType::Texture;
        mesh
    }
}

impl Transformable for Mesh {
    fn transform(&self) -> &Mat4 {
        &self.transform
    }

    fn transform_mut(&mut self) -> &mut Mat4 {
        &mut self.transform
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
}

impl fmt::Debug for Mesh {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mesh")
            .field("n_verts", &self.n_verts())
            .field("n_faces", &self.n_faces())
            .field("shading_type", &self.shading_type)
            .field("enabled", &self.enabled)
            .field("shininess", &self.shininess)
            .field("n_tex_coords", &self.tex_coords.len())
            .field("uploaded", &self.gpu.is_some())
            .finish()
    }
}

/// Raw pieces of a mesh, used by the file loaders
pub(crate) struct MeshParts {
    pub positions: Vec<Vec3>,
    pub colors: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub faces: Vec<[u32; 3]>,
    pub shading_type: ShadingType,
}

impl From<MeshParts> for Mesh {
    fn from(parts: MeshParts) -> Self {
        let mut mesh = Mesh::from_parts(0, Vec::new());
        mesh.positions = parts.positions;
        mesh.colors = parts.colors;
        mesh.normals = parts.normals;
        mesh.faces = parts.faces;
        mesh.shading_type = parts.shading_type;
        mesh
    }
}

fn blank_faces(num_verts: usize, num_triangles: usize) -> Result<Vec<[u32; 3]>> {
    if num_triangles == 0 {
        if num_verts % 3 != 0 {
            return Err(Error::VertexCountNotMultipleOfThree(num_verts));
        }
        Ok(sequential_faces(num_verts))
    } else {
        Ok(vec![[0, 0, 0]; num_triangles])
    }
}

const MAX_SPHERE_RESOLUTION: u32 = u16::MAX as u32;

fn sphere_resolution(rings: u32, sectors: u32) -> (u32, u32) {
    (
        rings.clamp(2, MAX_SPHERE_RESOLUTION),
        sectors.clamp(3, MAX_SPHERE_RESOLUTION),
    )
}

fn check_len(what: &'static str, expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(Error::LengthMismatch { what, expected, actual });
    }
    Ok(())
}

// position, uv, normal
#[rustfmt::skip]
const CUBE_VERTICES: [[f32; 8]; 36] = [
    // back
    [-0.5, -0.5, -0.5, 0.0, 0.0, 0.0, 0.0, -1.0],
    [ 0.5,  0.5, -0.5, 1.0, 1.0, 0.0, 0.0, -1.0],
    [ 0.5, -0.5, -0.5, 1.0, 0.0, 0.0, 0.0, -1.0],
    [ 0.5,  0.5, -0.5, 1.0, 1.0, 0.0, 0.0, -1.0],
    [-0.5, -0.5, -0.5, 0.0, 0.0, 0.0, 0.0, -1.0],
    [-0.5,  0.5, -0.5, 0.0, 1.0, 0.0, 0.0, -1.0],
    // front
    [-0.5, -0.5,  0.5, 0.0, 0.0, 0.0, 0.0, 1.0],
    [ 0.5, -0.5,  0.5, 1.0, 0.0, 0.0, 0.0, 1.0],
    [ 0.5,  0.5,  0.5, 1.0, 1.0, 0.0, 0.0, 1.0],
    [ 0.5,  0.5,  0.5, 1.0, 1.0, 0.0, 0.0, 1.0],
    [-0.5,  0.5,  0.5, 0.0, 1.0, 0.0, 0.0, 1.0],
    [-0.5, -0.5,  0.5, 0.0, 0.0, 0.0, 0.0, 1.0],
    // left
    [-0.5,  0.5,  0.5, 1.0, 0.0, -1.0, 0.0, 0.0],
    [-0.5,  0.5, -0.5, 1.0, 1.0, -1.0, 0.0, 0.0],
    [-0.5, -0.5, -0.5, 0.0, 1.0, -1.0, 0.0, 0.0],
    [-0.5, -0.5, -0.5, 0.0, 1.0, -1.0, 0.0, 0.0],
    [-0.5, -0.5,  0.5, 0.0, 0.0, -1.0, 0.0, 0.0],
    [-0.5,  0.5,  0.5, 1.0, 0.0, -1.0, 0.0, 0.0],
    // right
    [ 0.5,  0.5,  0.5, 1.0, 0.0, 1.0, 0.0, 0.0],
    [ 0.5, -0.5, -0.5, 0.0, 1.0, 1.0, 0.0, 0.0],
    [ 0.5,  0.5, -0.5, 1.0, 1.0, 1.0, 0.0, 0.0],
    [ 0.5, -0.5, -0.5, 0.0, 1.0, 1.0, 0.0, 0.0],
    [ 0.5,  0.5,  0.5, 1.0, 0.0, 1.0, 0.0, 0.0],
    [ 0.5, -0.5,  0.5, 0.0, 0.0, 1.0, 0.0, 0.0],
    // bottom
    [-0.5, -0.5, -0.5, 0.0, 1.0, 0.0, -1.0, 0.0],
    [ 0.5, -0.5, -0.5, 1.0, 1.0, 0.0, -1.0, 0.0],
    [ 0.5, -0.5,  0.5, 1.0, 0.0, 0.0, -1.0, 0.0],
    [ 0.5, -0.5,  0.5, 1.0, 0.0, 0.0, -1.0, 0.0],
    [-0.5, -0.5,  0.5, 0.0, 0.0, 0.0, -1.0, 0.0],
    [-0.5, -0.5, -0.5, 0.0, 1.0, 0.0, -1.0, 0.0],
    // top
    [-0.5,  0.5, -0.5, 0.0, 1.0, 0.0, 1.0, 0.0],
    [ 0.5,  0.5,  0.5, 1.0, 0.0, 0.0, 1.0, 0.0],
    [ 0.5,  0.5, -0.5, 1.0, 1.0, 0.0, 1.0, 0.0],
    [ 0.5,  0.5,  0.5, 1.0, 0.0, 0.0, 1.0, 0.0],
    [-0.5,  0.5, -0.5, 0.0, 1.0, 0.0, 1.0, 0.0],
    [-0.5,  0.5,  0.5, 0.0, 0.0, 0.0, 1.0, 0.0],
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_with_sequential_faces() {
        let mesh = Mesh::new(6, 0).unwrap();
        assert_eq!(mesh.faces(), &[[0, 1, 2], [3, 4, 5]]);
        assert_eq!(mesh.transform, Mat4::IDENTITY);
        assert!(mesh.needs_upload());
    }

    #[test]
    fn test_new_rejects_partial_triangle_soup() {
        assert_eq!(Mesh::new(4, 0).unwrap_err(), Error::VertexCountNotMultipleOfThree(4));
        assert!(Mesh::new(4, 2).is_ok());
    }

    #[test]
    fn test_from_vertices_checks_lengths() {
        let pos = [Vec3::ZERO, Vec3::X, Vec3::Y];
        let err = Mesh::from_vertices(&pos, &[], &[Vec3::ONE], &[]).unwrap_err();
        assert_eq!(err, Error::LengthMismatch { what: "rgb", expected: 3, actual: 1 });

        let err = Mesh::from_vertices(&pos, &[[0, 1, 3]], &[], &[]).unwrap_err();
        assert!(matches!(err, Error::FaceIndexOutOfRange { index: 3, .. }));
    }

    #[test]
    fn test_explicit_normals_disable_auto_normals() {
        let pos = [Vec3::ZERO, Vec3::X, Vec3::Y];
        let mut mesh = Mesh::from_vertices(&pos, &[], &[], &[Vec3::X; 3]).unwrap();
        assert!(!mesh.auto_normals());
        mesh.update();
        assert_eq!(mesh.verts_norm(), &[Vec3::X; 3]);
    }

    #[test]
    fn test_update_estimates_normals() {
        let pos = [Vec3::ZERO, Vec3::X, Vec3::Y];
        let mut mesh = Mesh::from_vertices(&pos, &[], &[], &[]).unwrap();
        mesh.update();
        assert!((mesh.verts_norm()[0] - Vec3::Z).length() < 1e-6);
    }

    #[test]
    fn test_verts_norm_mut_turns_off_auto_normals() {
        let mut mesh = Mesh::new(3, 0).unwrap();
        mesh.verts_norm_mut()[0] = Vec3::Y;
        assert!(!mesh.auto_normals());
    }

    #[test]
    fn test_with_color_broadcasts() {
        let pos = [Vec3::ZERO, Vec3::X, Vec3::Y];
        let mesh = Mesh::with_color(&pos, &[], Vec3::new(0.0, 1.0, 1.0), &[]).unwrap();
        assert!(mesh.verts_rgb().iter().all(|c| *c == Vec3::new(0.0, 1.0, 1.0)));
        assert_eq!(Mesh::with_color(&[], &[], Vec3::ONE, &[]).unwrap_err(), Error::EmptyPositions);
    }

    #[test]
    fn test_sphere_counts() {
        let sphere = Mesh::sphere(30, 30);
        assert_eq!(sphere.n_verts(), 900);
        assert_eq!(sphere.n_faces(), 29 * 30 * 2);
        assert_eq!(sphere.shading_type, ShadingType::Texture);
        for p in sphere.verts_pos() {
            assert!((p.length() - 1.0).abs() < 1e-5);
        }
        assert!(validate_faces(sphere.faces(), sphere.n_verts()).is_ok());
    }

    #[test]
    fn test_sphere_clamps_resolution() {
        let sphere = Mesh::sphere(0, 1);
        assert_eq!(sphere.n_verts(), 6);
        assert_eq!(sphere.n_faces(), 6);
    }

    #[test]
    fn test_sphere_resolution_keeps_indices_in_u32() {
        let (rings, sectors) = sphere_resolution(u32::MAX, u32::MAX);
        assert!((rings as u64) * (sectors as u64) <= u32::MAX as u64);
        assert_eq!(sphere_resolution(0, 1), (2, 3));
        assert_eq!(sphere_resolution(30, 40), (30, 40));
    }

    #[test]
    fn test_cube_faces_point_outward() {
        let cube = Mesh::cube();
        assert_eq!(cube.n_verts(), 36);
        assert_eq!(cube.n_faces(), 12);
        let computed = estimate_normals(cube.verts_pos(), cube.faces());
        for (table, est) in cube.verts_norm().iter().zip(&computed) {
            assert!((*table - *est).length() < 1e-5);
        }
    }

    #[test]
    fn test_square_faces_point_up_z() {
        let square = Mesh::square();
        for n in estimate_normals(square.verts_pos(), square.faces()) {
            assert!((n - Vec3::Z).length() < 1e-6);
        }
    }

    #[test]
    fn test_triangle_builder() {
        let tri = Mesh::triangle(Vec3::ZERO, Vec3::X, Vec3::Y);
        assert_eq!(tri.n_faces(), 1);
        assert_eq!(tri.shading_type, ShadingType::Texture);
        assert!(tri.verts_norm()[0].z > 0.0);
    }

    #[test]
    fn test_tex_coords_switch_shading_and_layout() {
        let pos = [Vec3::ZERO, Vec3::X, Vec3::Y];
        let mut mesh = Mesh::from_vertices(&pos, &[], &[], &[]).unwrap();
        let coords = [Vec2::ZERO, Vec2::X, Vec2::Y, Vec2::ONE];
        assert!(mesh.set_tex_coords(&coords[..2], &[[0, 1, 1]]).is_err());

        let mut mesh = Mesh::from_vertices(&pos, &[], &[], &[]).unwrap();
        let err = mesh.set_tex_coords(&coords, &[[3, 1, 2]]).unwrap_err();
        assert_eq!(err, Error::UnmatchedTexCoord(0));

        mesh.set_tex_coords(&coords[..3], &[[2, 0, 1]]).unwrap();
        assert_eq!(mesh.shading_type, ShadingType::Texture);
        let (vertices, indices) = mesh.vertex_data().unwrap();
        assert_eq!(indices, vec![2, 0, 1]);
        // tex coord 2 sits on vertex 0
        assert_eq!(vertices[2].position, [0.0, 0.0, 0.0]);
        assert_eq!(vertices[2].color, [0.0, 1.0, 0.0]);

        mesh.unset_tex_coords();
        assert_eq!(mesh.shading_type, ShadingType::Vertex);
        assert_eq!(mesh.vertex_data().unwrap().1, vec![0, 1, 2]);
    }

    #[test]
    fn test_vertex_data_rejects_bad_faces() {
        let mut mesh = Mesh::new(3, 0).unwrap();
        mesh.faces_mut()[0] = [0, 1, 9];
        assert!(mesh.vertex_data().is_err());
    }

    #[test]
    fn test_active_texture_is_last_added() {
        let mut mesh = Mesh::cube();
        assert!(mesh.active_texture(TextureType::Diffuse).is_none());
        mesh.add_texture(TextureType::Diffuse, Texture::from_color(Vec3::X))
            .add_texture(TextureType::Diffuse, Texture::from_color(Vec3::Y));
        let img = mesh.active_texture(TextureType::Diffuse).unwrap().decode();
        assert_eq!(img.rgba, vec![0, 255, 0, 255]);
        mesh.clear_textures(TextureType::Diffuse);
        assert!(mesh.textures(TextureType::Diffuse).is_empty());
    }

    #[test]
    fn test_only_texture_edits_flag_material() {
        let mut mesh = Mesh::cube();
        mesh.material_dirty = false;
        mesh.set_verts_rgb(Vec3::ONE).update();
        assert!(mesh.needs_upload());
        assert!(!mesh.material_dirty);

        mesh.add_texture(TextureType::Specular, Texture::from_color(Vec3::ONE));
        assert!(mesh.material_dirty);
        mesh.material_dirty = false;
        mesh.clear_textures(TextureType::Specular);
        assert!(mesh.material_dirty);
    }

    #[test]
    fn test_resize_resets() {
        let mut mesh = Mesh::cube();
        mesh.set_shininess(32.0);
        mesh.transform = Mat4::from_translation(Vec3::ONE);
        mesh.resize(3, 1).unwrap();
        assert_eq!(mesh.n_verts(), 3);
        assert_eq!(mesh.n_faces(), 1);
        assert_eq!(mesh.transform, Mat4::IDENTITY);
        assert_eq!(mesh.shininess, 32.0);
    }
}
