use anyhow::{Context, Result};
use glam::{Mat4, Vec2, Vec3};
use std::path::Path;

use crate::mesh::Mesh;
use crate::texture::{Texture, TextureType};
use crate::transform::normal_matrix;

/// Loads a glTF file as one mesh per primitive, with node transforms baked in.
///
/// Primitives with a base colour texture and `TEXCOORD_0` are texture-shaded;
/// the rest use `COLOR_0` or the material's base colour factor per vertex.
pub fn load_gltf_meshes(path: impl AsRef<Path>) -> Result<Vec<Mesh>> {
    let path = path.as_ref();
    log::info!("Loading glTF file: {:?}", path);

    let (gltf, buffers, images) =
        gltf::import(path).context(format!("Failed to load glTF file: {:?}", path))?;

    log::debug!(
        "glTF: {} scenes, {} nodes, {} meshes, {} images",
        gltf.scenes().count(),
        gltf.nodes().count(),
        gltf.meshes().count(),
        images.len()
    );

    let mut meshes = Vec::new();
    for scene in gltf.scenes() {
        for node in scene.nodes() {
            process_node(&node, &buffers, &images, &Mat4::IDENTITY, &mut meshes)?;
        }
    }

    if meshes.is_empty() {
        log::warn!("No geometry found in glTF file {:?}", path);
    }
    log::info!("Extracted {} meshes from {:?}", meshes.len(), path);
    Ok(meshes)
}

/// Recursively processes glTF nodes
fn process_node(
    node: &gltf::Node,
    buffers: &[gltf::buffer::Data],
    images: &[gltf::image::Data],
    parent_transform: &Mat4,
    meshes: &mut Vec<Mesh>,
) -> Result<()> {
    let local_transform = Mat4::from_cols_array_2d(&node.transform().matrix());
    let global_transform = *parent_transform * local_transform;

    if let Some(mesh) = node.mesh() {
        process_mesh(&mesh, buffers, images, &global_transform, meshes)?;
    }

    for child in node.children() {
        process_node(&child, buffers, images, &global_transform, meshes)?;
    }

    Ok(())
}

fn process_mesh(
    mesh: &gltf::Mesh,
    buffers: &[gltf::buffer::Data],
    images: &[gltf::image::Data],
    transform: &Mat4,
    meshes: &mut Vec<Mesh>,
) -> Result<()> {
    log::debug!("Processing mesh: {:?}", mesh.name());
    let normal_transform = normal_matrix(transform);

    for primitive in mesh.primitives() {
        if primitive.mode() != gltf::mesh::Mode::Triangles {
            log::warn!("Skipping non-triangle primitive in mesh {:?}", mesh.name());
            continue;
        }
        let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|d| d.0.as_slice()));

        let positions: Vec<Vec3> = reader
            .read_positions()
            .context("Mesh primitive has no positions")?
            .map(|p| transform.transform_point3(Vec3::from_array(p)))
            .collect();
        if positions.is_empty() {
            continue;
        }

        let normals: Vec<Vec3> = reader
            .read_normals()
            .map(|iter| {
                iter.map(|n| normal_transform.transform_vector3(Vec3::from_array(n)).normalize_or_zero())
                    .collect()
            })
            .unwrap_or_default();

        let faces: Vec<[u32; 3]> = match reader.read_indices() {
            Some(indices) => {
                let indices: Vec<u32> = indices.into_u32().collect();
                indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]]).collect()
            }
            None => Vec::new(),
        };

        let pbr = primitive.material().pbr_metallic_roughness();
        let base = pbr.base_color_factor();
        let base_color = Vec3::new(base[0], base[1], base[2]);

        let colors: Vec<Vec3> = match reader.read_colors(0) {
            Some(colors) => colors
                .into_rgb_f32()
                .map(|c| Vec3::from_array(c) * base_color)
                .collect(),
            None => vec![base_color; positions.len()],
        };

        let mut out = Mesh::from_vertices(&positions, &faces, &colors, &normals)
            .context(format!("Invalid primitive in mesh {:?}", mesh.name()))?;

        let tex_coords: Option<Vec<Vec2>> = reader
            .read_tex_coords(0)
            .map(|uvs| uvs.into_f32().map(Vec2::from_array).collect());
        if let (Some(info), Some(uvs)) = (pbr.base_color_texture(), tex_coords) {
            if let Some(texture) = images.get(info.texture().source().index()).and_then(image_texture) {
                // glTF shares one index buffer for every attribute
                let tex_faces = out.faces().to_vec();
                out.set_tex_coords(&uvs, &tex_faces)?;
                out.add_texture(TextureType::Diffuse, texture);
            }
        }
        log::debug!("  primitive: {} vertices, {} faces", out.n_verts(), out.n_faces());
        meshes.push(out);
    }

    Ok(())
}

/// Convert a decoded glTF image to a float texture; unsupported formats yield None
fn image_texture(image: &gltf::image::Data) -> Option<Texture> {
    let channels = match image.format {
        gltf::image::Format::R8 => 1,
        gltf::image::Format::R8G8B8 => 3,
        gltf::image::Format::R8G8B8A8 => 4,
        other => {
            log::warn!("Unsupported glTF image format {:?}, ignoring texture", other);
            return None;
        }
    };
    let data = image.pixels.iter().map(|&v| v as f32 / 255.0).collect();
    match Texture::from_pixels(image.width, image.height, channels, data) {
        Ok(texture) => Some(texture),
        Err(e) => {
            log::warn!("Ignoring glTF texture: {}", e);
            None
        }
    }
}
