use std::fmt;

use glam::{Mat4, Vec3};

use crate::error::{Error, Result};
use crate::renderer::GpuPointCloud;
use crate::transform::Transformable;
use crate::types::PointVertex;

/// Coloured points, or line segments between consecutive vertex pairs
pub struct PointCloud {
    positions: Vec<Vec3>,
    colors: Vec<Vec3>,

    pub enabled: bool,
    /// Draw as line segments `(0,1), (2,3), ...` instead of points
    pub lines: bool,
    /// Point size in pixels
    pub point_size: f32,
    pub transform: Mat4,

    pub(crate) dirty: bool,
    pub(crate) gpu: Option<GpuPointCloud>,
}

impl PointCloud {
    /// `n` points at the origin, coloured white
    pub fn new(n: usize) -> Self {
        Self {
            positions: vec![Vec3::ZERO; n],
            colors: vec![Vec3::ONE; n],
            enabled: true,
            lines: false,
            point_size: 1.0,
            transform: Mat4::IDENTITY,
            dirty: true,
            gpu: None,
        }
    }

    /// Points with per-vertex colours. Empty `rgb` means white.
    pub fn from_points(positions: &[Vec3], rgb: &[Vec3]) -> Result<Self> {
        if positions.is_empty() {
            return Err(Error::EmptyPositions);
        }
        let mut cloud = Self::new(positions.len());
        cloud.positions.copy_from_slice(positions);
        if !rgb.is_empty() {
            if rgb.len() != positions.len() {
                return Err(Error::LengthMismatch {
                    what: "rgb",
                    expected: positions.len(),
                    actual: rgb.len(),
                });
            }
            cloud.colors.copy_from_slice(rgb);
        }
        Ok(cloud)
    }

    pub fn with_color(positions: &[Vec3], color: Vec3) -> Result<Self> {
        let mut cloud = Self::from_points(positions, &[])?;
        cloud.set_verts_rgb(color);
        Ok(cloud)
    }

    /// A single line segment from `a` to `b`
    pub fn line(a: Vec3, b: Vec3, color: Vec3) -> Self {
        let mut cloud = Self::new(2);
        cloud.positions = vec![a, b];
        cloud.colors = vec![color; 2];
        cloud.lines = true;
        cloud
    }

    /// Replace all data with `n` white points at the origin and reset the transform
    pub fn resize(&mut self, n: usize) {
        self.positions = vec![Vec3::ZERO; n];
        self.colors = vec![Vec3::ONE; n];
        self.transform = Mat4::IDENTITY;
        self.dirty = true;
    }

    pub fn verts_pos(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn verts_pos_mut(&mut self) -> &mut [Vec3] {
        &mut self.positions
    }

    pub fn verts_rgb(&self) -> &[Vec3] {
        &self.colors
    }

    pub fn verts_rgb_mut(&mut self) -> &mut [Vec3] {
        &mut self.colors
    }

    pub fn set_verts_rgb(&mut self, color: Vec3) -> &mut Self {
        self.colors.fill(color);
        self.dirty = true;
        self
    }

    pub fn set_point_size(&mut self, size: f32) -> &mut Self {
        self.point_size = size.max(0.0);
        self
    }

    pub fn draw_lines(&mut self, lines: bool) -> &mut Self {
        self.lines = lines;
        self
    }

    pub fn n_verts(&self) -> usize {
        self.positions.len()
    }

    /// Schedule a GPU upload of the current data on the next frame
    pub fn update(&mut self) {
        self.dirty = true;
    }

    pub fn needs_upload(&self) -> bool {
        self.dirty
    }

    /// Vertices as uploaded to the GPU
    pub fn vertex_data(&self) -> Vec<PointVertex> {
        self.positions
            .iter()
            .zip(&self.colors)
            .map(|(p, c)| PointVertex {
                position: p.to_array(),
                color: c.to_array(),
            })
            .collect()
    }
}

impl Transformable for PointCloud {
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

impl fmt::Debug for PointCloud {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PointCloud")
            .field("n_verts", &self.n_verts())
            .field("lines", &self.lines)
            .field("point_size", &self.point_size)
            .field("enabled", &self.enabled)
            .field("uploaded", &self.gpu.is_some())
            .finish()
    }
}
