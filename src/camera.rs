use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};

use glam::{Mat4, Quat, Vec3};

use crate::types::FrameUniform;

const PITCH_LIMIT: f32 = FRAC_PI_2 - 1e-3;
const MIN_DIST: f32 = 1e-4;

/// Light parameters passed to [`Camera::to_uniform`]
#[derive(Debug, Clone, Copy)]
pub struct Lighting {
    /// Light position in view space; it follows the camera
    pub pos: Vec3,
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
}

/// Parameters restored by `reset_view` / `reset_proj`
#[derive(Debug, Clone, Copy)]
struct Home {
    center_of_rot: Vec3,
    world_up: Vec3,
    dist_to_center: f32,
    yaw: f32,
    pitch: f32,
    roll: f32,
    ortho: bool,
    fovy: f32,
    z_close: f32,
    z_far: f32,
}

/// Orbit camera rotating around `center_of_rot`
#[derive(Debug, Clone)]
pub struct Camera {
    pub center_of_rot: Vec3,
    pub world_up: Vec3,
    pub dist_to_center: f32,
    pub yaw: f32,
    pub pitch: f32,
    pub roll: f32,
    /// Orthographic instead of perspective projection
    pub ortho: bool,
    pub fovy: f32,
    pub aspect: f32,
    pub z_close: f32,
    pub z_far: f32,

    pub pan_speed: f32,
    pub rotate_speed: f32,
    pub scroll_factor: f32,

    // Derived by update_view / update_proj
    pub front: Vec3,
    pub up: Vec3,
    pub right: Vec3,
    pub view: Mat4,
    pub proj: Mat4,

    home: Home,
}

impl Camera {
    /// Camera orbiting `center_of_rot` at `dist_to_center`, looking down -z
    pub fn new(center_of_rot: Vec3, dist_to_center: f32) -> Self {
        let home = Home {
            center_of_rot,
            world_up: Vec3::Y,
            dist_to_center,
            yaw: -FRAC_PI_2,
            pitch: 0.0,
            roll: 0.0,
            ortho: false,
            fovy: FRAC_PI_4,
            z_close: 0.01,
            z_far: 1e3,
        };
        let mut camera = Self {
            center_of_rot,
            world_up: home.world_up,
            dist_to_center,
            yaw: home.yaw,
            pitch: home.pitch,
            roll: home.roll,
            ortho: home.ortho,
            fovy: home.fovy,
            aspect: 5.0 / 3.0,
            z_close: home.z_close,
            z_far: home.z_far,
            pan_speed: 0.0015,
            rotate_speed: 0.008,
            scroll_factor: 1.1,
            front: Vec3::NEG_Z,
            up: Vec3::Y,
            right: Vec3::X,
            view: Mat4::IDENTITY,
            proj: Mat4::IDENTITY,
            home,
        };
        camera.update_view();
        camera.update_proj();
        camera
    }

    /// Make the current view and projection parameters the ones restored by
    /// `reset_view` and `reset_proj`
    pub fn set_home(&mut self) {
        self.home = Home {
            center_of_rot: self.center_of_rot,
            world_up: self.world_up,
            dist_to_center: self.dist_to_center,
            yaw: self.yaw,
            pitch: self.pitch,
            roll: self.roll,
            ortho: self.ortho,
            fovy: self.fovy,
            z_close: self.z_close,
            z_far: self.z_far,
        };
    }

    /// Eye position in world space
    pub fn pos(&self) -> Vec3 {
        self.center_of_rot - self.dist_to_center * self.front
    }

    /// Recompute `front`, `up`, `right` and `view` from the orbit parameters
    pub fn update_view(&mut self) {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        self.front = Vec3::new(cos_yaw * cos_pitch, sin_pitch, sin_yaw * cos_pitch).normalize();

        let right = self.front.cross(self.world_up).normalize_or_zero();
        let up = right.cross(self.front).normalize_or_zero();
        let roll = Quat::from_axis_angle(self.front, self.roll);
        self.right = roll * right;
        self.up = roll * up;

        self.view = Mat4::look_to_rh(self.pos(), self.front, self.up);
    }

    /// Recompute `proj`. Depth maps to [0, 1].
    pub fn update_proj(&mut self) {
        self.proj = if self.ortho {
            let half_h = self.dist_to_center * (self.fovy * 0.5).tan();
            let half_w = half_h * self.aspect;
            Mat4::orthographic_rh(-half_w, half_w, -half_h, half_h, self.z_close, self.z_far)
        } else {
            Mat4::perspective_rh(self.fovy, self.aspect, self.z_close, self.z_far)
        };
    }

    pub fn view_proj(&self) -> Mat4 {
        self.proj * self.view
    }

    pub fn set_aspect(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
            self.update_proj();
        }
    }

    /// Orbit: horizontal motion turns yaw, vertical motion turns pitch
    pub fn rotate_with_mouse(&mut self, dx: f32, dy: f32) {
        self.yaw += dx * self.rotate_speed;
        self.pitch = (self.pitch - dy * self.rotate_speed).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.update_view();
    }

    pub fn roll_with_mouse(&mut self, dx: f32, _dy: f32) {
        self.roll += dx * self.rotate_speed;
        self.update_view();
    }

    /// Move the center of rotation in the view plane; speed grows with distance
    pub fn pan_with_mouse(&mut self, dx: f32, dy: f32) {
        let scale = self.pan_speed * self.dist_to_center;
        self.center_of_rot += (self.up * dy - self.right * dx) * scale;
        self.update_view();
    }

    /// Positive amounts move closer
    pub fn zoom_with_mouse(&mut self, amount: f32) {
        self.dist_to_center = (self.dist_to_center / self.scroll_factor.powf(amount)).max(MIN_DIST);
        self.update_view();
        if self.ortho {
            self.update_proj();
        }
    }

    pub fn reset_view(&mut self) {
        self.center_of_rot = self.home.center_of_rot;
        self.world_up = self.home.world_up;
        self.dist_to_center = self.home.dist_to_center;
        self.yaw = self.home.yaw;
        self.pitch = self.home.pitch;
        self.roll = self.home.roll;
        self.update_view();
    }

    pub fn reset_proj(&mut self) {
        self.ortho = self.home.ortho;
        self.fovy = self.home.fovy;
        self.z_close = self.home.z_close;
        self.z_far = self.home.z_far;
        self.update_proj();
    }

    /// Per-frame uniform with the light moved from view space to world space
    pub fn to_uniform(&self, lighting: &Lighting, width: u32, height: u32) -> FrameUniform {
        let light_world = self.view.inverse().transform_point3(lighting.pos);
        FrameUniform {
            view_proj: self.view_proj().to_cols_array_2d(),
            view_pos: self.pos().extend(1.0).to_array(),
            light_pos: light_world.extend(1.0).to_array(),
            light_ambient: lighting.ambient.extend(1.0).to_array(),
            light_diffuse: lighting.diffuse.extend(1.0).to_array(),
            light_specular: lighting.specular.extend(1.0).to_array(),
            viewport: [width as f32, height as f32, 0.0, 0.0],
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::ZERO, 3.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn test_default_looks_down_negative_z() {
        let cam = Camera::default();
        assert!(approx(cam.front, Vec3::NEG_Z));
        assert!(approx(cam.pos(), Vec3::new(0.0, 0.0, 3.0)));
        assert!(approx(cam.right, Vec3::X));
        assert!(approx(cam.up, Vec3::Y));
    }

    #[test]
    fn test_view_maps_center_in_front() {
        let cam = Camera::default();
        let p = cam.view.transform_point3(Vec3::ZERO);
        assert!(approx(p, Vec3::new(0.0, 0.0, -3.0)));
    }

    #[test]
    fn test_pitch_is_clamped() {
        let mut cam = Camera::default();
        cam.rotate_with_mouse(0.0, -1e6);
        assert!(cam.pitch <= PITCH_LIMIT);
        assert!(cam.front.is_finite());
        assert!(cam.up.is_finite());
    }

    #[test]
    fn test_roll_rotates_up_vector() {
        let mut cam = Camera::default();
        cam.roll = FRAC_PI_2;
        cam.update_view();
        assert!((cam.up.dot(Vec3::Y)).abs() < 1e-4);
        assert!(approx(cam.front, Vec3::NEG_Z));
    }

    #[test]
    fn test_reset_restores_home() {
        let mut cam = Camera::default();
        cam.rotate_with_mouse(50.0, 20.0);
        cam.pan_with_mouse(10.0, 10.0);
        cam.zoom_with_mouse(3.0);
        cam.ortho = true;
        cam.reset_view();
        cam.reset_proj();
        assert!(approx(cam.pos(), Vec3::new(0.0, 0.0, 3.0)));
        assert!(!cam.ortho);
    }

    #[test]
    fn test_ortho_depth_in_unit_range() {
        let mut cam = Camera::default();
        cam.ortho = true;
        cam.update_proj();
        let clip = cam.view_proj() * Vec3::ZERO.extend(1.0);
        let depth = clip.z / clip.w;
        assert!((0.0..=1.0).contains(&depth));
    }

    #[test]
    fn test_light_follows_camera() {
        let cam = Camera::default();
        let lighting = Lighting {
            pos: Vec3::ZERO,
            ambient: Vec3::splat(0.2),
            diffuse: Vec3::ONE,
            specular: Vec3::ONE,
        };
        let uniform = cam.to_uniform(&lighting, 800, 600);
        assert!((uniform.light_pos[2] - 3.0).abs() < 1e-4);
        assert_eq!(uniform.viewport[0], 800.0);
    }
}
