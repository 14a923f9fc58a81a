use glam::Vec3;
use winit::event::{ElementState, MouseButton};
use winit::keyboard::{KeyCode, ModifiersState};

use crate::app;
use crate::camera::{Camera, Lighting};
use crate::config::ViewerConfig;
use crate::frame::{FrameClock, FrameInfo};
use crate::input::{Action, Drag, InputState, HELP};
use crate::mesh::Mesh;
use crate::point_cloud::PointCloud;
use crate::texture::{Texture, TextureType};

/// Colour of the solid texture given to cubes, squares and spheres
pub const DEFAULT_SHAPE_COLOR: Vec3 = Vec3::new(1.0, 0.5, 0.0);
pub const DEFAULT_SPHERE_RINGS: u32 = 30;
pub const DEFAULT_SPHERE_SECTORS: u32 = 30;

pub type ViewerCallback = Box<dyn FnMut(&mut Viewer)>;
pub type LoopCallback = Box<dyn FnMut(&mut Viewer) -> bool>;
pub type GuiCallback = Box<dyn FnMut(&mut Viewer, &egui::Context) -> bool>;
pub type KeyCallback = Box<dyn FnMut(&mut Viewer, KeyCode, Action, ModifiersState) -> bool>;
pub type MouseButtonCallback =
    Box<dyn FnMut(&mut Viewer, MouseButton, Action, ModifiersState) -> bool>;
pub type MouseMoveCallback = Box<dyn FnMut(&mut Viewer, f64, f64) -> bool>;
pub type ScrollCallback = Box<dyn FnMut(&mut Viewer, f64, f64) -> bool>;

/// Interactive viewer holding the scene, lights, camera and callbacks.
///
/// Everything is plain data until [`Viewer::show`] opens the window; callbacks
/// receive the viewer itself and may change any of it between frames.
pub struct Viewer {
    pub meshes: Vec<Mesh>,
    pub point_clouds: Vec<PointCloud>,

    /// Light position in view space
    pub light_pos: Vec3,
    pub light_color_ambient: Vec3,
    pub light_color_diffuse: Vec3,
    pub light_color_specular: Vec3,

    pub camera: Camera,

    pub draw_axes: bool,
    pub wireframe: bool,
    pub cull_face: bool,
    /// Redraw only on input when true, continuously otherwise
    pub loop_wait_events: bool,
    pub title: String,
    pub background: Vec3,
    /// Requested fullscreen state, applied to the window each frame
    pub fullscreen: bool,

    pub on_open: Option<ViewerCallback>,
    pub on_close: Option<ViewerCallback>,
    /// Called every frame; returning true re-uploads all geometry
    pub on_loop: Option<LoopCallback>,
    /// Called inside the egui frame; returning true re-uploads all geometry
    pub on_gui: Option<GuiCallback>,
    /// Input callbacks return false to suppress the default handling
    pub on_key: Option<KeyCallback>,
    pub on_mouse_button: Option<MouseButtonCallback>,
    pub on_mouse_move: Option<MouseMoveCallback>,
    pub on_scroll: Option<ScrollCallback>,

    width: u32,
    height: u32,
    input: InputState,
    clock: FrameClock,
    frame: FrameInfo,
    close_requested: bool,
}

impl Viewer {
    pub fn new() -> Self {
        Self {
            meshes: Vec::new(),
            point_clouds: Vec::new(),
            light_pos: Vec3::new(12.0, 10.0, 20.0),
            light_color_ambient: Vec3::splat(0.2),
            light_color_diffuse: Vec3::ONE,
            light_color_specular: Vec3::ONE,
            camera: Camera::default(),
            draw_axes: true,
            wireframe: false,
            cull_face: true,
            loop_wait_events: true,
            title: "meshview".to_string(),
            background: Vec3::ONE,
            fullscreen: false,
            on_open: None,
            on_close: None,
            on_loop: None,
            on_gui: None,
            on_key: None,
            on_mouse_button: None,
            on_mouse_move: None,
            on_scroll: None,
            width: 1000,
            height: 600,
            input: InputState::new(),
            clock: FrameClock::new(),
            frame: FrameInfo::default(),
            close_requested: false,
        }
    }

    /// Open the window and run until it is closed.
    ///
    /// Only one event loop may be created per process, so this can be called once.
    pub fn show(&mut self) -> anyhow::Result<()> {
        self.close_requested = false;
        app::run(self)
    }

    /// Ask the window to close after the current event
    pub fn close(&mut self) {
        self.close_requested = true;
    }

    pub fn add_mesh(&mut self, mesh: Mesh) -> &mut Mesh {
        let index = self.meshes.len();
        self.meshes.push(mesh);
        &mut self.meshes[index]
    }

    pub fn add_point_cloud(&mut self, cloud: PointCloud) -> &mut PointCloud {
        let index = self.point_clouds.len();
        self.point_clouds.push(cloud);
        &mut self.point_clouds[index]
    }

    pub fn add_cube(&mut self, center: Vec3, side_len: f32) -> &mut Mesh {
        self.add_cube_with(center, side_len, DEFAULT_SHAPE_COLOR)
    }

    /// Cube with the given side length, moved to `center` in its vertex data
    pub fn add_cube_with(&mut self, center: Vec3, side_len: f32, color: Vec3) -> &mut Mesh {
        self.add_shape(Mesh::cube(), center, side_len, color)
    }

    pub fn add_square(&mut self, center: Vec3, side_len: f32) -> &mut Mesh {
        self.add_square_with(center, side_len, DEFAULT_SHAPE_COLOR)
    }

    pub fn add_square_with(&mut self, center: Vec3, side_len: f32, color: Vec3) -> &mut Mesh {
        self.add_shape(Mesh::square(), center, side_len, color)
    }

    pub fn add_sphere(&mut self, center: Vec3, radius: f32) -> &mut Mesh {
        self.add_sphere_with(
            center,
            radius,
            DEFAULT_SHAPE_COLOR,
            DEFAULT_SPHERE_RINGS,
            DEFAULT_SPHERE_SECTORS,
        )
    }

    pub fn add_sphere_with(
        &mut self,
        center: Vec3,
        radius: f32,
        color: Vec3,
        rings: u32,
        sectors: u32,
    ) -> &mut Mesh {
        self.add_shape(Mesh::sphere(rings, sectors), center, radius, color)
    }

    fn add_shape(&mut self, mut mesh: Mesh, center: Vec3, scale: f32, color: Vec3) -> &mut Mesh {
        mesh.bake_scale_offset(scale, center);
        mesh.add_texture(TextureType::Diffuse, Texture::from_color(color));
        self.add_mesh(mesh)
    }

    /// White line segment
    pub fn add_line(&mut self, a: Vec3, b: Vec3) -> &mut PointCloud {
        self.add_line_with(a, b, Vec3::ONE)
    }

    pub fn add_line_with(&mut self, a: Vec3, b: Vec3, color: Vec3) -> &mut PointCloud {
        self.add_point_cloud(PointCloud::line(a, b, color))
    }

    pub fn n_meshes(&self) -> usize {
        self.meshes.len()
    }

    pub fn n_point_clouds(&self) -> usize {
        self.point_clouds.len()
    }

    pub fn get_mesh(&self, index: usize) -> Option<&Mesh> {
        self.meshes.get(index)
    }

    pub fn get_mesh_mut(&mut self, index: usize) -> Option<&mut Mesh> {
        self.meshes.get_mut(index)
    }

    pub fn get_point_cloud(&self, index: usize) -> Option<&PointCloud> {
        self.point_clouds.get(index)
    }

    pub fn get_point_cloud_mut(&mut self, index: usize) -> Option<&mut PointCloud> {
        self.point_clouds.get_mut(index)
    }

    pub fn remove_mesh(&mut self, index: usize) -> Option<Mesh> {
        (index < self.meshes.len()).then(|| self.meshes.remove(index))
    }

    pub fn remove_point_cloud(&mut self, index: usize) -> Option<PointCloud> {
        (index < self.point_clouds.len()).then(|| self.point_clouds.remove(index))
    }

    pub fn clear_meshes(&mut self) {
        self.meshes.clear();
    }

    pub fn clear_point_clouds(&mut self) {
        self.point_clouds.clear();
    }

    /// Apply every setting present in `config`
    pub fn apply_config(&mut self, config: &ViewerConfig) {
        if let Some(title) = &config.title {
            self.title = title.clone();
        }
        if config.width.is_some() || config.height.is_some() {
            let width = config.width.unwrap_or(self.width);
            let height = config.height.unwrap_or(self.height);
            self.set_size(width, height);
        }
        if let Some(bg) = config.background {
            self.background = Vec3::from_array(bg);
        }
        if let Some(v) = config.draw_axes {
            self.draw_axes = v;
        }
        if let Some(v) = config.wireframe {
            self.wireframe = v;
        }
        if let Some(v) = config.cull_face {
            self.cull_face = v;
        }
        if let Some(v) = config.loop_wait_events {
            self.loop_wait_events = v;
        }

        let lights = &config.lights;
        if let Some(v) = lights.position {
            self.light_pos = Vec3::from_array(v);
        }
        if let Some(v) = lights.ambient {
            self.light_color_ambient = Vec3::from_array(v);
        }
        if let Some(v) = lights.diffuse {
            self.light_color_diffuse = Vec3::from_array(v);
        }
        if let Some(v) = lights.specular {
            self.light_color_specular = Vec3::from_array(v);
        }

        let cam = &config.camera;
        if let Some(c) = cam.center {
            self.camera.center_of_rot = Vec3::from_array(c);
        }
        if let Some(d) = cam.distance {
            self.camera.dist_to_center = d;
        }
        if let Some(deg) = cam.fovy_degrees {
            self.camera.fovy = deg.to_radians();
        }
        if let Some(o) = cam.ortho {
            self.camera.ortho = o;
        }
        self.camera.update_view();
        self.camera.update_proj();
        self.camera.set_home();
    }

    /// Window size in physical pixels. Before `show` this sets the initial size.
    pub fn set_size(&mut self, width: u32, height: u32) {
        self.width = width.max(1);
        self.height = height.max(1);
        self.camera.set_aspect(self.width, self.height);
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Cursor position in physical pixels
    pub fn mouse_pos(&self) -> (f64, f64) {
        self.input.cursor
    }

    pub fn mouse_button(&self) -> Option<MouseButton> {
        self.input.mouse_button
    }

    pub fn modifiers(&self) -> ModifiersState {
        self.input.modifiers
    }

    pub fn fps(&self) -> f32 {
        self.clock.fps()
    }

    /// Number and timing of the frame being drawn
    pub fn frame(&self) -> FrameInfo {
        self.frame
    }

    pub(crate) fn close_requested(&self) -> bool {
        self.close_requested
    }

    pub(crate) fn lighting(&self) -> Lighting {
        Lighting {
            pos: self.light_pos,
            ambient: self.light_color_ambient,
            diffuse: self.light_color_diffuse,
            specular: self.light_color_specular,
        }
    }

    pub(crate) fn mark_all_dirty(&mut self) {
        for mesh in &mut self.meshes {
            mesh.update();
        }
        for cloud in &mut self.point_clouds {
            cloud.update();
        }
    }

    /// Drop GPU resources tied to a closed window
    pub(crate) fn release_gpu(&mut self) {
        for mesh in &mut self.meshes {
            mesh.gpu = None;
            mesh.dirty = true;
        }
        for cloud in &mut self.point_clouds {
            cloud.gpu = None;
            cloud.dirty = true;
        }
    }

    /// Take a callback out of its slot, run it with the viewer, and put it back
    /// unless the callback installed a replacement
    fn with_callback<F: ?Sized, R>(
        &mut self,
        slot: fn(&mut Viewer) -> &mut Option<Box<F>>,
        call: impl FnOnce(&mut F, &mut Viewer) -> R,
    ) -> Option<R> {
        let mut callback = slot(self).take()?;
        let result = call(&mut *callback, self);
        let current = slot(self);
        if current.is_none() {
            *current = Some(callback);
        }
        Some(result)
    }

    pub(crate) fn run_open(&mut self) {
        self.with_callback(|v| &mut v.on_open, |cb, v| cb(v));
    }

    pub(crate) fn run_close(&mut self) {
        self.with_callback(|v| &mut v.on_close, |cb, v| cb(v));
    }

    /// Start a frame: tick the clock and run `on_loop`
    pub(crate) fn begin_frame(&mut self) {
        self.frame = self.clock.tick();
        let changed = self
            .with_callback(|v| &mut v.on_loop, |cb, v| cb(v))
            .unwrap_or(false);
        if changed {
            self.mark_all_dirty();
        }
    }

    pub(crate) fn run_gui(&mut self, ctx: &egui::Context) -> bool {
        self.with_callback(|v| &mut v.on_gui, |cb, v| cb(v, ctx))
            .unwrap_or(false)
    }

    pub(crate) fn handle_resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.set_size(width, height);
        }
    }

    pub(crate) fn handle_modifiers(&mut self, modifiers: ModifiersState) {
        self.input.modifiers = modifiers;
    }

    pub(crate) fn handle_key(&mut self, key: KeyCode, action: Action) {
        let mods = self.input.modifiers;
        let proceed = self
            .with_callback(|v| &mut v.on_key, |cb, v| cb(v, key, action, mods))
            .unwrap_or(true);
        if !proceed || action != Action::Press {
            return;
        }

        match key {
            KeyCode::Escape | KeyCode::KeyQ => self.close(),
            KeyCode::KeyA => self.draw_axes = !self.draw_axes,
            KeyCode::KeyW => self.wireframe = !self.wireframe,
            KeyCode::KeyC => self.cull_face = !self.cull_face,
            KeyCode::KeyO => {
                self.camera.ortho = !self.camera.ortho;
                self.camera.update_proj();
            }
            KeyCode::KeyZ => {
                self.camera.reset_view();
                self.camera.reset_proj();
            }
            KeyCode::KeyF => self.fullscreen = !self.fullscreen,
            KeyCode::KeyH => log::info!("{}", HELP),
            _ => {}
        }
    }

    pub(crate) fn handle_mouse_button(&mut self, state: ElementState, button: MouseButton) {
        self.input.mouse_input(state, button);
        let action = Action::from_winit(state, false);
        let mods = self.input.modifiers;
        let proceed = self
            .with_callback(|v| &mut v.on_mouse_button, |cb, v| cb(v, button, action, mods))
            .unwrap_or(true);
        if !proceed && action == Action::Press {
            // No drag starts from a suppressed press
            self.input.mouse_button = None;
        }
    }

    pub(crate) fn handle_cursor_moved(&mut self, x: f64, y: f64) {
        let (dx, dy) = self.input.cursor_moved(x, y);
        let proceed = self
            .with_callback(|v| &mut v.on_mouse_move, |cb, v| cb(v, x, y))
            .unwrap_or(true);
        if !proceed {
            return;
        }

        let (dx, dy) = (dx as f32, dy as f32);
        match self.input.drag() {
            Some(Drag::Rotate) => self.camera.rotate_with_mouse(dx, dy),
            Some(Drag::Roll) => self.camera.roll_with_mouse(dx, dy),
            Some(Drag::Pan) => self.camera.pan_with_mouse(dx, dy),
            None => {}
        }
    }

    pub(crate) fn handle_cursor_left(&mut self) {
        self.input.cursor_left();
    }

    pub(crate) fn handle_scroll(&mut self, dx: f64, dy: f64) {
        let proceed = self
            .with_callback(|v| &mut v.on_scroll, |cb, v| cb(v, dx, dy))
            .unwrap_or(true);
        if proceed {
            self.camera.zoom_with_mouse(dy as f32);
        }
    }
}

impl Default for Viewer {
    fn default() -> Self {
        Self::new()
    }
}
