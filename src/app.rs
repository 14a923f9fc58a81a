use std::sync::Arc;

use anyhow::anyhow;
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::PhysicalKey,
    window::{Fullscreen, Window, WindowId},
};

use crate::input::Action;
use crate::renderer::Renderer;
use crate::viewer::Viewer;

/// Pixels per scroll line for touchpads reporting pixel deltas
const PIXELS_PER_LINE: f64 = 40.0;

/// Open a window for `viewer` and run the event loop until it closes
pub(crate) fn run(viewer: &mut Viewer) -> anyhow::Result<()> {
    let event_loop = EventLoop::new()?;
    let mut app = App::new(viewer);
    event_loop.run_app(&mut app)?;
    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

struct App<'a> {
    viewer: &'a mut Viewer,
    window: Option<Arc<Window>>,
    renderer: Option<Renderer>,
    error: Option<anyhow::Error>,
    // Window state last applied, to sync with the viewer's fields
    fullscreen: bool,
    title: String,
}

impl<'a> App<'a> {
    fn new(viewer: &'a mut Viewer) -> Self {
        let title = viewer.title.clone();
        Self {
            viewer,
            window: None,
            renderer: None,
            error: None,
            fullscreen: false,
            title,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        log::error!("{:#}", error);
        self.error = Some(error);
        event_loop.exit();
    }

    fn sync_window(&mut self) {
        let Some(window) = &self.window else { return };
        if self.viewer.fullscreen != self.fullscreen {
            self.fullscreen = self.viewer.fullscreen;
            window.set_fullscreen(self.fullscreen.then_some(Fullscreen::Borderless(None)));
        }
        if self.viewer.title != self.title {
            self.title = self.viewer.title.clone();
            window.set_title(&self.title);
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        self.viewer.begin_frame();
        self.sync_window();

        let (Some(renderer), Some(window)) = (&mut self.renderer, &self.window) else {
            return;
        };
        match renderer.render(self.viewer, window) {
            Ok(true) => window.request_redraw(),
            Ok(false) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                renderer.resize(renderer.size());
                window.request_redraw();
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                self.fail(event_loop, anyhow!("Render error: out of GPU memory"));
            }
            Err(e) => log::warn!("Render error: {}", e),
        }
    }

    /// Route input to the viewer; returns false for events it ignores
    fn handle_input(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(code) = event.physical_key {
                    self.viewer
                        .handle_key(code, Action::from_winit(event.state, event.repeat));
                }
            }
            WindowEvent::ModifiersChanged(modifiers) => {
                self.viewer.handle_modifiers(modifiers.state());
            }
            WindowEvent::MouseInput { state, button, .. } => {
                self.viewer.handle_mouse_button(*state, *button);
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.viewer.handle_cursor_moved(position.x, position.y);
            }
            WindowEvent::CursorLeft { .. } => self.viewer.handle_cursor_left(),
            WindowEvent::MouseWheel { delta, .. } => {
                let (dx, dy) = match delta {
                    MouseScrollDelta::LineDelta(x, y) => (*x as f64, *y as f64),
                    MouseScrollDelta::PixelDelta(p) => (p.x / PIXELS_PER_LINE, p.y / PIXELS_PER_LINE),
                };
                self.viewer.handle_scroll(dx, dy);
            }
            _ => return false,
        }
        true
    }
}

impl ApplicationHandler for App<'_> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attributes = Window::default_attributes()
            .with_title(self.viewer.title.as_str())
            .with_inner_size(winit::dpi::PhysicalSize::new(
                self.viewer.width(),
                self.viewer.height(),
            ));
        let window = match event_loop.create_window(attributes) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                self.fail(event_loop, anyhow!("Failed to create window: {}", e));
                return;
            }
        };

        let renderer = match pollster::block_on(Renderer::new(window.clone())) {
            Ok(r) => r,
            Err(e) => {
                self.fail(event_loop, e.context("Failed to initialize renderer"));
                return;
            }
        };

        let size = window.inner_size();
        self.viewer.handle_resize(size.width, size.height);
        self.title = self.viewer.title.clone();
        self.window = Some(window);
        self.renderer = Some(renderer);

        self.viewer.run_open();
        self.sync_window();
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        // Let egui see the event first
        let mut consumed = false;
        if let (Some(renderer), Some(window)) = (&mut self.renderer, &self.window) {
            let response = renderer.handle_event(window, &event);
            if response.repaint {
                window.request_redraw();
            }
            consumed = response.consumed;
        }

        match event {
            WindowEvent::CloseRequested => self.viewer.close(),
            WindowEvent::Resized(size) => {
                if let Some(renderer) = &mut self.renderer {
                    renderer.resize(size);
                }
                self.viewer.handle_resize(size.width, size.height);
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            ref other if !consumed => {
                if self.handle_input(other) {
                    if let Some(window) = &self.window {
                        window.request_redraw();
                    }
                }
            }
            _ => {}
        }

        if self.viewer.close_requested() {
            event_loop.exit();
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.viewer.loop_wait_events {
            event_loop.set_control_flow(ControlFlow::Wait);
        } else {
            event_loop.set_control_flow(ControlFlow::Poll);
            if let Some(window) = &self.window {
                window.request_redraw();
            }
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            self.viewer.run_close();
        }
        // GPU handles must go before the device and surface they came from
        self.viewer.release_gpu();
        self.renderer = None;
        self.window = None;
    }
}
