use winit::event::{ElementState, MouseButton};
use winit::keyboard::ModifiersState;

/// Key / button transition passed to input callbacks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Press,
    Release,
    Repeat,
}

impl Action {
    pub fn from_winit(state: ElementState, repeat: bool) -> Self {
        match (state, repeat) {
            (ElementState::Pressed, false) => Action::Press,
            (ElementState::Pressed, true) => Action::Repeat,
            (ElementState::Released, _) => Action::Release,
        }
    }

    /// Press or repeat
    pub fn is_down(self) -> bool {
        !matches!(self, Action::Release)
    }
}

/// Camera motion produced by dragging with the current button and modifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Drag {
    Rotate,
    Roll,
    Pan,
}

/// Pointer and modifier state tracked across window events
#[derive(Debug, Clone, Default)]
pub struct InputState {
    /// Cursor position in physical pixels
    pub cursor: (f64, f64),
    prev_cursor: Option<(f64, f64)>,
    /// Button currently held, if any
    pub mouse_button: Option<MouseButton>,
    pub modifiers: ModifiersState,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new cursor position and return the motion since the last one
    pub fn cursor_moved(&mut self, x: f64, y: f64) -> (f64, f64) {
        let delta = match self.prev_cursor {
            Some((px, py)) => (x - px, y - py),
            None => (0.0, 0.0),
        };
        self.prev_cursor = Some((x, y));
        self.cursor = (x, y);
        delta
    }

    pub fn cursor_left(&mut self) {
        self.prev_cursor = None;
    }

    pub fn mouse_input(&mut self, state: ElementState, button: MouseButton) {
        match state {
            ElementState::Pressed => self.mouse_button = Some(button),
            ElementState::Released if self.mouse_button == Some(button) => self.mouse_button = None,
            ElementState::Released => {}
        }
    }

    /// Which camera motion a drag maps to, following the default bindings
    pub fn drag(&self) -> Option<Drag> {
        match self.mouse_button? {
            MouseButton::Left if self.modifiers.shift_key() => Some(Drag::Pan),
            MouseButton::Left if self.modifiers.control_key() => Some(Drag::Roll),
            MouseButton::Left => Some(Drag::Rotate),
            MouseButton::Right | MouseButton::Middle => Some(Drag::Pan),
            _ => None,
        }
    }
}

/// Printed by the help key
pub const HELP: &str = "\
meshview controls:
  left drag            rotate
  ctrl + left drag     roll
  right / middle drag  pan (also shift + left drag)
  scroll               zoom
  A  toggle axes
  W  toggle wireframe
  C  toggle back-face culling
  O  toggle orthographic projection
  Z  reset camera
  F  toggle fullscreen
  H  show this help
  Esc / Q  quit";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_from_winit() {
        assert_eq!(Action::from_winit(ElementState::Pressed, false), Action::Press);
        assert_eq!(Action::from_winit(ElementState::Pressed, true), Action::Repeat);
        assert_eq!(Action::from_winit(ElementState::Released, true), Action::Release);
        assert!(Action::Repeat.is_down());
        assert!(!Action::Release.is_down());
    }

    #[test]
    fn test_first_cursor_move_has_no_delta() {
        let mut input = InputState::new();
        assert_eq!(input.cursor_moved(10.0, 20.0), (0.0, 0.0));
        assert_eq!(input.cursor_moved(13.0, 18.0), (3.0, -2.0));
        input.cursor_left();
        assert_eq!(input.cursor_moved(0.0, 0.0), (0.0, 0.0));
    }

    #[test]
    fn test_drag_modes() {
        let mut input = InputState::new();
        assert_eq!(input.drag(), None);

        input.mouse_input(ElementState::Pressed, MouseButton::Left);
        assert_eq!(input.drag(), Some(Drag::Rotate));
        input.modifiers = ModifiersState::CONTROL;
        assert_eq!(input.drag(), Some(Drag::Roll));
        input.modifiers = ModifiersState::SHIFT;
        assert_eq!(input.drag(), Some(Drag::Pan));

        input.mouse_input(ElementState::Released, MouseButton::Left);
        assert_eq!(input.drag(), None);
        input.mouse_input(ElementState::Pressed, MouseButton::Middle);
        assert_eq!(input.drag(), Some(Drag::Pan));
    }

    #[test]
    fn test_release_of_other_button_keeps_held() {
        let mut input = InputState::new();
        input.mouse_input(ElementState::Pressed, MouseButton::Right);
        input.mouse_input(ElementState::Released, MouseButton::Left);
        assert_eq!(input.mouse_button, Some(MouseButton::Right));
    }
}
