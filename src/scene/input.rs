// scene/input.rs
//
// Snapshot types handed in by the windowing layer once per frame.

use bitflags::bitflags;
use glam::Vec2;

bitflags! {
    /// Held movement keys, W/S/A/D/Q/E on a default layout.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct MovementKeys: u8 {
        const FORWARD = 1 << 0;
        const BACK = 1 << 1;
        const LEFT = 1 << 2;
        const RIGHT = 1 << 3;
        const DOWN = 1 << 4;
        const UP = 1 << 5;
    }
}

impl MovementKeys {
    pub fn from_key(key: char) -> Self {
        match key.to_ascii_lowercase() {
            'w' => Self::FORWARD,
            's' => Self::BACK,
            'a' => Self::LEFT,
            'd' => Self::RIGHT,
            'q' => Self::DOWN,
            'e' => Self::UP,
            _ => Self::empty(),
        }
    }
}

/// Whether the pointer steers the camera or is free for the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorMode {
    #[default]
    Camera,
    Ui,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InputState {
    pub keys: MovementKeys,
    /// Pointer motion since the previous frame, in pixels.
    pub mouse_delta: Vec2,
    /// Wheel steps since the previous frame, positive away from the user.
    pub scroll: f32,
    pub cursor_mode: CursorMode,
}

impl InputState {
    pub fn is_camera_mode(&self) -> bool {
        self.cursor_mode == CursorMode::Camera
    }
}

pub trait WindowState {
    /// Framebuffer size in pixels.
    fn size(&self) -> (u32, u32);
    /// Monotonic seconds since start.
    fn time(&self) -> f64;
    fn is_open(&self) -> bool;
    fn is_minimized(&self) -> bool;
}
