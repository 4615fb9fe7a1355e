use super::input::{InputState, MovementKeys};
use super::transform::Transform;
use crate::settings::CameraSettings;
use glam::{Mat4, Vec2, Vec3};

pub const PITCH_LIMIT: f32 = 89.0;
pub const MIN_ZOOM: f32 = 1.0;
pub const MAX_ZOOM: f32 = 90.0;
const ZOOM_STEP: f32 = 2.5;

/// Free-fly camera. View and projection are rebuilt lazily, each behind its
/// own dirty flag.
#[derive(Clone, Debug)]
pub struct Camera {
    position: Vec3,
    front: Vec3,
    up: Vec3,
    right: Vec3,
    world_up: Vec3,
    yaw: f32,
    pitch: f32,
    zoom: f32,
    fov: f32,
    aspect: f32,
    near: f32,
    far: f32,
    pub move_speed: f32,
    pub mouse_sensitivity: f32,
    transform: Transform,
    view: Mat4,
    projection: Mat4,
    view_dirty: bool,
    projection_dirty: bool,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 0.5, 3.0), -90.0, 0.0)
    }
}

impl Camera {
    pub fn new(position: Vec3, yaw: f32, pitch: f32) -> Self {
        let mut camera = Self {
            position,
            front: Vec3::NEG_Z,
            up: Vec3::Y,
            right: Vec3::X,
            world_up: Vec3::Y,
            yaw,
            pitch: pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT),
            zoom: 45.0,
            fov: 45.0,
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 100.0,
            move_speed: 0.65,
            mouse_sensitivity: 0.1,
            transform: Transform::from_position(position),
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            view_dirty: true,
            projection_dirty: true,
        };
        camera.update_vectors();
        camera
    }

    pub fn from_settings(settings: &CameraSettings) -> Self {
        let mut camera = Self::new(Vec3::from_array(settings.position), settings.yaw, settings.pitch);
        camera.move_speed = settings.move_speed;
        camera.mouse_sensitivity = settings.mouse_sensitivity;
        camera.set_projection(settings.fov, camera.aspect, settings.near, settings.far);
        camera
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn front(&self) -> Vec3 {
        self.front
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    pub fn right(&self) -> Vec3 {
        self.right
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn fov(&self) -> f32 {
        self.fov
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn near(&self) -> f32 {
        self.near
    }

    pub fn far(&self) -> f32 {
        self.far
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.transform.set_position(position);
        self.view_dirty = true;
    }

    /// Field of view in degrees, clamped to the zoom range.
    pub fn set_projection(&mut self, fov: f32, aspect: f32, near: f32, far: f32) {
        self.fov = fov.clamp(MIN_ZOOM, MAX_ZOOM);
        self.zoom = self.fov;
        self.aspect = aspect;
        self.near = near;
        self.far = far;
        self.projection_dirty = true;
    }

    /// Aspect from a framebuffer size. A zero height counts as one pixel.
    /// Zoom and fov are left untouched.
    pub fn update_aspect(&mut self, width: u32, height: u32) {
        let height = height.max(1) as f32;
        self.aspect = width as f32 / height;
        self.projection_dirty = true;
    }

    pub fn process_keyboard(&mut self, keys: MovementKeys, dt: f32) {
        let velocity = self.move_speed * dt;
        let mut offset = Vec3::ZERO;
        if keys.contains(MovementKeys::FORWARD) {
            offset += self.front;
        }
        if keys.contains(MovementKeys::BACK) {
            offset -= self.front;
        }
        if keys.contains(MovementKeys::LEFT) {
            offset -= self.right;
        }
        if keys.contains(MovementKeys::RIGHT) {
            offset += self.right;
        }
        if keys.contains(MovementKeys::DOWN) {
            offset -= self.up;
        }
        if keys.contains(MovementKeys::UP) {
            offset += self.up;
        }

        if offset != Vec3::ZERO {
            self.set_position(self.position + offset * velocity);
        }
    }

    pub fn process_mouse(&mut self, delta: Vec2) {
        if delta == Vec2::ZERO {
            return;
        }
        self.yaw += delta.x * self.mouse_sensitivity;
        self.pitch = (self.pitch - delta.y * self.mouse_sensitivity).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.update_vectors();
    }

    /// Wheel away from the user zooms in.
    pub fn process_scroll(&mut self, scroll: f32) {
        if scroll == 0.0 {
            return;
        }
        self.zoom = (self.zoom - ZOOM_STEP * scroll.signum()).clamp(MIN_ZOOM, MAX_ZOOM);
        self.projection_dirty = true;
    }

    pub fn update(&mut self, input: &InputState, dt: f32) {
        self.process_mouse(input.mouse_delta);
        self.process_keyboard(input.keys, dt);
        self.process_scroll(input.scroll);
    }

    pub fn view_matrix(&mut self) -> &Mat4 {
        if self.view_dirty {
            self.view = Mat4::look_at_rh(self.position, self.position + self.front, self.up);
            self.view_dirty = false;
        }
        &self.view
    }

    pub fn projection_matrix(&mut self) -> &Mat4 {
        if self.projection_dirty {
            self.projection =
                Mat4::perspective_rh_gl(self.zoom.to_radians(), self.aspect, self.near, self.far);
            self.projection_dirty = false;
        }
        &self.projection
    }

    pub fn is_view_dirty(&self) -> bool {
        self.view_dirty
    }

    pub fn is_projection_dirty(&self) -> bool {
        self.projection_dirty
    }

    fn update_vectors(&mut self) {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        self.front = Vec3::new(yaw.cos() * pitch.cos(), pitch.sin(), yaw.sin() * pitch.cos()).normalize();
        self.right = self.front.cross(self.world_up).normalize();
        self.up = self.right.cross(self.front).normalize();
        self.transform.set_rotation(Vec3::new(self.pitch, self.yaw, 0.0));
        self.view_dirty = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_looks_down_negative_z() {
        let camera = Camera::default();
        assert!(camera.front().abs_diff_eq(Vec3::NEG_Z, 1e-6));
        assert!(camera.right().abs_diff_eq(Vec3::X, 1e-6));
    }

    #[test]
    fn pitch_is_clamped() {
        let mut camera = Camera::default();
        camera.process_mouse(Vec2::new(0.0, -10_000.0));
        assert_eq!(camera.pitch(), PITCH_LIMIT);
        camera.process_mouse(Vec2::new(0.0, 10_000.0));
        assert_eq!(camera.pitch(), -PITCH_LIMIT);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut camera = Camera::default();
        for _ in 0..100 {
            camera.process_scroll(1.0);
        }
        assert_eq!(camera.zoom(), MIN_ZOOM);
        for _ in 0..100 {
            camera.process_scroll(-1.0);
        }
        assert_eq!(camera.zoom(), MAX_ZOOM);
    }

    #[test]
    fn view_is_cached_until_moved() {
        let mut camera = Camera::default();
        let first = *camera.view_matrix();
        assert!(!camera.is_view_dirty());
        assert_eq!(*camera.view_matrix(), first);

        camera.process_keyboard(MovementKeys::FORWARD, 1.0);
        assert!(camera.is_view_dirty());
        assert_ne!(*camera.view_matrix(), first);
        assert!(camera
            .position()
            .abs_diff_eq(Vec3::new(0.0, 0.5, 3.0 - 0.65), 1e-5));
        assert!(camera.transform().position().abs_diff_eq(camera.position(), 1e-6));
    }

    #[test]
    fn zero_height_resize_is_safe() {
        let mut camera = Camera::default();
        camera.update_aspect(800, 0);
        assert_eq!(camera.aspect(), 800.0);
        assert!(camera.projection_matrix().is_finite());
    }

    #[test]
    fn resize_keeps_scroll_zoom() {
        let mut camera = Camera::default();
        for _ in 0..4 {
            camera.process_scroll(1.0);
        }
        let zoomed = camera.zoom();
        assert!(zoomed < 45.0);

        camera.update_aspect(1920, 1080);
        assert_eq!(camera.zoom(), zoomed);
        assert_eq!(camera.fov(), 45.0);
        assert!(camera.is_projection_dirty());
        assert!((camera.aspect() - 1920.0 / 1080.0).abs() < 1e-6);
    }
}
