// renderer/render_system.rs
//
// Per-frame driver: clears the targets, keeps the camera projection in step
// with the window and flushes the batch renderer.

use super::batch::{BatchRenderer, FrameStats, FrameUniforms};
use super::device::{ClearFlags, GraphicsDevice};
use super::lights::LightsData;
use crate::asset::Assets;
use crate::scene::camera::Camera;
use crate::scene::input::InputState;
use glam::Vec4;

pub struct RenderSystem {
    camera: Camera,
    clear_color: Vec4,
    last_size: Option<(u32, u32)>,
    projection_updates: u64,
}

impl RenderSystem {
    pub fn new(camera: Camera, clear_color: Vec4) -> Self {
        Self {
            camera,
            clear_color,
            last_size: None,
            projection_updates: 0,
        }
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn set_camera(&mut self, camera: Camera) {
        self.camera = camera;
        self.last_size = None;
    }

    pub fn clear_color(&self) -> Vec4 {
        self.clear_color
    }

    pub fn set_clear_color(&mut self, color: Vec4) {
        self.clear_color = color;
    }

    /// How many times the window size forced a projection rebuild.
    pub fn projection_updates(&self) -> u64 {
        self.projection_updates
    }

    /// Rebuild the projection aspect only when the framebuffer size changed.
    pub fn handle_resize(&mut self, size: (u32, u32)) {
        if self.last_size == Some(size) {
            return;
        }
        log::debug!("Framebuffer is now {}x{}", size.0, size.1);
        self.camera.update_aspect(size.0, size.1);
        self.last_size = Some(size);
        self.projection_updates += 1;
    }

    #[allow(clippy::too_many_arguments)]
    pub fn render(
        &mut self,
        device: &mut dyn GraphicsDevice,
        assets: &mut Assets,
        batches: &mut BatchRenderer,
        lights: &LightsData,
        size: (u32, u32),
        input: &InputState,
        dt: f32,
    ) -> FrameStats {
        device.clear(self.clear_color, ClearFlags::COLOR | ClearFlags::DEPTH);

        self.handle_resize(size);
        if input.is_camera_mode() {
            self.camera.update(input, dt);
        }

        let frame = FrameUniforms {
            view: *self.camera.view_matrix(),
            projection: *self.camera.projection_matrix(),
            camera_position: self.camera.position(),
            lights,
        };
        batches.render(device, assets, &frame)
    }
}

impl Default for RenderSystem {
    fn default() -> Self {
        Self::new(Camera::default(), Vec4::new(0.1, 0.1, 0.1, 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::AssetPaths;
    use crate::renderer::headless::{DeviceCommand, HeadlessDevice};
    use crate::scene::input::{CursorMode, MovementKeys};

    fn setup() -> (HeadlessDevice, Assets, BatchRenderer) {
        let mut device = HeadlessDevice::new();
        let assets = Assets::with_paths(&mut device, AssetPaths::from_roots(&[])).unwrap();
        (device, assets, BatchRenderer::new())
    }

    #[test]
    fn projection_only_recomputed_on_resize() {
        let (mut device, mut assets, mut batches) = setup();
        let mut system = RenderSystem::default();
        let lights = LightsData::new();
        let input = InputState::default();

        for size in [(800, 600), (800, 600), (800, 600), (1024, 768), (1024, 768)] {
            system.render(&mut device, &mut assets, &mut batches, &lights, size, &input, 0.016);
        }
        assert_eq!(system.projection_updates(), 2);
        assert_eq!(system.camera().aspect(), 1024.0 / 768.0);
    }

    #[test]
    fn every_frame_clears_color_and_depth() {
        let (mut device, mut assets, mut batches) = setup();
        let mut system = RenderSystem::default();
        device.take_commands();
        system.render(
            &mut device,
            &mut assets,
            &mut batches,
            &LightsData::new(),
            (640, 480),
            &InputState::default(),
            0.0,
        );
        assert!(matches!(
            device.commands().first(),
            Some(DeviceCommand::Clear { flags, .. }) if *flags == ClearFlags::COLOR | ClearFlags::DEPTH
        ));
    }

    #[test]
    fn ui_mode_freezes_the_camera() {
        let (mut device, mut assets, mut batches) = setup();
        let mut system = RenderSystem::default();
        let start = system.camera().position();
        let input = InputState {
            keys: MovementKeys::FORWARD,
            cursor_mode: CursorMode::Ui,
            ..InputState::default()
        };

        system.render(&mut device, &mut assets, &mut batches, &LightsData::new(), (640, 480), &input, 1.0);
        assert_eq!(system.camera().position(), start);
    }
}
