// engine.rs
//
// Context that owns the device, the registries and the per-frame systems.
// Everything runs on the thread that created the graphics context.

use crate::asset::Assets;
use crate::error::Result;
use crate::io::AssetPaths;
use crate::renderer::batch::{BatchRenderer, FrameStats};
use crate::renderer::device::GraphicsDevice;
use crate::renderer::render_system::RenderSystem;
use crate::scene::camera::Camera;
use crate::scene::input::{InputState, WindowState};
use crate::scene::Scene;
use crate::settings::EngineSettings;
use glam::Vec4;

pub struct Engine<D: GraphicsDevice> {
    device: D,
    pub assets: Assets,
    pub scene: Scene,
    pub batches: BatchRenderer,
    pub render_system: RenderSystem,
    last_time: Option<f64>,
    frames: u64,
}

impl<D: GraphicsDevice> Engine<D> {
    /// Create the registries with their defaults. An error here leaves the
    /// engine unusable.
    pub fn new(mut device: D, settings: &EngineSettings) -> Result<Self> {
        let paths = if settings.asset_roots.is_empty() {
            AssetPaths::default()
        } else {
            AssetPaths::from_roots(&settings.asset_roots)
        };
        let assets = Assets::with_paths(&mut device, paths)?;
        let camera = Camera::from_settings(&settings.camera);

        log::info!(
            "Engine ready: {}x{}, up to {} instances per draw",
            settings.resolution.width,
            settings.resolution.height,
            settings.max_instances_per_draw
        );

        Ok(Self {
            device,
            assets,
            scene: Scene::new(),
            batches: BatchRenderer::with_max_instances(settings.max_instances_per_draw),
            render_system: RenderSystem::new(camera, Vec4::from_array(settings.clear_color)),
            last_time: None,
            frames: 0,
        })
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    /// Device plus asset registries, for loading resources between frames.
    pub fn loader(&mut self) -> (&mut D, &mut Assets) {
        (&mut self.device, &mut self.assets)
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Submit the scene and draw it. A minimized window skips the frame and
    /// reports empty stats.
    pub fn frame(&mut self, window: &dyn WindowState, input: &InputState) -> FrameStats {
        let now = window.time();
        let dt = self.last_time.map_or(0.0, |last| (now - last).max(0.0)) as f32;
        self.last_time = Some(now);

        if window.is_minimized() {
            return FrameStats::default();
        }

        let lights = self.scene.gather_lights();
        self.scene.update(&mut self.batches);
        let stats = self.render_system.render(
            &mut self.device,
            &mut self.assets,
            &mut self.batches,
            &lights,
            window.size(),
            input,
            dt,
        );

        self.frames += 1;
        log::trace!(
            "Frame {}: {} batches, {} draws, {} instances",
            self.frames,
            stats.batches,
            stats.draw_calls,
            stats.instances
        );
        stats
    }

    /// Drop all entities and pending work, then release every GPU resource.
    pub fn shutdown(&mut self) {
        self.scene.clear();
        self.batches.clean_up();
        self.assets.clean_up(&mut self.device);
        log::info!("Engine shut down after {} frames", self.frames);
    }
}
