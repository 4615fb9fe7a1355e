use gfx_engine::asset::DEFAULT_NAME;
use gfx_engine::error::exit_fatal;
use gfx_engine::renderer::{DirectionalLightData, HeadlessDevice, Light, PointLightData};
use gfx_engine::scene::{InputState, MovementKeys, Renderable, Transform, WindowState};
use gfx_engine::{Engine, EngineSettings};
use glam::{Vec3, Vec4};
use instant::Instant;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

const GRID: i32 = 40;
const FRAMES: u32 = 120;

/// Window stand-in driven by a real clock.
struct HeadlessWindow {
    start: Instant,
    size: (u32, u32),
}

impl WindowState for HeadlessWindow {
    fn size(&self) -> (u32, u32) {
        self.size
    }

    fn time(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }

    fn is_open(&self) -> bool {
        true
    }

    fn is_minimized(&self) -> bool {
        false
    }
}

fn main() {
    gfx_engine::init_logging();

    let settings = EngineSettings::load();
    let mut engine = match Engine::new(HeadlessDevice::new(), &settings) {
        Ok(engine) => engine,
        Err(err) => exit_fatal(&err),
    };

    let (device, assets) = engine.loader();
    let cube = assets.load_mesh(device, "cube", "cube.gltf");
    let checker = assets.load_texture(device, "crate", "crate.png");
    let flat = assets.create_material("flat", DEFAULT_NAME);
    let textured = assets.create_material("textured", DEFAULT_NAME);
    if let Some(material) = assets.materials.get_mut(textured) {
        material.set_int("useTexture", 1);
    }

    engine.scene.add_light(
        "sun",
        Light::Directional(DirectionalLightData {
            direction: Vec3::new(-0.3, -1.0, -0.2),
            color: Vec3::ONE,
            intensity: 0.9,
        }),
    );
    engine.scene.add_light(
        "lamp",
        Light::Point(PointLightData {
            position: Vec3::new(0.0, 3.0, 0.0),
            color: Vec3::new(1.0, 0.8, 0.6),
            intensity: 2.0,
        }),
    );

    let mut rng = SmallRng::seed_from_u64(7);
    for x in -GRID / 2..GRID / 2 {
        for z in -GRID / 2..GRID / 2 {
            let name = format!("cube_{x}_{z}");
            let renderable = if rng.gen_bool(0.25) {
                Renderable::new(cube, textured).with_texture(checker)
            } else {
                Renderable::new(cube, flat)
            };
            let transform = Transform::new(
                Vec3::new(x as f32 * 1.5, 0.0, z as f32 * 1.5),
                Vec3::new(0.0, rng.gen_range(0.0..360.0), 0.0),
                Vec3::splat(rng.gen_range(0.5..1.0)),
            );
            engine.scene.create_entity(&name, renderable, transform);
            engine
                .scene
                .set_tint(&name, Vec4::new(rng.gen(), rng.gen(), rng.gen(), 1.0));
        }
    }

    let window = HeadlessWindow {
        start: Instant::now(),
        size: (settings.resolution.width, settings.resolution.height),
    };
    let input = InputState {
        keys: MovementKeys::BACK,
        ..InputState::default()
    };

    let mut total_draws = 0;
    for frame in 0..FRAMES {
        if let Some(mut spinner) = engine.scene.transform_mut("cube_0_0") {
            spinner.set_rotation(Vec3::new(0.0, frame as f32 * 3.0, 0.0));
        }

        let stats = engine.frame(&window, &input);
        total_draws += stats.draw_calls;
        if frame % 30 == 0 {
            log::info!(
                "Frame {}: {} batches, {} draw calls, {} instances",
                frame,
                stats.batches,
                stats.draw_calls,
                stats.instances
            );
        }
        engine.device_mut().take_commands();
    }

    log::info!(
        "Rendered {} frames with {} draw calls, camera at {:?}",
        engine.frames(),
        total_draws,
        engine.render_system.camera().position()
    );
    engine.shutdown();
}
