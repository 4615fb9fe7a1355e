use gfx_engine::asset::DEFAULT_NAME;
use gfx_engine::renderer::{HeadlessDevice, Light, PointLightData, UniformValue};
use gfx_engine::scene::{InputState, Renderable, Transform, WindowState};
use gfx_engine::{Engine, EngineSettings};
use glam::{Mat4, Vec3};
use std::cell::Cell;

struct TestWindow {
    size: Cell<(u32, u32)>,
    time: Cell<f64>,
    minimized: Cell<bool>,
}

impl TestWindow {
    fn new(width: u32, height: u32) -> Self {
        Self {
            size: Cell::new((width, height)),
            time: Cell::new(0.0),
            minimized: Cell::new(false),
        }
    }

    fn advance(&self, dt: f64) {
        self.time.set(self.time.get() + dt);
    }
}

impl WindowState for TestWindow {
    fn size(&self) -> (u32, u32) {
        self.size.get()
    }

    fn time(&self) -> f64 {
        self.time.get()
    }

    fn is_open(&self) -> bool {
        true
    }

    fn is_minimized(&self) -> bool {
        self.minimized.get()
    }
}

fn engine() -> Engine<HeadlessDevice> {
    let settings = EngineSettings {
        asset_roots: vec!["does-not-exist".into()],
        ..EngineSettings::default()
    };
    let mut engine = Engine::new(HeadlessDevice::new(), &settings).unwrap();
    let mesh = engine.assets.defaults().mesh;
    let material = engine.assets.create_material("flat", DEFAULT_NAME);
    for i in 0..3 {
        engine.scene.create_entity(
            &format!("cube{i}"),
            Renderable::new(mesh, material),
            Transform::from_position(Vec3::new(i as f32, 0.0, 0.0)),
        );
    }
    engine
}

#[test]
fn projection_follows_resizes_only() {
    let mut engine = engine();
    let window = TestWindow::new(800, 600);
    let input = InputState::default();

    for _ in 0..5 {
        window.advance(1.0 / 60.0);
        engine.frame(&window, &input);
    }
    assert_eq!(engine.render_system.projection_updates(), 1);

    window.size.set((1920, 1080));
    for _ in 0..5 {
        window.advance(1.0 / 60.0);
        engine.frame(&window, &input);
    }
    assert_eq!(engine.render_system.projection_updates(), 2);
    assert_eq!(engine.render_system.camera().aspect(), 1920.0 / 1080.0);

    let writes = engine.device().uniform_writes("projection");
    let expected = Mat4::perspective_rh_gl(45f32.to_radians(), 1920.0 / 1080.0, 0.1, 100.0);
    assert!(matches!(
        writes.last(),
        Some(UniformValue::Mat4(m)) if m.abs_diff_eq(expected, 1e-6)
    ));
}

#[test]
fn each_frame_draws_the_scene_once() {
    let mut engine = engine();
    let window = TestWindow::new(800, 600);
    let input = InputState::default();

    for _ in 0..3 {
        window.advance(0.1);
        let stats = engine.frame(&window, &input);
        assert_eq!(stats.batches, 1);
        assert_eq!(stats.draw_calls, 1);
        assert_eq!(stats.instances, 3);
    }
    assert_eq!(engine.frames(), 3);
}

#[test]
fn minimized_window_skips_the_frame() {
    let mut engine = engine();
    let window = TestWindow::new(800, 600);
    window.minimized.set(true);

    let stats = engine.frame(&window, &InputState::default());
    assert_eq!(stats.draw_calls, 0);
    assert!(engine.device().commands().iter().all(|cmd| !matches!(
        cmd,
        gfx_engine::renderer::DeviceCommand::Clear { .. }
    )));
    assert_eq!(engine.frames(), 0);
}

#[test]
fn inactive_entities_are_not_drawn() {
    let mut engine = engine();
    engine.scene.set_active("cube1", false);
    let window = TestWindow::new(800, 600);

    let stats = engine.frame(&window, &InputState::default());
    assert_eq!(stats.instances, 2);
}

#[test]
fn scene_lights_reach_the_shader() {
    let mut engine = engine();
    engine.scene.add_light(
        "lamp",
        Light::Point(PointLightData {
            position: Vec3::new(0.0, 4.0, 0.0),
            color: Vec3::ONE,
            intensity: 3.0,
        }),
    );
    let window = TestWindow::new(800, 600);
    engine.frame(&window, &InputState::default());

    let device = engine.device();
    assert_eq!(device.uniform_writes("pointLightCount"), vec![UniformValue::Int(1)]);
    assert_eq!(
        device.uniform_writes("pointLights[0].position"),
        vec![UniformValue::Vec3(Vec3::new(0.0, 4.0, 0.0))]
    );
}

#[test]
fn transform_matrix_is_reused_between_frames() {
    let mut engine = engine();
    let window = TestWindow::new(800, 600);
    engine.frame(&window, &InputState::default());

    {
        let transform = engine.scene.transform_mut("cube2").unwrap();
        assert!(!transform.is_dirty());
    }

    engine
        .scene
        .transform_mut("cube2")
        .unwrap()
        .set_scale(Vec3::splat(2.0));
    assert!(engine.scene.transform_mut("cube2").unwrap().is_dirty());

    engine.frame(&window, &InputState::default());
    let mut transform = engine.scene.transform_mut("cube2").unwrap();
    assert!(!transform.is_dirty());
    let expected = Mat4::from_translation(Vec3::new(2.0, 0.0, 0.0)) * Mat4::from_scale(Vec3::splat(2.0));
    assert!(transform.model_matrix().abs_diff_eq(expected, 1e-6));

    let mut standalone = Transform::from_position(Vec3::ONE);
    let a = *standalone.model_matrix();
    let b = *standalone.model_matrix();
    assert_eq!(a.to_cols_array(), b.to_cols_array());
}

#[test]
fn shutdown_releases_gpu_resources() {
    let mut engine = engine();
    let window = TestWindow::new(800, 600);
    engine.frame(&window, &InputState::default());
    engine.shutdown();

    let device = engine.device();
    assert_eq!(device.live_buffers(), 0);
    assert_eq!(device.live_textures(), 0);
    assert_eq!(device.live_programs(), 0);
    assert_eq!(device.live_vertex_arrays(), 0);
    assert_eq!(engine.scene.entity_count(), 0);
}
