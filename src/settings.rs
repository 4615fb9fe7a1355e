use crate::renderer::batch::DEFAULT_MAX_INSTANCES_PER_DRAW;
use crate::scene::camera::{MAX_ZOOM, MIN_ZOOM};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSettings {
    #[serde(default)]
    pub resolution: Resolution,
    #[serde(default = "EngineSettings::default_clear_color")]
    pub clear_color: [f32; 4],
    #[serde(default = "EngineSettings::default_max_instances_per_draw")]
    pub max_instances_per_draw: usize,
    /// Directories holding `Models/`, `Textures/` and `Shaders/`. Empty means
    /// the usual `Assets` folders around the working directory.
    #[serde(default)]
    pub asset_roots: Vec<PathBuf>,
    #[serde(default)]
    pub camera: CameraSettings,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            resolution: Resolution::default(),
            clear_color: Self::default_clear_color(),
            max_instances_per_draw: Self::default_max_instances_per_draw(),
            asset_roots: Vec::new(),
            camera: CameraSettings::default(),
        }
    }
}

impl EngineSettings {
    pub fn load() -> Self {
        Self::load_from_path("settings.json")
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Self {
        use std::fs;

        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str::<EngineSettings>(&contents) {
                Ok(settings) => {
                    info!("Loaded engine settings from {:?}", path);
                    settings.validate()
                }
                Err(err) => {
                    warn!(
                        "Failed to parse {:?} ({}). Falling back to default engine settings.",
                        path, err
                    );
                    EngineSettings::default()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                info!(
                    "Engine settings file {:?} not found. Using default settings.",
                    path
                );
                EngineSettings::default()
            }
            Err(err) => {
                warn!(
                    "Failed to read {:?} ({}). Falling back to default engine settings.",
                    path, err
                );
                EngineSettings::default()
            }
        }
    }

    fn validate(mut self) -> Self {
        if self.resolution.width == 0 || self.resolution.height == 0 {
            warn!("Resolution must be greater than zero. Using default resolution.");
            self.resolution = Resolution::default();
        }

        if self.max_instances_per_draw == 0 {
            warn!("max_instances_per_draw must be greater than zero. Using default value.");
            self.max_instances_per_draw = Self::default_max_instances_per_draw();
        }

        if self.clear_color.iter().any(|c| !c.is_finite()) {
            warn!("Clear color must be finite. Using default clear color.");
            self.clear_color = Self::default_clear_color();
        }

        self.camera = self.camera.validate();
        self
    }

    fn default_clear_color() -> [f32; 4] {
        [0.1, 0.1, 0.1, 1.0]
    }

    fn default_max_instances_per_draw() -> usize {
        DEFAULT_MAX_INSTANCES_PER_DRAW
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Default for Resolution {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    pub position: [f32; 3],
    pub yaw: f32,
    pub pitch: f32,
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    pub move_speed: f32,
    pub mouse_sensitivity: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            position: [0.0, 0.5, 3.0],
            yaw: -90.0,
            pitch: 0.0,
            fov: 45.0,
            near: 0.1,
            far: 100.0,
            move_speed: 0.65,
            mouse_sensitivity: 0.1,
        }
    }
}

impl CameraSettings {
    fn validate(mut self) -> Self {
        let defaults = Self::default();

        if !(MIN_ZOOM..=MAX_ZOOM).contains(&self.fov) {
            warn!(
                "Camera fov must be within [{}, {}]. Using default fov.",
                MIN_ZOOM, MAX_ZOOM
            );
            self.fov = defaults.fov;
        }

        if !(self.near > 0.0 && self.far > self.near) {
            warn!("Camera clip planes must satisfy 0 < near < far. Using default planes.");
            self.near = defaults.near;
            self.far = defaults.far;
        }

        if self.move_speed < 0.0 || self.mouse_sensitivity < 0.0 {
            warn!("Camera speeds must not be negative. Using default speeds.");
            self.move_speed = defaults.move_speed;
            self.mouse_sensitivity = defaults.mouse_sensitivity;
        }

        self
    }
}
