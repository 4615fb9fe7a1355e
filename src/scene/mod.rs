// scene/mod.rs

pub mod camera;
pub mod components;
pub mod input;
pub mod scene;
pub mod transform;

// Re-export commonly used types
pub use camera::Camera;
pub use components::{Active, Name, Renderable, Tint};
pub use input::{CursorMode, InputState, MovementKeys, WindowState};
pub use scene::{Scene, SceneLight};
pub use transform::Transform;
