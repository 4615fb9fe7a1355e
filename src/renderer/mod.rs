pub mod batch;
pub mod device;
pub mod headless;
pub mod lights;
pub mod primitives;
pub mod render_system;
pub mod vertex;

pub use batch::{BatchGroup, BatchKey, BatchRenderer, FrameStats, FrameUniforms};
pub use device::{ClearFlags, GraphicsDevice, PixelFormat, TextureDesc, UniformValue};
pub use headless::{DeviceCommand, DrawCall, HeadlessDevice};
pub use lights::{DirectionalLightData, Light, LightsData, PointLightData};
pub use primitives::{cube_mesh, quad_mesh};
pub use render_system::RenderSystem;
pub use vertex::{InstanceRaw, Vertex};
