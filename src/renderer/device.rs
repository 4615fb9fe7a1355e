// renderer/device.rs
//
// Boundary to the immediate-mode graphics API. Every call must come from the
// thread that owns the graphics context.

use super::vertex::Vertex;
use bitflags::bitflags;
use glam::{Mat4, Vec2, Vec3, Vec4};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexArrayId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UniformLocation(pub i32);

/// GPU objects backing one mesh: the vertex array plus its buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexArray {
    pub id: VertexArrayId,
    pub vertex_buffer: BufferId,
    pub index_buffer: Option<BufferId>,
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ClearFlags: u32 {
        const COLOR = 1 << 0;
        const DEPTH = 1 << 1;
    }
}

/// Value pushed to a named shader uniform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Int(i32),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    Mat4(Mat4),
}

impl UniformValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            UniformValue::Float(_) => "float",
            UniformValue::Int(_) => "int",
            UniformValue::Vec2(_) => "vec2",
            UniformValue::Vec3(_) => "vec3",
            UniformValue::Vec4(_) => "vec4",
            UniformValue::Mat4(_) => "mat4",
        }
    }
}

impl From<f32> for UniformValue {
    fn from(value: f32) -> Self {
        Self::Float(value)
    }
}

impl From<i32> for UniformValue {
    fn from(value: i32) -> Self {
        Self::Int(value)
    }
}

impl From<Vec2> for UniformValue {
    fn from(value: Vec2) -> Self {
        Self::Vec2(value)
    }
}

impl From<Vec3> for UniformValue {
    fn from(value: Vec3) -> Self {
        Self::Vec3(value)
    }
}

impl From<Vec4> for UniformValue {
    fn from(value: Vec4) -> Self {
        Self::Vec4(value)
    }
}

impl From<Mat4> for UniformValue {
    fn from(value: Mat4) -> Self {
        Self::Mat4(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    R8,
    Rgb8,
    Rgba8,
}

impl PixelFormat {
    pub fn from_channels(channels: u8) -> Option<Self> {
        match channels {
            1 => Some(Self::R8),
            3 => Some(Self::Rgb8),
            4 => Some(Self::Rgba8),
            _ => None,
        }
    }

    pub fn channels(self) -> u8 {
        match self {
            Self::R8 => 1,
            Self::Rgb8 => 3,
            Self::Rgba8 => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WrapMode {
    Repeat,
    ClampToEdge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterMode {
    Nearest,
    Linear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureDesc {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub generate_mips: bool,
    pub wrap: WrapMode,
    pub filter: FilterMode,
}

impl TextureDesc {
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Self {
        Self {
            width,
            height,
            format,
            generate_mips: false,
            wrap: WrapMode::Repeat,
            filter: FilterMode::Linear,
        }
    }

    pub fn byte_len(&self) -> usize {
        self.width as usize * self.height as usize * self.format.channels() as usize
    }
}

pub trait GraphicsDevice {
    /// Upload vertex (and optional index) data and describe the per-vertex
    /// attribute layout of [`Vertex`].
    fn create_vertex_array(&mut self, vertices: &[Vertex], indices: &[u32]) -> VertexArray;
    fn delete_vertex_array(&mut self, vertex_array: &VertexArray);

    /// Allocate a dynamic buffer of `byte_capacity` bytes and attach it to
    /// `vertex_array` as the per-instance attribute stream.
    fn create_instance_buffer(&mut self, vertex_array: VertexArrayId, byte_capacity: usize) -> BufferId;
    /// Overwrite `data.len()` bytes starting at `offset` without reallocating.
    fn write_buffer(&mut self, buffer: BufferId, offset: usize, data: &[u8]);
    fn delete_buffer(&mut self, buffer: BufferId);

    fn create_texture(&mut self, desc: &TextureDesc, pixels: Option<&[u8]>) -> TextureId;
    fn delete_texture(&mut self, texture: TextureId);
    fn bind_texture(&mut self, texture: TextureId, unit: u32);
    fn unbind_texture(&mut self, unit: u32);

    fn create_program(&mut self, vertex_src: &str, fragment_src: &str) -> Result<ProgramId, String>;
    fn delete_program(&mut self, program: ProgramId);
    fn use_program(&mut self, program: Option<ProgramId>);
    fn uniform_location(&mut self, program: ProgramId, name: &str) -> Option<UniformLocation>;
    /// Applies to the program currently in use.
    fn set_uniform(&mut self, location: UniformLocation, value: &UniformValue);

    fn bind_vertex_array(&mut self, vertex_array: Option<VertexArrayId>);
    fn draw_arrays_instanced(&mut self, vertex_count: u32, instance_count: u32);
    fn draw_elements_instanced(&mut self, index_count: u32, instance_count: u32);

    fn clear(&mut self, color: Vec4, flags: ClearFlags);
}
