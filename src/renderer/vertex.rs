use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec4};
use std::mem;

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable, Debug, PartialEq)]
pub struct Vertex {
    pub pos: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    pub const STRIDE: usize = mem::size_of::<Vertex>();
}

#[inline]
pub fn v(pos: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Vertex {
    Vertex { pos, normal, uv }
}

/// Per-instance record as laid out in the instance buffer. The shaders read
/// the model matrix columns at attribute slots 3..=6 and the tint at 7.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable, Debug, PartialEq)]
pub struct InstanceRaw {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
}

impl InstanceRaw {
    pub const STRIDE: usize = mem::size_of::<InstanceRaw>();

    pub fn new(model: Mat4, color: Vec4) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            color: color.to_array(),
        }
    }

    pub fn model(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.model)
    }

    pub fn color(&self) -> Vec4 {
        Vec4::from_array(self.color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_stride_matches_attributes() {
        assert_eq!(Vertex::STRIDE, 8 * 4);
    }

    #[test]
    fn instance_stride_is_mat4_plus_vec4() {
        // 16 floats for the matrix, 4 for the tint
        assert_eq!(InstanceRaw::STRIDE, 80);
    }
}
