use crate::renderer::device::{BufferId, GraphicsDevice, VertexArray};
use crate::renderer::vertex::{InstanceRaw, Vertex};
use glam::Vec3;

/// Per-mesh instance stream, provisioned the first time the mesh is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstanceState {
    pub buffer: BufferId,
    pub max_instances: u32,
    pub instance_count: u32,
}

#[derive(Debug, Clone)]
pub struct Mesh {
    name: String,
    vertex_array: VertexArray,
    vertex_count: u32,
    index_count: u32,
    bounds_min: Vec3,
    bounds_max: Vec3,
    instancing: Option<InstanceState>,
}

impl Mesh {
    pub fn from_vertices(
        device: &mut dyn GraphicsDevice,
        name: impl Into<String>,
        vertices: &[Vertex],
        indices: &[u32],
    ) -> Self {
        let (bounds_min, bounds_max) = compute_bounds(vertices);
        let vertex_array = device.create_vertex_array(vertices, indices);

        Self {
            name: name.into(),
            vertex_array,
            vertex_count: vertices.len() as u32,
            index_count: indices.len() as u32,
            bounds_min,
            bounds_max,
            instancing: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn vertex_array(&self) -> &VertexArray {
        &self.vertex_array
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    pub fn has_indices(&self) -> bool {
        self.index_count > 0
    }

    pub fn bounds(&self) -> (Vec3, Vec3) {
        (self.bounds_min, self.bounds_max)
    }

    pub fn is_instanced(&self) -> bool {
        self.instancing.is_some()
    }

    pub fn instancing(&self) -> Option<&InstanceState> {
        self.instancing.as_ref()
    }

    /// Attach an instance buffer sized for `max_instances`. A mesh that is
    /// already instanced keeps its buffer unless it is too small.
    pub fn setup_instancing(&mut self, device: &mut dyn GraphicsDevice, max_instances: u32) {
        if let Some(state) = &self.instancing {
            if state.max_instances >= max_instances {
                return;
            }
            log::debug!(
                "Growing instance buffer of '{}' from {} to {} instances",
                self.name,
                state.max_instances,
                max_instances
            );
            device.delete_buffer(state.buffer);
        }

        let buffer = device.create_instance_buffer(
            self.vertex_array.id,
            max_instances as usize * InstanceRaw::STRIDE,
        );
        self.instancing = Some(InstanceState {
            buffer,
            max_instances,
            instance_count: 0,
        });
    }

    /// Write `instances` to the front of the instance buffer. Anything past
    /// the buffer capacity is dropped.
    pub fn update_instances(&mut self, device: &mut dyn GraphicsDevice, instances: &[InstanceRaw]) {
        let Some(state) = self.instancing.as_mut() else {
            log::warn!("Mesh '{}' has no instance buffer", self.name);
            return;
        };

        let count = (instances.len() as u32).min(state.max_instances);
        state.instance_count = count;
        if count == 0 {
            return;
        }

        device.write_buffer(
            state.buffer,
            0,
            bytemuck::cast_slice(&instances[..count as usize]),
        );
    }

    pub fn bind(&self, device: &mut dyn GraphicsDevice) {
        device.bind_vertex_array(Some(self.vertex_array.id));
    }

    pub fn unbind(device: &mut dyn GraphicsDevice) {
        device.bind_vertex_array(None);
    }

    /// Issue one instanced draw for the instances last uploaded.
    pub fn draw_instanced(&self, device: &mut dyn GraphicsDevice) {
        let Some(state) = &self.instancing else {
            return;
        };
        if state.instance_count == 0 {
            return;
        }

        if self.has_indices() {
            device.draw_elements_instanced(self.index_count, state.instance_count);
        } else {
            device.draw_arrays_instanced(self.vertex_count, state.instance_count);
        }
    }

    pub fn release(&self, device: &mut dyn GraphicsDevice) {
        if let Some(state) = &self.instancing {
            device.delete_buffer(state.buffer);
        }
        device.delete_vertex_array(&self.vertex_array);
    }
}

fn compute_bounds(vertices: &[Vertex]) -> (Vec3, Vec3) {
    if vertices.is_empty() {
        return (Vec3::ZERO, Vec3::ZERO);
    }

    vertices.iter().fold(
        (Vec3::splat(f32::MAX), Vec3::splat(f32::MIN)),
        |(min, max), vertex| {
            let p = Vec3::from_array(vertex.pos);
            (min.min(p), max.max(p))
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::headless::HeadlessDevice;
    use crate::renderer::primitives::{cube_mesh, quad_mesh};
    use glam::{Mat4, Vec4};

    #[test]
    fn bounds_cover_all_vertices() {
        let mut device = HeadlessDevice::new();
        let (verts, idx) = cube_mesh();
        let mesh = Mesh::from_vertices(&mut device, "cube", &verts, &idx);
        let (min, max) = mesh.bounds();
        assert!(min.abs_diff_eq(Vec3::splat(-0.5), 1e-6));
        assert!(max.abs_diff_eq(Vec3::splat(0.5), 1e-6));
        assert!(mesh.has_indices());
        assert!(!mesh.is_instanced());
    }

    #[test]
    fn draw_uses_arrays_without_indices() {
        let mut device = HeadlessDevice::new();
        let mut mesh = Mesh::from_vertices(&mut device, "quad", &quad_mesh(), &[]);
        mesh.setup_instancing(&mut device, 4);
        let instances = vec![InstanceRaw::new(Mat4::IDENTITY, Vec4::ONE); 3];
        mesh.update_instances(&mut device, &instances);
        mesh.bind(&mut device);
        mesh.draw_instanced(&mut device);

        let draws = device.draw_calls();
        assert_eq!(draws.len(), 1);
        assert!(!draws[0].indexed);
        assert_eq!(draws[0].element_count, 6);
        assert_eq!(draws[0].instance_count, 3);
    }

    #[test]
    fn update_clamps_to_capacity() {
        let mut device = HeadlessDevice::new();
        let mut mesh = Mesh::from_vertices(&mut device, "quad", &quad_mesh(), &[]);
        mesh.setup_instancing(&mut device, 2);
        let instances = vec![InstanceRaw::new(Mat4::IDENTITY, Vec4::ONE); 5];
        mesh.update_instances(&mut device, &instances);
        assert_eq!(mesh.instancing().map(|s| s.instance_count), Some(2));
    }

    #[test]
    fn setup_keeps_a_large_enough_buffer() {
        let mut device = HeadlessDevice::new();
        let mut mesh = Mesh::from_vertices(&mut device, "quad", &quad_mesh(), &[]);
        mesh.setup_instancing(&mut device, 16);
        let first = mesh.instancing().map(|s| s.buffer);
        mesh.setup_instancing(&mut device, 8);
        assert_eq!(mesh.instancing().map(|s| s.buffer), first);

        mesh.setup_instancing(&mut device, 32);
        assert_ne!(mesh.instancing().map(|s| s.buffer), first);
        assert_eq!(mesh.instancing().map(|s| s.max_instances), Some(32));
    }
}
