// renderer/headless.rs
//
// GraphicsDevice without a GPU. Hands out ids, keeps buffer contents in
// memory and records every call so frames can be inspected afterwards.

use super::device::{
    BufferId, ClearFlags, GraphicsDevice, ProgramId, TextureDesc, TextureId, UniformLocation,
    UniformValue, VertexArray, VertexArrayId,
};
use super::vertex::{InstanceRaw, Vertex};
use glam::Vec4;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCommand {
    CreateVertexArray {
        vertex_array: VertexArrayId,
        vertex_count: usize,
        index_count: usize,
    },
    DeleteVertexArray(VertexArrayId),
    CreateInstanceBuffer {
        vertex_array: VertexArrayId,
        buffer: BufferId,
        byte_capacity: usize,
    },
    WriteBuffer {
        buffer: BufferId,
        offset: usize,
        data: Vec<u8>,
    },
    DeleteBuffer(BufferId),
    CreateTexture {
        texture: TextureId,
        desc: TextureDesc,
    },
    DeleteTexture(TextureId),
    BindTexture {
        texture: TextureId,
        unit: u32,
    },
    UnbindTexture {
        unit: u32,
    },
    CreateProgram(ProgramId),
    DeleteProgram(ProgramId),
    UseProgram(Option<ProgramId>),
    SetUniform {
        program: Option<ProgramId>,
        name: String,
        value: UniformValue,
    },
    BindVertexArray(Option<VertexArrayId>),
    Draw(DrawCall),
    Clear {
        color: Vec4,
        flags: ClearFlags,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawCall {
    pub vertex_array: Option<VertexArrayId>,
    pub program: Option<ProgramId>,
    pub indexed: bool,
    /// Index count for indexed draws, vertex count otherwise.
    pub element_count: u32,
    pub instance_count: u32,
}

#[derive(Default)]
pub struct HeadlessDevice {
    next_id: u32,
    commands: Vec<DeviceCommand>,
    buffers: HashMap<BufferId, Vec<u8>>,
    vertex_arrays: HashSet<VertexArrayId>,
    textures: HashSet<TextureId>,
    programs: HashMap<ProgramId, HashSet<String>>,
    locations: HashMap<(ProgramId, String), UniformLocation>,
    location_names: HashMap<UniformLocation, String>,
    current_program: Option<ProgramId>,
    current_vertex_array: Option<VertexArrayId>,
}

impl HeadlessDevice {
    pub fn new() -> Self {
        Self::default()
    }

    fn next(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    pub fn commands(&self) -> &[DeviceCommand] {
        &self.commands
    }

    /// Hand back the recorded log and start a fresh one.
    pub fn take_commands(&mut self) -> Vec<DeviceCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn draw_calls(&self) -> Vec<DrawCall> {
        self.commands
            .iter()
            .filter_map(|cmd| match cmd {
                DeviceCommand::Draw(draw) => Some(*draw),
                _ => None,
            })
            .collect()
    }

    pub fn buffer(&self, buffer: BufferId) -> Option<&[u8]> {
        self.buffers.get(&buffer).map(Vec::as_slice)
    }

    /// Instance records of every recorded write, in submission order.
    pub fn instance_uploads(&self) -> Vec<Vec<InstanceRaw>> {
        self.commands
            .iter()
            .filter_map(|cmd| match cmd {
                DeviceCommand::WriteBuffer { data, .. } => Some(decode_instances(data)),
                _ => None,
            })
            .collect()
    }

    pub fn uniform_writes(&self, name: &str) -> Vec<UniformValue> {
        self.commands
            .iter()
            .filter_map(|cmd| match cmd {
                DeviceCommand::SetUniform {
                    name: written,
                    value,
                    ..
                } if written == name => Some(*value),
                _ => None,
            })
            .collect()
    }

    pub fn live_buffers(&self) -> usize {
        self.buffers.len()
    }

    pub fn live_textures(&self) -> usize {
        self.textures.len()
    }

    pub fn live_programs(&self) -> usize {
        self.programs.len()
    }

    pub fn live_vertex_arrays(&self) -> usize {
        self.vertex_arrays.len()
    }
}

pub fn decode_instances(data: &[u8]) -> Vec<InstanceRaw> {
    data.chunks_exact(InstanceRaw::STRIDE)
        .map(bytemuck::pod_read_unaligned::<InstanceRaw>)
        .collect()
}

/// Names declared with `uniform` in GLSL source. Array suffixes are dropped,
/// so `uniform Light lights[4];` yields `lights`.
fn declared_uniforms(source: &str) -> impl Iterator<Item = String> + '_ {
    source.lines().filter_map(|line| {
        let decl = line.trim().strip_prefix("uniform ")?;
        let decl = decl.split(';').next()?;
        let name = decl.split_whitespace().last()?;
        let name = name.split('[').next()?;
        if name.is_empty() {
            None
        } else {
            Some(name.to_string())
        }
    })
}

fn uniform_base_name(name: &str) -> &str {
    let end = name.find(|c| c == '[' || c == '.').unwrap_or(name.len());
    &name[..end]
}

impl GraphicsDevice for HeadlessDevice {
    fn create_vertex_array(&mut self, vertices: &[Vertex], indices: &[u32]) -> VertexArray {
        let id = VertexArrayId(self.next());
        let vertex_buffer = BufferId(self.next());
        self.buffers
            .insert(vertex_buffer, bytemuck::cast_slice(vertices).to_vec());

        let index_buffer = if indices.is_empty() {
            None
        } else {
            let buffer = BufferId(self.next());
            self.buffers
                .insert(buffer, bytemuck::cast_slice(indices).to_vec());
            Some(buffer)
        };

        self.vertex_arrays.insert(id);
        self.commands.push(DeviceCommand::CreateVertexArray {
            vertex_array: id,
            vertex_count: vertices.len(),
            index_count: indices.len(),
        });

        VertexArray {
            id,
            vertex_buffer,
            index_buffer,
        }
    }

    fn delete_vertex_array(&mut self, vertex_array: &VertexArray) {
        self.vertex_arrays.remove(&vertex_array.id);
        self.buffers.remove(&vertex_array.vertex_buffer);
        if let Some(index_buffer) = vertex_array.index_buffer {
            self.buffers.remove(&index_buffer);
        }
        self.commands
            .push(DeviceCommand::DeleteVertexArray(vertex_array.id));
    }

    fn create_instance_buffer(&mut self, vertex_array: VertexArrayId, byte_capacity: usize) -> BufferId {
        let buffer = BufferId(self.next());
        self.buffers.insert(buffer, vec![0; byte_capacity]);
        self.commands.push(DeviceCommand::CreateInstanceBuffer {
            vertex_array,
            buffer,
            byte_capacity,
        });
        buffer
    }

    fn write_buffer(&mut self, buffer: BufferId, offset: usize, data: &[u8]) {
        let Some(storage) = self.buffers.get_mut(&buffer) else {
            log::warn!("Write to unknown buffer {:?} ignored", buffer);
            return;
        };

        let end = offset + data.len();
        if end > storage.len() {
            log::warn!(
                "Write of {} bytes at offset {} overflows buffer {:?} ({} bytes)",
                data.len(),
                offset,
                buffer,
                storage.len()
            );
            return;
        }

        storage[offset..end].copy_from_slice(data);
        self.commands.push(DeviceCommand::WriteBuffer {
            buffer,
            offset,
            data: data.to_vec(),
        });
    }

    fn delete_buffer(&mut self, buffer: BufferId) {
        self.buffers.remove(&buffer);
        self.commands.push(DeviceCommand::DeleteBuffer(buffer));
    }

    fn create_texture(&mut self, desc: &TextureDesc, _pixels: Option<&[u8]>) -> TextureId {
        let texture = TextureId(self.next());
        self.textures.insert(texture);
        self.commands.push(DeviceCommand::CreateTexture {
            texture,
            desc: *desc,
        });
        texture
    }

    fn delete_texture(&mut self, texture: TextureId) {
        self.textures.remove(&texture);
        self.commands.push(DeviceCommand::DeleteTexture(texture));
    }

    fn bind_texture(&mut self, texture: TextureId, unit: u32) {
        self.commands
            .push(DeviceCommand::BindTexture { texture, unit });
    }

    fn unbind_texture(&mut self, unit: u32) {
        self.commands.push(DeviceCommand::UnbindTexture { unit });
    }

    fn create_program(&mut self, vertex_src: &str, fragment_src: &str) -> Result<ProgramId, String> {
        if !vertex_src.contains("void main") {
            return Err("vertex stage has no main entry point".into());
        }
        if !fragment_src.contains("void main") {
            return Err("fragment stage has no main entry point".into());
        }

        let program = ProgramId(self.next());
        let uniforms = declared_uniforms(vertex_src)
            .chain(declared_uniforms(fragment_src))
            .collect();
        self.programs.insert(program, uniforms);
        self.commands.push(DeviceCommand::CreateProgram(program));
        Ok(program)
    }

    fn delete_program(&mut self, program: ProgramId) {
        self.programs.remove(&program);
        let names = &mut self.location_names;
        self.locations.retain(|(owner, _), location| {
            if *owner == program {
                names.remove(&*location);
                false
            } else {
                true
            }
        });
        if self.current_program == Some(program) {
            self.current_program = None;
        }
        self.commands.push(DeviceCommand::DeleteProgram(program));
    }

    fn use_program(&mut self, program: Option<ProgramId>) {
        self.current_program = program;
        self.commands.push(DeviceCommand::UseProgram(program));
    }

    fn uniform_location(&mut self, program: ProgramId, name: &str) -> Option<UniformLocation> {
        let declared = self.programs.get(&program)?;
        if !declared.contains(uniform_base_name(name)) {
            return None;
        }

        let key = (program, name.to_string());
        if let Some(location) = self.locations.get(&key) {
            return Some(*location);
        }

        let location = UniformLocation(self.next() as i32);
        self.locations.insert(key, location);
        self.location_names.insert(location, name.to_string());
        Some(location)
    }

    fn set_uniform(&mut self, location: UniformLocation, value: &UniformValue) {
        let name = self
            .location_names
            .get(&location)
            .cloned()
            .unwrap_or_else(|| format!("<location {}>", location.0));
        self.commands.push(DeviceCommand::SetUniform {
            program: self.current_program,
            name,
            value: *value,
        });
    }

    fn bind_vertex_array(&mut self, vertex_array: Option<VertexArrayId>) {
        self.current_vertex_array = vertex_array;
        self.commands
            .push(DeviceCommand::BindVertexArray(vertex_array));
    }

    fn draw_arrays_instanced(&mut self, vertex_count: u32, instance_count: u32) {
        self.commands.push(DeviceCommand::Draw(DrawCall {
            vertex_array: self.current_vertex_array,
            program: self.current_program,
            indexed: false,
            element_count: vertex_count,
            instance_count,
        }));
    }

    fn draw_elements_instanced(&mut self, index_count: u32, instance_count: u32) {
        self.commands.push(DeviceCommand::Draw(DrawCall {
            vertex_array: self.current_vertex_array,
            program: self.current_program,
            indexed: true,
            element_count: index_count,
            instance_count,
        }));
    }

    fn clear(&mut self, color: Vec4, flags: ClearFlags) {
        self.commands.push(DeviceCommand::Clear { color, flags });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Mat4, Vec3};

    const VS: &str = "uniform mat4 view;\nuniform mat4 projection;\nvoid main() {}";
    const FS: &str = "uniform DirLight dirLights[4];\nvoid main() {}";

    #[test]
    fn reflection_only_knows_declared_uniforms() {
        let mut device = HeadlessDevice::new();
        let program = device.create_program(VS, FS).unwrap();

        assert!(device.uniform_location(program, "view").is_some());
        assert!(device
            .uniform_location(program, "dirLights[2].color")
            .is_some());
        assert!(device.uniform_location(program, "missing").is_none());
    }

    #[test]
    fn program_without_entry_point_fails() {
        let mut device = HeadlessDevice::new();
        assert!(device.create_program("uniform mat4 view;", FS).is_err());
        assert_eq!(device.live_programs(), 0);
    }

    #[test]
    fn writes_stay_inside_the_buffer() {
        let mut device = HeadlessDevice::new();
        let va = device.create_vertex_array(&[], &[]);
        let buffer = device.create_instance_buffer(va.id, InstanceRaw::STRIDE);

        let one = [InstanceRaw::new(Mat4::from_translation(Vec3::X), Vec4::ONE)];
        device.write_buffer(buffer, 0, bytemuck::cast_slice(&one));
        device.write_buffer(buffer, InstanceRaw::STRIDE, bytemuck::cast_slice(&one));

        let uploads = device.instance_uploads();
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0], one.to_vec());
    }

    #[test]
    fn deleting_a_program_forgets_its_locations() {
        let mut device = HeadlessDevice::new();
        let first = device.create_program(VS, FS).unwrap();
        let second = device.create_program(VS, FS).unwrap();
        device.uniform_location(first, "view");
        device.uniform_location(second, "view");
        assert_eq!(device.location_names.len(), 2);

        device.delete_program(first);
        assert_eq!(device.locations.len(), 1);
        assert_eq!(device.location_names.len(), 1);
        assert!(device.uniform_location(first, "view").is_none());
    }
}
