// renderer/batch.rs
use super::device::{GraphicsDevice, UniformValue};
use super::lights::LightsData;
use super::vertex::InstanceRaw;
use crate::asset::{Assets, Handle, Material, Mesh, Texture};
use glam::{Mat4, Vec3, Vec4};
use std::collections::HashMap;

pub const DEFAULT_MAX_INSTANCES_PER_DRAW: usize = 2048;

/// Render-state identity. Submissions with equal keys share draw calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BatchKey {
    pub mesh: Handle<Mesh>,
    pub material: Handle<Material>,
    pub texture: Option<Handle<Texture>>,
}

/// One frame's instances for a single key.
#[derive(Debug, Clone)]
pub struct BatchGroup {
    pub key: BatchKey,
    pub instances: Vec<InstanceRaw>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub batches: usize,
    pub draw_calls: usize,
    pub instances: usize,
}

/// Per-frame values pushed into every drawn material.
#[derive(Debug, Clone, Copy)]
pub struct FrameUniforms<'a> {
    pub view: Mat4,
    pub projection: Mat4,
    pub camera_position: Vec3,
    pub lights: &'a LightsData,
}

/// Collects instance submissions and draws them grouped by [`BatchKey`],
/// splitting groups larger than the per-draw ceiling into sequential chunks.
pub struct BatchRenderer {
    batches: HashMap<BatchKey, Vec<InstanceRaw>>,
    max_instances_per_draw: usize,
}

impl BatchRenderer {
    pub fn new() -> Self {
        Self::with_max_instances(DEFAULT_MAX_INSTANCES_PER_DRAW)
    }

    pub fn with_max_instances(max_instances_per_draw: usize) -> Self {
        Self {
            batches: HashMap::new(),
            max_instances_per_draw: max_instances_per_draw.max(1),
        }
    }

    pub fn max_instances_per_draw(&self) -> usize {
        self.max_instances_per_draw
    }

    /// Queue one instance. Submissions without a mesh or material are dropped
    /// with a warning; a missing texture means an untextured draw.
    pub fn submit_instanced(
        &mut self,
        mesh: Option<Handle<Mesh>>,
        material: Option<Handle<Material>>,
        texture: Option<Handle<Texture>>,
        model: &Mat4,
        tint: Vec4,
    ) {
        let (Some(mesh), Some(material)) = (mesh, material) else {
            log::warn!("Dropping instanced submission without a mesh or material");
            return;
        };

        let key = BatchKey {
            mesh,
            material,
            texture,
        };
        self.batches
            .entry(key)
            .or_default()
            .push(InstanceRaw::new(*model, tint));
    }

    pub fn batch_count(&self) -> usize {
        self.batches.len()
    }

    pub fn pending_instances(&self) -> usize {
        self.batches.values().map(Vec::len).sum()
    }

    /// Hand over every accumulated group and leave the renderer empty.
    pub fn take_batches(&mut self) -> Vec<BatchGroup> {
        self.batches
            .drain()
            .map(|(key, instances)| BatchGroup { key, instances })
            .collect()
    }

    /// Draw everything submitted since the last call. Instance buffers stay
    /// on their meshes for the next frame; the groups themselves do not.
    pub fn render(
        &mut self,
        device: &mut dyn GraphicsDevice,
        assets: &mut Assets,
        frame: &FrameUniforms<'_>,
    ) -> FrameStats {
        let mut stats = FrameStats::default();
        let max = self.max_instances_per_draw;
        let fallback_texture = assets.defaults().texture;

        for batch in self.take_batches() {
            if batch.instances.is_empty() {
                continue;
            }
            let key = batch.key;

            let Some(material) = assets.materials.get_mut(key.material) else {
                log::warn!("Skipping batch with stale material handle {:?}", key.material);
                continue;
            };
            if !material.has_usable_shader(&assets.shaders) {
                continue;
            }
            let Some(mesh) = assets.meshes.get_mut(key.mesh) else {
                log::warn!("Skipping batch with stale mesh handle {:?}", key.mesh);
                continue;
            };
            let texture = match key.texture {
                Some(handle) => match assets.textures.get(handle) {
                    Some(texture) => Some(texture),
                    None => {
                        log::warn!("Stale texture handle {:?}, using default texture", handle);
                        assets.textures.get(fallback_texture)
                    }
                },
                None => None,
            };
            inject_frame_uniforms(material, frame);

            stats.batches += 1;
            for chunk in batch.instances.chunks(max) {
                mesh.setup_instancing(device, max as u32);
                mesh.update_instances(device, chunk);

                if !material.bind(device, &mut assets.shaders) {
                    break;
                }
                if let Some(texture) = texture {
                    texture.bind(device, 0);
                }
                mesh.bind(device);

                mesh.draw_instanced(device);
                stats.draw_calls += 1;
                stats.instances += chunk.len();

                Mesh::unbind(device);
                if texture.is_some() {
                    Texture::unbind(device, 0);
                }
                Material::unbind(device);
            }
        }

        stats
    }

    pub fn clean_up(&mut self) {
        self.batches.clear();
    }
}

impl Default for BatchRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Replace last frame's per-frame values, so light entries past the current
/// counts are not pushed again.
fn inject_frame_uniforms(material: &mut Material, frame: &FrameUniforms<'_>) {
    material.clear_transient();
    material.set_transient("view", frame.view.into());
    material.set_transient("projection", frame.projection.into());
    material.set_transient("viewPos", frame.camera_position.into());
    material.set_transient("useInstanceColor", UniformValue::Int(1));
    frame.lights.apply_to(material);
}
