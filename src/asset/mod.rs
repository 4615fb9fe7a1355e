pub mod cache;
pub mod handle;
pub mod loader;
pub mod material;
pub mod mesh;
pub mod shader;
pub mod texture;

pub use cache::Registry;
pub use handle::Handle;
pub use material::{Material, Property};
pub use mesh::Mesh;
pub use shader::Shader;
pub use texture::Texture;

use crate::error::{EngineError, Result};
use crate::io::{AssetPaths, SearchPaths};
use crate::renderer::device::{GraphicsDevice, PixelFormat, TextureDesc};
use crate::renderer::primitives;
use crate::renderer::vertex::Vertex;
use glam::Vec3;
use std::path::Path;

pub const DEFAULT_NAME: &str = "default";
const DEFAULT_TEXTURE_SIZE: u32 = 8;

/// Placeholders every failed lookup or load resolves to.
#[derive(Debug, Clone, Copy)]
pub struct Defaults {
    pub mesh: Handle<Mesh>,
    pub texture: Handle<Texture>,
    pub shader: Handle<Shader>,
    pub material: Handle<Material>,
}

/// Owns the mesh, texture, shader and material registries.
pub struct Assets {
    pub meshes: Registry<Mesh>,
    pub textures: Registry<Texture>,
    pub shaders: Registry<Shader>,
    pub materials: Registry<Material>,
    paths: AssetPaths,
    defaults: Defaults,
}

impl Assets {
    pub fn new(device: &mut dyn GraphicsDevice) -> Result<Self> {
        Self::with_paths(device, AssetPaths::default())
    }

    /// Build the registries and their defaults. Failing to create any
    /// default is fatal for the caller.
    pub fn with_paths(device: &mut dyn GraphicsDevice, paths: AssetPaths) -> Result<Self> {
        let mut meshes = Registry::new();
        let mut textures = Registry::new();
        let mut shaders = Registry::new();
        let mut materials = Registry::new();

        let (vertices, indices) = primitives::cube_mesh();
        let mesh = meshes.insert(
            DEFAULT_NAME,
            Mesh::from_vertices(device, DEFAULT_NAME, &vertices, &indices),
        );

        let checker = primitives::checkerboard(DEFAULT_TEXTURE_SIZE, DEFAULT_TEXTURE_SIZE / 2);
        let desc = TextureDesc::new(checker.width(), checker.height(), PixelFormat::Rgba8);
        let texture = Texture::from_pixels(device, DEFAULT_NAME, desc, checker.as_raw())
            .map_err(|err| EngineError::DefaultAsset {
                kind: "texture",
                reason: err.to_string(),
            })?;
        let texture = textures.insert(DEFAULT_NAME, texture);

        let shader = Shader::from_source(
            device,
            DEFAULT_NAME,
            shader::DEFAULT_VERTEX_SOURCE,
            shader::DEFAULT_FRAGMENT_SOURCE,
        )
        .map_err(|err| EngineError::DefaultAsset {
            kind: "shader",
            reason: err.to_string(),
        })?;
        let shader = shaders.insert(DEFAULT_NAME, shader);

        let material = materials.insert(DEFAULT_NAME, seeded_material(DEFAULT_NAME, shader));

        log::info!("Created default mesh, texture, shader and material");
        Ok(Self {
            meshes,
            textures,
            shaders,
            materials,
            paths,
            defaults: Defaults {
                mesh,
                texture,
                shader,
                material,
            },
        })
    }

    pub fn defaults(&self) -> &Defaults {
        &self.defaults
    }

    pub fn paths(&self) -> &AssetPaths {
        &self.paths
    }

    pub fn mesh(&self, name: &str) -> Handle<Mesh> {
        lookup_or_default(&self.meshes, name, "Mesh", self.defaults.mesh)
    }

    pub fn texture(&self, name: &str) -> Handle<Texture> {
        lookup_or_default(&self.textures, name, "Texture", self.defaults.texture)
    }

    pub fn shader(&self, name: &str) -> Handle<Shader> {
        lookup_or_default(&self.shaders, name, "Shader", self.defaults.shader)
    }

    pub fn material(&self, name: &str) -> Handle<Material> {
        lookup_or_default(&self.materials, name, "Material", self.defaults.material)
    }

    /// Register mesh data under `name`, replacing an earlier mesh of that
    /// name in place.
    pub fn create_mesh(
        &mut self,
        device: &mut dyn GraphicsDevice,
        name: &str,
        vertices: &[Vertex],
        indices: &[u32],
    ) -> Handle<Mesh> {
        if let Some(old) = self.meshes.get_by_name(name) {
            old.release(device);
        }
        self.meshes
            .insert(name, Mesh::from_vertices(device, name, vertices, indices))
    }

    /// Existing mesh for `name`, else the mesh file at `path` resolved
    /// against the mesh search paths, else the default cube.
    pub fn load_mesh(
        &mut self,
        device: &mut dyn GraphicsDevice,
        name: &str,
        path: impl AsRef<Path>,
    ) -> Handle<Mesh> {
        if let Some(handle) = self.meshes.lookup(name) {
            return handle;
        }

        let loaded = self
            .paths
            .meshes
            .resolve_or_err(&path)
            .and_then(|resolved| loader::load_mesh(&resolved));
        match loaded {
            Ok(data) => self.create_mesh(device, name, &data.vertices, &data.indices),
            Err(err) => {
                log::warn!("Failed to load mesh '{}': {}. Using default cube.", name, err);
                self.defaults.mesh
            }
        }
    }

    pub fn create_texture(
        &mut self,
        device: &mut dyn GraphicsDevice,
        name: &str,
        desc: TextureDesc,
        pixels: &[u8],
    ) -> Result<Handle<Texture>> {
        let texture = Texture::from_pixels(device, name, desc, pixels)?;
        Ok(self.replace_texture(device, name, texture))
    }

    pub fn create_empty_texture(
        &mut self,
        device: &mut dyn GraphicsDevice,
        name: &str,
        width: u32,
        height: u32,
        format: PixelFormat,
    ) -> Handle<Texture> {
        let texture = Texture::empty(device, name, width, height, format);
        self.replace_texture(device, name, texture)
    }

    pub fn load_texture(
        &mut self,
        device: &mut dyn GraphicsDevice,
        name: &str,
        path: impl AsRef<Path>,
    ) -> Handle<Texture> {
        if let Some(handle) = self.textures.lookup(name) {
            return handle;
        }

        let loaded = self.paths.textures.resolve_or_err(&path).and_then(|resolved| {
            let image = loader::load_image(&resolved)?;
            Texture::from_image(device, name, &image, &resolved)
        });
        match loaded {
            Ok(texture) => self.textures.insert(name, texture),
            Err(err) => {
                log::warn!(
                    "Failed to load texture '{}': {}. Using default texture.",
                    name,
                    err
                );
                self.defaults.texture
            }
        }
    }

    pub fn load_shader(
        &mut self,
        device: &mut dyn GraphicsDevice,
        name: &str,
        vertex_path: impl AsRef<Path>,
        fragment_path: impl AsRef<Path>,
    ) -> Handle<Shader> {
        if let Some(handle) = self.shaders.lookup(name) {
            return handle;
        }

        let loaded = compile_from_files(
            device,
            &self.paths.shaders,
            name,
            vertex_path.as_ref(),
            fragment_path.as_ref(),
        );
        match loaded {
            Ok(shader) => self.shaders.insert(name, shader),
            Err(err) => {
                log::warn!("Failed to load shader '{}': {}. Using default shader.", name, err);
                self.defaults.shader
            }
        }
    }

    /// Material using the shader registered as `shader_name`. A material
    /// that already exists under `name` is returned untouched so its
    /// properties survive.
    pub fn create_material(&mut self, name: &str, shader_name: &str) -> Handle<Material> {
        if let Some(handle) = self.materials.lookup(name) {
            return handle;
        }

        let shader = self.shader(shader_name);
        self.materials.insert(name, seeded_material(name, shader))
    }

    /// Release every GPU object and empty all registries. Handles issued
    /// before this call stop resolving.
    pub fn clean_up(&mut self, device: &mut dyn GraphicsDevice) {
        for mesh in self.meshes.drain() {
            mesh.release(device);
        }
        for mut texture in self.textures.drain() {
            texture.release(device);
        }
        for mut shader in self.shaders.drain() {
            shader.release(device);
        }
        self.materials.clear();
        log::info!("Released all asset registries");
    }

    fn replace_texture(
        &mut self,
        device: &mut dyn GraphicsDevice,
        name: &str,
        texture: Texture,
    ) -> Handle<Texture> {
        if let Some(handle) = self.textures.lookup(name) {
            if let Some(old) = self.textures.get_mut(handle) {
                old.release(device);
            }
        }
        self.textures.insert(name, texture)
    }
}

fn lookup_or_default<T>(registry: &Registry<T>, name: &str, kind: &str, default: Handle<T>) -> Handle<T> {
    registry.lookup(name).unwrap_or_else(|| {
        log::warn!("{} not found: {}. Using default.", kind, name);
        default
    })
}

fn seeded_material(name: &str, shader: Handle<Shader>) -> Material {
    let mut material = Material::new(name, Some(shader));
    material.set_vec3("color", Vec3::ONE);
    material.set_int("mainTexture", 0);
    material.set_int("useTexture", 0);
    material
}

fn compile_from_files(
    device: &mut dyn GraphicsDevice,
    paths: &SearchPaths,
    name: &str,
    vertex_path: &Path,
    fragment_path: &Path,
) -> Result<Shader> {
    let vertex_path = paths.resolve_or_err(vertex_path)?;
    let fragment_path = paths.resolve_or_err(fragment_path)?;
    let vertex_src = loader::load_shader_source(&vertex_path)?;
    let fragment_src = loader::load_shader_source(&fragment_path)?;

    Ok(Shader::from_source(device, name, &vertex_src, &fragment_src)?
        .with_paths(&vertex_path, &fragment_path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::headless::HeadlessDevice;

    fn assets(device: &mut HeadlessDevice) -> Assets {
        Assets::with_paths(device, AssetPaths::from_roots(&[])).unwrap()
    }

    #[test]
    fn defaults_are_registered_by_name() {
        let mut device = HeadlessDevice::new();
        let assets = assets(&mut device);
        assert_eq!(assets.meshes.lookup(DEFAULT_NAME), Some(assets.defaults().mesh));
        assert_eq!(assets.material(DEFAULT_NAME), assets.defaults().material);
        assert_eq!(device.live_programs(), 1);
        assert_eq!(device.live_textures(), 1);
    }

    #[test]
    fn failed_loads_fall_back_to_defaults() {
        let mut device = HeadlessDevice::new();
        let mut assets = assets(&mut device);
        let defaults = *assets.defaults();

        assert_eq!(assets.load_mesh(&mut device, "rock", "rock.gltf"), defaults.mesh);
        assert_eq!(assets.load_texture(&mut device, "rock", "rock.png"), defaults.texture);
        assert_eq!(
            assets.load_shader(&mut device, "pbr", "pbr.vert", "pbr.frag"),
            defaults.shader
        );
        assert!(!assets.meshes.contains_name("rock"));
    }

    #[test]
    fn new_material_is_seeded() {
        let mut device = HeadlessDevice::new();
        let mut assets = assets(&mut device);
        let handle = assets.create_material("brick", DEFAULT_NAME);

        let material = assets.materials.get(handle).unwrap();
        assert_eq!(material.get_vec3("color", Vec3::ZERO), Vec3::ONE);
        assert_eq!(material.get_int("useTexture", -1), 0);
        assert_eq!(material.shader(), Some(assets.defaults().shader));
    }

    #[test]
    fn recreating_a_material_keeps_its_properties() {
        let mut device = HeadlessDevice::new();
        let mut assets = assets(&mut device);
        let first = assets.create_material("brick", DEFAULT_NAME);
        if let Some(material) = assets.materials.get_mut(first) {
            material.set_float("roughness", 0.3);
        }

        let second = assets.create_material("brick", DEFAULT_NAME);
        assert_eq!(first, second);
        let material = assets.materials.get(second).unwrap();
        assert_eq!(material.get_float("roughness", 0.0), 0.3);
    }

    #[test]
    fn replacing_a_mesh_releases_the_old_one() {
        let mut device = HeadlessDevice::new();
        let mut assets = assets(&mut device);
        let quad = primitives::quad_mesh();
        let before = device.live_vertex_arrays();

        let a = assets.create_mesh(&mut device, "quad", &quad, &[]);
        let b = assets.create_mesh(&mut device, "quad", &quad, &[]);
        assert_eq!(a, b);
        assert_eq!(device.live_vertex_arrays(), before + 1);
    }

    #[test]
    fn replacing_a_texture_releases_the_old_one() {
        let mut device = HeadlessDevice::new();
        let mut assets = assets(&mut device);
        let desc = TextureDesc::new(2, 2, PixelFormat::Rgba8);
        let pixels = [255u8; 16];

        let a = assets.create_texture(&mut device, "tile", desc, &pixels).unwrap();
        let live = device.live_textures();
        let b = assets.create_texture(&mut device, "tile", desc, &pixels).unwrap();

        assert_eq!(a, b);
        assert_eq!(device.live_textures(), live);
        assert!(assets.textures.get(b).is_some_and(Texture::is_valid));
    }

    #[test]
    fn clean_up_releases_everything() {
        let mut device = HeadlessDevice::new();
        let mut assets = assets(&mut device);
        assets.clean_up(&mut device);

        assert_eq!(device.live_programs(), 0);
        assert_eq!(device.live_textures(), 0);
        assert_eq!(device.live_vertex_arrays(), 0);
        assert!(assets.meshes.get(assets.defaults().mesh).is_none());
    }
}
