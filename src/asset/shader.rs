use crate::error::{EngineError, Result};
use crate::renderer::device::{GraphicsDevice, ProgramId, UniformLocation, UniformValue};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub const DEFAULT_VERTEX_SOURCE: &str = include_str!("../shader/default.vert");
pub const DEFAULT_FRAGMENT_SOURCE: &str = include_str!("../shader/default.frag");

/// Linked program plus a cache of resolved uniform locations.
#[derive(Debug)]
pub struct Shader {
    name: String,
    program: ProgramId,
    vertex_path: Option<PathBuf>,
    fragment_path: Option<PathBuf>,
    valid: bool,
    // None records a name the program does not expose, so it is reported once
    locations: HashMap<String, Option<UniformLocation>>,
}

impl Shader {
    pub fn from_source(
        device: &mut dyn GraphicsDevice,
        name: impl Into<String>,
        vertex_src: &str,
        fragment_src: &str,
    ) -> Result<Self> {
        let name = name.into();
        let program = device
            .create_program(vertex_src, fragment_src)
            .map_err(|reason| EngineError::ShaderCompile {
                name: name.clone(),
                reason,
            })?;

        log::debug!("Linked shader '{}' as {:?}", name, program);
        Ok(Self {
            name,
            program,
            vertex_path: None,
            fragment_path: None,
            valid: true,
            locations: HashMap::new(),
        })
    }

    pub fn with_paths(mut self, vertex_path: &Path, fragment_path: &Path) -> Self {
        self.vertex_path = Some(vertex_path.to_path_buf());
        self.fragment_path = Some(fragment_path.to_path_buf());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn program(&self) -> ProgramId {
        self.program
    }

    pub fn vertex_path(&self) -> Option<&Path> {
        self.vertex_path.as_deref()
    }

    pub fn fragment_path(&self) -> Option<&Path> {
        self.fragment_path.as_deref()
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn bind(&self, device: &mut dyn GraphicsDevice) {
        device.use_program(Some(self.program));
    }

    pub fn unbind(device: &mut dyn GraphicsDevice) {
        device.use_program(None);
    }

    /// Push `value` to the uniform called `name`. Expects the program to be
    /// bound. Unknown names are skipped with a single warning each.
    pub fn set_uniform(&mut self, device: &mut dyn GraphicsDevice, name: &str, value: &UniformValue) {
        let location = match self.locations.get(name) {
            Some(location) => *location,
            None => {
                let location = device.uniform_location(self.program, name);
                if location.is_none() {
                    log::warn!("Shader '{}' has no uniform '{}'", self.name, name);
                }
                self.locations.insert(name.to_string(), location);
                location
            }
        };

        if let Some(location) = location {
            device.set_uniform(location, value);
        }
    }

    pub fn release(&mut self, device: &mut dyn GraphicsDevice) {
        if self.valid {
            device.delete_program(self.program);
            self.valid = false;
            self.locations.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::headless::HeadlessDevice;
    use glam::Mat4;

    #[test]
    fn default_sources_link() {
        let mut device = HeadlessDevice::new();
        let shader =
            Shader::from_source(&mut device, "default", DEFAULT_VERTEX_SOURCE, DEFAULT_FRAGMENT_SOURCE)
                .unwrap();
        assert!(shader.is_valid());
        assert_eq!(device.live_programs(), 1);
    }

    #[test]
    fn link_failure_names_the_shader() {
        let mut device = HeadlessDevice::new();
        let err = Shader::from_source(&mut device, "broken", "", "").unwrap_err();
        assert!(matches!(err, EngineError::ShaderCompile { ref name, .. } if name == "broken"));
    }

    #[test]
    fn unknown_uniform_is_skipped() {
        let mut device = HeadlessDevice::new();
        let mut shader =
            Shader::from_source(&mut device, "default", DEFAULT_VERTEX_SOURCE, DEFAULT_FRAGMENT_SOURCE)
                .unwrap();
        shader.bind(&mut device);
        shader.set_uniform(&mut device, "view", &Mat4::IDENTITY.into());
        shader.set_uniform(&mut device, "nonexistent", &UniformValue::Float(1.0));
        shader.set_uniform(&mut device, "nonexistent", &UniformValue::Float(2.0));

        assert_eq!(device.uniform_writes("view").len(), 1);
        assert!(device.uniform_writes("nonexistent").is_empty());
    }
}
