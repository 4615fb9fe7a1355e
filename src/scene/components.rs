// scene/components.rs
// Pure hecs components

use crate::asset::{Handle, Material, Mesh, Texture};
use glam::Vec4;

/// Unique entity name, mirrored in the scene's lookup map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Name(pub String);

impl Name {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Shared render resources. The entity does not own any of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Renderable {
    pub mesh: Option<Handle<Mesh>>,
    pub material: Option<Handle<Material>>,
    pub texture: Option<Handle<Texture>>,
}

impl Renderable {
    pub fn new(mesh: Handle<Mesh>, material: Handle<Material>) -> Self {
        Self {
            mesh: Some(mesh),
            material: Some(material),
            texture: None,
        }
    }

    pub fn with_texture(mut self, texture: Handle<Texture>) -> Self {
        self.texture = Some(texture);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Active(pub bool);

impl Default for Active {
    fn default() -> Self {
        Self(true)
    }
}

/// Per-instance color multiplied into the material color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tint(pub Vec4);

impl Default for Tint {
    fn default() -> Self {
        Self(Vec4::ONE)
    }
}
