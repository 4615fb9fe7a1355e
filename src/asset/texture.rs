use super::loader::ImageData;
use crate::error::{EngineError, Result};
use crate::renderer::device::{
    FilterMode, GraphicsDevice, PixelFormat, TextureDesc, TextureId, WrapMode,
};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct Texture {
    name: String,
    gpu: TextureId,
    desc: TextureDesc,
    path: Option<PathBuf>,
    valid: bool,
}

impl Texture {
    /// Upload raw pixels laid out as `format`, rows bottom to top.
    pub fn from_pixels(
        device: &mut dyn GraphicsDevice,
        name: impl Into<String>,
        desc: TextureDesc,
        pixels: &[u8],
    ) -> Result<Self> {
        let name = name.into();
        if pixels.len() != desc.byte_len() {
            return Err(EngineError::PixelSize {
                name,
                expected: desc.byte_len(),
                actual: pixels.len(),
            });
        }

        let gpu = device.create_texture(&desc, Some(pixels));
        Ok(Self {
            name,
            gpu,
            desc,
            path: None,
            valid: true,
        })
    }

    /// Upload a decoded image with mipmaps and repeat wrapping.
    pub fn from_image(
        device: &mut dyn GraphicsDevice,
        name: impl Into<String>,
        image: &ImageData,
        path: &Path,
    ) -> Result<Self> {
        let desc = TextureDesc {
            generate_mips: true,
            ..TextureDesc::new(image.width, image.height, image.format)
        };
        let mut texture = Self::from_pixels(device, name, desc, &image.pixels)?;
        texture.path = Some(path.to_path_buf());
        Ok(texture)
    }

    /// Allocate storage without contents, clamped at the edges.
    pub fn empty(
        device: &mut dyn GraphicsDevice,
        name: impl Into<String>,
        width: u32,
        height: u32,
        format: PixelFormat,
    ) -> Self {
        let desc = TextureDesc {
            wrap: WrapMode::ClampToEdge,
            filter: FilterMode::Linear,
            ..TextureDesc::new(width, height, format)
        };
        let gpu = device.create_texture(&desc, None);
        Self {
            name: name.into(),
            gpu,
            desc,
            path: None,
            valid: true,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn gpu(&self) -> TextureId {
        self.gpu
    }

    pub fn width(&self) -> u32 {
        self.desc.width
    }

    pub fn height(&self) -> u32 {
        self.desc.height
    }

    pub fn channels(&self) -> u8 {
        self.desc.format.channels()
    }

    pub fn format(&self) -> PixelFormat {
        self.desc.format
    }

    pub fn desc(&self) -> &TextureDesc {
        &self.desc
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn bind(&self, device: &mut dyn GraphicsDevice, unit: u32) {
        if self.valid {
            device.bind_texture(self.gpu, unit);
        }
    }

    pub fn unbind(device: &mut dyn GraphicsDevice, unit: u32) {
        device.unbind_texture(unit);
    }

    pub fn release(&mut self, device: &mut dyn GraphicsDevice) {
        if self.valid {
            device.delete_texture(self.gpu);
            self.valid = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::headless::{DeviceCommand, HeadlessDevice};

    #[test]
    fn pixel_length_must_match_desc() {
        let mut device = HeadlessDevice::new();
        let desc = TextureDesc::new(2, 2, PixelFormat::Rgba8);
        let err = Texture::from_pixels(&mut device, "short", desc, &[0; 4]).unwrap_err();
        assert!(matches!(
            err,
            EngineError::PixelSize {
                expected: 16,
                actual: 4,
                ..
            }
        ));
        assert_eq!(device.live_textures(), 0);
    }

    #[test]
    fn empty_texture_clamps_to_edge() {
        let mut device = HeadlessDevice::new();
        let texture = Texture::empty(&mut device, "target", 64, 32, PixelFormat::Rgba8);
        assert_eq!(texture.desc().wrap, WrapMode::ClampToEdge);
        assert_eq!((texture.width(), texture.height()), (64, 32));
        assert!(texture.path().is_none());
    }

    #[test]
    fn released_texture_no_longer_binds() {
        let mut device = HeadlessDevice::new();
        let mut texture = Texture::empty(&mut device, "t", 1, 1, PixelFormat::R8);
        texture.release(&mut device);
        device.take_commands();

        texture.bind(&mut device, 0);
        assert!(!device
            .commands()
            .iter()
            .any(|cmd| matches!(cmd, DeviceCommand::BindTexture { .. })));
        assert_eq!(device.live_textures(), 0);
    }
}
