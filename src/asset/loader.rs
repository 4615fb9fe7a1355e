// asset/loader.rs
//
// Reads mesh, image and shader files from disk into CPU-side data. Nothing
// here touches the graphics device.

use crate::error::{EngineError, Result};
use crate::io;
use crate::renderer::device::PixelFormat;
use crate::renderer::vertex::{v, Vertex};
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

#[derive(Debug, Clone)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub pixels: Vec<u8>,
}

/// Import every triangle primitive of a glTF file into one vertex/index list.
pub fn load_mesh(path: &Path) -> Result<MeshData> {
    log::info!("Loading mesh: {:?}", path);
    let (document, buffers, _) = gltf::import(path).map_err(|source| EngineError::Gltf {
        path: path.to_path_buf(),
        source,
    })?;

    let mut data = MeshData::default();
    for mesh in document.meshes() {
        for primitive in mesh.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                log::warn!(
                    "Skipping non-triangle primitive in mesh {:?} of {:?}",
                    mesh.name(),
                    path
                );
                continue;
            }

            let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));
            let Some(positions) = reader.read_positions() else {
                continue;
            };
            let positions = positions.collect::<Vec<_>>();
            let normals = reader
                .read_normals()
                .map(|n| n.collect::<Vec<_>>())
                .unwrap_or_else(|| vec![[0.0, 1.0, 0.0]; positions.len()]);
            let uvs = reader
                .read_tex_coords(0)
                .map(|uv| uv.into_f32().collect::<Vec<_>>())
                .unwrap_or_else(|| vec![[0.0, 0.0]; positions.len()]);

            let base = data.vertices.len() as u32;
            data.vertices.extend(
                positions
                    .iter()
                    .zip(normals.iter().chain(std::iter::repeat(&[0.0, 1.0, 0.0])))
                    .zip(uvs.iter().chain(std::iter::repeat(&[0.0, 0.0])))
                    .map(|((pos, normal), uv)| v(*pos, *normal, *uv)),
            );

            match reader.read_indices() {
                Some(indices) => data
                    .indices
                    .extend(indices.into_u32().map(|index| base + index)),
                None => data
                    .indices
                    .extend((0..positions.len() as u32).map(|index| base + index)),
            }
        }
    }

    if data.vertices.is_empty() {
        return Err(EngineError::EmptyMesh {
            path: path.to_path_buf(),
        });
    }

    Ok(data)
}

/// Decode an image with the first row at the bottom, as texture uploads
/// expect.
pub fn load_image(path: &Path) -> Result<ImageData> {
    log::info!("Loading texture: {:?}", path);
    let bytes = io::load_binary(path)?;
    let img = image::load_from_memory(&bytes).map_err(|source| EngineError::Image {
        path: path.to_path_buf(),
        source,
    })?;

    let channels = img.color().channel_count();
    let format = PixelFormat::from_channels(channels).ok_or_else(|| {
        EngineError::UnsupportedChannels {
            path: path.to_path_buf(),
            channels,
        }
    })?;

    let img = img.flipv();
    let (width, height) = (img.width(), img.height());
    let pixels = match format {
        PixelFormat::R8 => img.to_luma8().into_raw(),
        PixelFormat::Rgb8 => img.to_rgb8().into_raw(),
        PixelFormat::Rgba8 => img.to_rgba8().into_raw(),
    };

    Ok(ImageData {
        width,
        height,
        format,
        pixels,
    })
}

pub fn load_shader_source(path: &Path) -> Result<String> {
    log::debug!("Reading shader source: {:?}", path);
    io::load_string(path)
}
