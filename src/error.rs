use std::path::PathBuf;

/// Errors surfaced by engine setup and asset loading.
///
/// Setup failures (default assets, shader programs the engine cannot run
/// without) are fatal for the binary. Everything else is logged by the
/// caller and replaced with a default resource.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("failed to build shader program '{name}': {reason}")]
    ShaderCompile { name: String, reason: String },

    #[error("failed to create default {kind}: {reason}")]
    DefaultAsset { kind: &'static str, reason: String },

    #[error("'{name}' was not found in any asset search path")]
    NotFound { name: String },

    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to decode image {path:?}: {source}")]
    Image {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("failed to import mesh {path:?}: {source}")]
    Gltf { path: PathBuf, source: gltf::Error },

    #[error("mesh {path:?} has no triangle data")]
    EmptyMesh { path: PathBuf },

    #[error("unsupported channel count {channels} in {path:?}")]
    UnsupportedChannels { path: PathBuf, channels: u8 },

    #[error("texture '{name}' expects {expected} bytes of pixel data, got {actual}")]
    PixelSize {
        name: String,
        expected: usize,
        actual: usize,
    },
}

pub type Result<T> = std::result::Result<T, EngineError>;

/// Log a formatted diagnostic and terminate. Used by the binary for setup
/// failures the engine cannot run without.
pub fn exit_fatal(err: &EngineError) -> ! {
    log::error!("Fatal: {err}");
    std::process::exit(1)
}
