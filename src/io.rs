use crate::error::{EngineError, Result};
use std::path::{Path, PathBuf};

/// Ordered list of directories an asset name is resolved against.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchPaths {
    roots: Vec<PathBuf>,
}

impl SearchPaths {
    pub fn new<I, P>(roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            roots: roots.into_iter().map(Into::into).collect(),
        }
    }

    /// The usual layout next to, or a few levels above, the working directory.
    pub fn for_kind(kind: &str) -> Self {
        Self::new([
            Path::new("Assets").join(kind),
            Path::new("../Assets").join(kind),
            Path::new("../../Assets").join(kind),
        ])
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    pub fn push(&mut self, root: impl Into<PathBuf>) {
        self.roots.push(root.into());
    }

    /// First existing `<root>/<file name of path>`, falling back to `path`
    /// itself when it exists as given.
    pub fn resolve(&self, path: impl AsRef<Path>) -> Option<PathBuf> {
        let path = path.as_ref();
        if let Some(file_name) = path.file_name() {
            for root in &self.roots {
                let candidate = root.join(file_name);
                if candidate.is_file() {
                    return Some(candidate);
                }
            }
        }

        path.is_file().then(|| path.to_path_buf())
    }

    pub fn resolve_or_err(&self, path: impl AsRef<Path>) -> Result<PathBuf> {
        let path = path.as_ref();
        self.resolve(path).ok_or_else(|| EngineError::NotFound {
            name: path.display().to_string(),
        })
    }
}

/// Search paths per asset kind.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetPaths {
    pub meshes: SearchPaths,
    pub textures: SearchPaths,
    pub shaders: SearchPaths,
}

impl AssetPaths {
    /// `<root>/Models`, `<root>/Textures` and `<root>/Shaders` for every root.
    pub fn from_roots(roots: &[PathBuf]) -> Self {
        let kind = |name: &str| SearchPaths::new(roots.iter().map(|root| root.join(name)));
        Self {
            meshes: kind("Models"),
            textures: kind("Textures"),
            shaders: kind("Shaders"),
        }
    }
}

impl Default for AssetPaths {
    fn default() -> Self {
        Self {
            meshes: SearchPaths::for_kind("Models"),
            textures: SearchPaths::for_kind("Textures"),
            shaders: SearchPaths::for_kind("Shaders"),
        }
    }
}

pub(crate) fn load_binary(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|source| EngineError::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub(crate) fn load_string(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| EngineError::Io {
        path: path.to_path_buf(),
        source,
    })
}
