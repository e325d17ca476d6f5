//! Where font bytes come from
//!
//! A `FontData` never opens files itself; it asks a [`FontProvider`]. The
//! file-system provider reads from disk, the embedded provider serves named
//! in-memory resources, and [`ChainProvider`] tries several in order.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;

use glyphforge_core::FontLoadError;

/// Maximum font file size (50MB) to prevent resource exhaustion.
pub const MAX_FONT_FILE_SIZE: u64 = 50 * 1024 * 1024;

/// Resolves a font path to its raw bytes
pub trait FontProvider: Send + Sync {
    fn load(&self, path: &str) -> Result<Arc<[u8]>, FontLoadError>;
}

/// Reads fonts from disk, optionally relative to a root directory
#[derive(Debug, Clone)]
pub struct FileSystemProvider {
    root: Option<PathBuf>,
    max_size: u64,
}

impl Default for FileSystemProvider {
    fn default() -> Self {
        Self {
            root: None,
            max_size: MAX_FONT_FILE_SIZE,
        }
    }
}

impl FileSystemProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative paths against `root`
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
            ..Self::default()
        }
    }

    pub fn with_max_size(mut self, max_size: u64) -> Self {
        self.max_size = max_size;
        self
    }

    fn resolve(&self, path: &str) -> PathBuf {
        match &self.root {
            Some(root) => root.join(path),
            None => PathBuf::from(path),
        }
    }
}

impl FontProvider for FileSystemProvider {
    fn load(&self, path: &str) -> Result<Arc<[u8]>, FontLoadError> {
        let resolved = self.resolve(path);

        let metadata = fs::metadata(&resolved).map_err(|err| match err.kind() {
            ErrorKind::NotFound => FontLoadError::FileNotFound(resolved.display().to_string()),
            _ => FontLoadError::Io(format!("{}: {}", resolved.display(), err)),
        })?;
        if !metadata.is_file() {
            return Err(FontLoadError::FileNotFound(resolved.display().to_string()));
        }
        if metadata.len() > self.max_size {
            return Err(FontLoadError::TooLarge {
                path: resolved.display().to_string(),
                size: metadata.len(),
                limit: self.max_size,
            });
        }

        let bytes = fs::read(&resolved)
            .map_err(|err| FontLoadError::Io(format!("{}: {}", resolved.display(), err)))?;
        log::debug!("Read {} bytes from {}", bytes.len(), resolved.display());
        Ok(bytes.into())
    }
}

/// Fonts compiled into, or registered with, the running program
#[derive(Debug, Clone, Default)]
pub struct EmbeddedProvider {
    resources: HashMap<String, Arc<[u8]>>,
}

impl EmbeddedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `data` under `name`, replacing any previous resource
    pub fn insert(&mut self, name: impl Into<String>, data: impl Into<Arc<[u8]>>) {
        self.resources.insert(name.into(), data.into());
    }

    pub fn with(mut self, name: impl Into<String>, data: impl Into<Arc<[u8]>>) -> Self {
        self.insert(name, data);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.resources.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

impl FontProvider for EmbeddedProvider {
    fn load(&self, path: &str) -> Result<Arc<[u8]>, FontLoadError> {
        self.resources
            .get(path)
            .cloned()
            .ok_or_else(|| FontLoadError::ResourceNotFound(path.to_string()))
    }
}

/// Tries each provider in turn.
///
/// Only "not found" answers fall through to the next provider; any other
/// failure (an oversized or unreadable file) is final.
#[derive(Default)]
pub struct ChainProvider {
    providers: Vec<Box<dyn FontProvider>>,
}

impl ChainProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Embedded resources first, then the file system
    pub fn embedded_then_files(embedded: EmbeddedProvider) -> Self {
        Self::new()
            .with(embedded)
            .with(FileSystemProvider::new())
    }

    pub fn with(mut self, provider: impl FontProvider + 'static) -> Self {
        self.providers.push(Box::new(provider));
        self
    }
}

impl FontProvider for ChainProvider {
    fn load(&self, path: &str) -> Result<Arc<[u8]>, FontLoadError> {
        let mut last = FontLoadError::FileNotFound(path.to_string());
        for provider in &self.providers {
            match provider.load(path) {
                Ok(bytes) => return Ok(bytes),
                Err(
                    err @ (FontLoadError::FileNotFound(_) | FontLoadError::ResourceNotFound(_)),
                ) => last = err,
                Err(err) => return Err(err),
            }
        }
        Err(last)
    }
}

impl std::fmt::Debug for ChainProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainProvider")
            .field("providers", &self.providers.len())
            .finish()
    }
}
