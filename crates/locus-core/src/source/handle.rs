//! The source handle.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};
use std::time::SystemTime;

use url::Url;

use crate::error::{SourceError, SourceResult};

use super::factory::{FactoryShared, SourceFactory};

/// An immutable handle for one unit of analyzable content.
///
/// Cloning is cheap and yields the same identity. Two sources are equal when
/// their canonical URIs are equal; after a pass through a factory's cache they
/// are also the same shared instance (see [`Source::ptr_eq`]).
///
/// Content is never held by the handle. Every read goes back to the overlay
/// map of the owning factory or to disk, so freshness can always be re-checked.
#[derive(Clone)]
pub struct Source {
    inner: Arc<SourceData>,
}

struct SourceData {
    uri: Url,
    path: PathBuf,
    in_system_library: bool,
    factory: Weak<FactoryShared>,
}

impl Source {
    /// Create a source bound to `path`, owned by `factory`.
    pub fn new(factory: &SourceFactory, uri: Url, path: impl Into<PathBuf>) -> Self {
        Self::build(factory, uri, path.into(), false)
    }

    /// Create a source that belongs to the SDK's system libraries.
    pub fn new_system(factory: &SourceFactory, uri: Url, path: impl Into<PathBuf>) -> Self {
        Self::build(factory, uri, path.into(), true)
    }

    fn build(factory: &SourceFactory, uri: Url, path: PathBuf, in_system_library: bool) -> Self {
        Self {
            inner: Arc::new(SourceData {
                uri,
                path,
                in_system_library,
                factory: factory.downgrade(),
            }),
        }
    }

    /// The canonical URI identifying this source.
    pub fn uri(&self) -> &Url {
        &self.inner.uri
    }

    /// The canonical URI as a string, suitable for persisting and re-resolving.
    pub fn encoding(&self) -> &str {
        self.inner.uri.as_str()
    }

    /// The local path the content is read from.
    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    /// Final path segment, e.g. `x.src`.
    pub fn short_name(&self) -> String {
        self.inner
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.encoding().to_string())
    }

    /// Full display form of the content path.
    pub fn full_name(&self) -> String {
        self.inner.path.display().to_string()
    }

    pub fn is_in_system_library(&self) -> bool {
        self.inner.in_system_library
    }

    /// True if the two handles are the same shared instance.
    pub fn ptr_eq(a: &Source, b: &Source) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }

    /// Whether content is currently available, either as an overlay or on disk.
    pub fn exists(&self) -> bool {
        if self.overlay().is_some() {
            return true;
        }
        self.inner.path.is_file()
    }

    /// Modification stamp of the current content, `None` when it is missing.
    pub fn modification_stamp(&self) -> Option<SystemTime> {
        if let Some(overlay) = self.overlay() {
            return Some(overlay.stamp);
        }
        std::fs::metadata(&self.inner.path)
            .and_then(|meta| meta.modified())
            .ok()
    }

    /// Read the current content as text.
    pub fn contents(&self) -> SourceResult<String> {
        if let Some(overlay) = self.overlay() {
            return Ok(overlay.text.to_string());
        }
        let bytes = self.read_disk()?;
        String::from_utf8(bytes).map_err(|_| SourceError::InvalidUtf8 {
            uri: self.inner.uri.clone(),
        })
    }

    /// Read the current content as raw bytes.
    pub fn bytes(&self) -> SourceResult<Vec<u8>> {
        if let Some(overlay) = self.overlay() {
            return Ok(overlay.text.as_bytes().to_vec());
        }
        self.read_disk()
    }

    /// blake3 hex digest of the current content.
    pub fn content_hash(&self) -> SourceResult<String> {
        let bytes = self.bytes()?;
        Ok(blake3::hash(&bytes).to_hex().to_string())
    }

    /// Resolve `relative` against this source's URI through the owning factory.
    pub fn resolve_relative(&self, relative: &str) -> SourceResult<Source> {
        let factory = self.factory().ok_or_else(|| SourceError::Detached {
            uri: self.inner.uri.clone(),
        })?;
        factory.resolve_relative(self, relative)
    }

    /// The factory that produced this source, if it is still alive.
    pub fn factory(&self) -> Option<SourceFactory> {
        SourceFactory::upgrade(&self.inner.factory)
    }

    fn overlay(&self) -> Option<super::overlay::Overlay> {
        self.inner
            .factory
            .upgrade()
            .and_then(|shared| shared.overlays.get(&self.inner.uri))
    }

    fn read_disk(&self) -> SourceResult<Vec<u8>> {
        std::fs::read(&self.inner.path).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => SourceError::MissingContent {
                uri: self.inner.uri.clone(),
                path: self.inner.path.clone(),
            },
            _ => SourceError::Read {
                path: self.inner.path.clone(),
                source: err,
            },
        })
    }
}

impl PartialEq for Source {
    fn eq(&self, other: &Self) -> bool {
        self.inner.uri == other.inner.uri
    }
}

impl Eq for Source {}

impl Hash for Source {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.uri.hash(state);
    }
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Source")
            .field("uri", &self.inner.uri.as_str())
            .field("path", &self.inner.path)
            .field("in_system_library", &self.inner.in_system_library)
            .finish()
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.inner.uri.as_str())
    }
}
