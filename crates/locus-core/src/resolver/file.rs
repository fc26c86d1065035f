//! Resolver for `file:` URIs.

use url::Url;

use crate::error::{SourceError, SourceResult};
use crate::source::{Source, SourceFactory};

use super::UriResolver;

/// The name of the `file` scheme.
pub const FILE_SCHEME: &str = "file";

/// Resolves `file` URIs to sources bound to the corresponding local path.
///
/// The scheme check is exact. The `url` crate lowercases schemes while parsing,
/// so `FILE:///x` arrives here as `file` and is accepted.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileUriResolver;

impl FileUriResolver {
    pub fn new() -> Self {
        Self
    }

    /// Return `true` if the given URI is a `file` URI.
    pub fn is_file_uri(uri: &Url) -> bool {
        uri.scheme() == FILE_SCHEME
    }
}

impl UriResolver for FileUriResolver {
    fn id(&self) -> &'static str {
        FILE_SCHEME
    }

    fn resolve_absolute(
        &self,
        factory: &SourceFactory,
        uri: &Url,
    ) -> SourceResult<Option<Source>> {
        if !Self::is_file_uri(uri) {
            return Ok(None);
        }
        let path = uri
            .to_file_path()
            .map_err(|()| SourceError::InvalidFileUri { uri: uri.clone() })?;
        Ok(Some(Source::new(factory, uri.clone(), path)))
    }
}
