//! Resolver for `package:` URIs.

use std::path::PathBuf;

use url::Url;

use crate::error::{SourceError, SourceResult};
use crate::source::{Source, SourceFactory};

use super::{UriResolver, decode_segment};

/// The name of the `package` scheme.
pub const PACKAGE_SCHEME: &str = "package";

/// Resolves `package:<name>/<path>` to `<package_root>/<name>/<path>`.
#[derive(Debug, Clone)]
pub struct PackageUriResolver {
    package_root: PathBuf,
}

impl PackageUriResolver {
    pub fn new(package_root: impl Into<PathBuf>) -> Self {
        Self {
            package_root: package_root.into(),
        }
    }

    pub fn package_root(&self) -> &std::path::Path {
        &self.package_root
    }

    /// Return `true` if the given URI is a `package` URI.
    pub fn is_package_uri(uri: &Url) -> bool {
        uri.scheme() == PACKAGE_SCHEME
    }

    fn package_path(&self, uri: &Url) -> SourceResult<PathBuf> {
        let invalid = |reason| SourceError::InvalidPackageUri {
            uri: uri.clone(),
            reason,
        };

        if uri.has_host() || uri.path().starts_with('/') {
            return Err(invalid("package URIs must not be hierarchical"));
        }

        let (name, rest) = uri
            .path()
            .split_once('/')
            .ok_or_else(|| invalid("missing path within the package"))?;

        let name = decode_segment(name).ok_or_else(|| invalid("undecodable package name"))?;
        match name.as_str() {
            "" => return Err(invalid("missing package name")),
            "." | ".." => return Err(invalid("dot segments are not allowed")),
            _ => {}
        }

        let mut path = self.package_root.join(&name);
        for segment in rest.split('/') {
            let segment =
                decode_segment(segment).ok_or_else(|| invalid("undecodable path segment"))?;
            match segment.as_str() {
                "" => return Err(invalid("empty path segment")),
                "." | ".." => return Err(invalid("dot segments are not allowed")),
                _ => path.push(&segment),
            }
        }
        Ok(path)
    }
}

impl UriResolver for PackageUriResolver {
    fn id(&self) -> &'static str {
        PACKAGE_SCHEME
    }

    fn resolve_absolute(
        &self,
        factory: &SourceFactory,
        uri: &Url,
    ) -> SourceResult<Option<Source>> {
        if !Self::is_package_uri(uri) {
            return Ok(None);
        }
        let path = self.package_path(uri)?;
        Ok(Some(Source::new(factory, uri.clone(), path)))
    }
}
