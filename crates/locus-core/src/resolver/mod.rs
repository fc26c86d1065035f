//! Scheme-specific URI resolvers.
//!
//! A [`UriResolver`] either claims an absolute URI and produces a [`Source`],
//! or declines so the factory can try the next resolver. Shipped variants:
//! - `file:` URIs ([`FileUriResolver`])
//! - `package:` URIs under a package root ([`PackageUriResolver`])
//! - `dart:` core-library URIs inside an SDK ([`SdkUriResolver`])

mod file;
mod package;
mod sdk;

use std::fmt;

use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::SourceResult;
use crate::source::{Source, SourceFactory};

pub use file::{FILE_SCHEME, FileUriResolver};
pub use package::{PACKAGE_SCHEME, PackageUriResolver};
pub use sdk::{SDK_SCHEME, SdkLibraries, SdkUriResolver};

/// Strategy for turning an absolute URI of one scheme into a source.
///
/// Returning `Ok(None)` declines the URI. A resolver must decline URIs of other
/// schemes without failing; it may return an error only for malformed input in
/// its own scheme.
pub trait UriResolver: Send + Sync + fmt::Debug {
    /// Short identifier used in logs and configuration.
    fn id(&self) -> &'static str;

    /// Resolve `uri`, constructing the source through `factory`.
    fn resolve_absolute(&self, factory: &SourceFactory, uri: &Url)
    -> SourceResult<Option<Source>>;
}

/// Percent-decode one segment of an opaque URI path.
///
/// `None` when the bytes are not UTF-8 or the text decodes to a path separator,
/// which would let one URI segment span several directories.
pub(crate) fn decode_segment(segment: &str) -> Option<String> {
    let decoded = percent_decode_str(segment).decode_utf8().ok()?;
    if decoded.contains(['/', '\\']) {
        return None;
    }
    Some(decoded.into_owned())
}

/// Resolver variants selectable from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolverKind {
    /// Core libraries shipped with the SDK
    Sdk,
    /// Packages under a package root
    Package,
    /// Plain local files
    File,
}

impl ResolverKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sdk => "sdk",
            Self::Package => "package",
            Self::File => "file",
        }
    }
}

impl fmt::Display for ResolverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
