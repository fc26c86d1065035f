//! Error types for URI resolution and source reads.

use std::path::PathBuf;

use thiserror::Error;
use url::Url;

/// Errors raised while resolving a URI or reading a resolved source.
///
/// Resolution-time variants surface from [`SourceFactory`](crate::source::SourceFactory)
/// calls. `MissingContent`, `Read` and `InvalidUtf8` only surface when content is
/// actually read, so a referenced-but-missing source stays a valid identity.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("no resolver accepts scheme '{scheme}' (uri: {uri})")]
    UnsupportedScheme { scheme: String, uri: Url },

    #[error("invalid URI '{uri}': {source}")]
    InvalidUri {
        uri: String,
        #[source]
        source: url::ParseError,
    },

    #[error("cannot resolve '{reference}' against {base}: {source}")]
    MalformedReference {
        base: Url,
        reference: String,
        #[source]
        source: url::ParseError,
    },

    #[error("path is not absolute: {}", .path.display())]
    RelativePath { path: PathBuf },

    #[error("file URI does not denote a local path: {uri}")]
    InvalidFileUri { uri: Url },

    #[error("invalid package URI {uri}: {reason}")]
    InvalidPackageUri { uri: Url, reason: &'static str },

    #[error("unknown SDK library: {uri}")]
    UnknownLibrary { uri: Url },

    #[error("source not found: {uri} ({})", .path.display())]
    MissingContent { uri: Url, path: PathBuf },

    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("content of {uri} is not valid UTF-8")]
    InvalidUtf8 { uri: Url },

    #[error("source {uri} outlived the factory that resolved it")]
    Detached { uri: Url },
}

impl SourceError {
    /// True for errors that can only occur when content is read.
    pub fn is_read_error(&self) -> bool {
        matches!(
            self,
            Self::MissingContent { .. } | Self::Read { .. } | Self::InvalidUtf8 { .. }
        )
    }
}

pub type SourceResult<T> = Result<T, SourceError>;
