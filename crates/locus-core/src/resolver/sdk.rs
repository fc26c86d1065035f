//! Resolver for core-library URIs (`dart:<library>`).

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use url::Url;

use crate::error::{SourceError, SourceResult};
use crate::source::{Source, SourceFactory};

use super::{UriResolver, decode_segment};

/// The name of the core-library scheme.
pub const SDK_SCHEME: &str = "dart";

/// Libraries every SDK ships with.
const BUILTIN_LIBRARIES: &[&str] = &[
    "builtin", "core", "coreimpl", "crypto", "io", "isolate", "json", "uri", "utf",
];

/// Table of SDK libraries: library name -> defining file, relative to `<sdk>/lib`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SdkLibraries {
    libraries: BTreeMap<String, PathBuf>,
}

impl SdkLibraries {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in table, each library at `<name>/<name>.dart`.
    pub fn builtin() -> Self {
        let libraries = BUILTIN_LIBRARIES
            .iter()
            .map(|name| (name.to_string(), default_library_path(name)))
            .collect();
        Self { libraries }
    }

    /// Add or replace a library.
    pub fn insert(&mut self, name: impl Into<String>, path: impl Into<PathBuf>) {
        self.libraries.insert(name.into(), path.into());
    }

    pub fn get(&self, name: &str) -> Option<&Path> {
        self.libraries.get(name).map(PathBuf::as_path)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.libraries.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.libraries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.libraries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.libraries.is_empty()
    }
}

fn default_library_path(name: &str) -> PathBuf {
    PathBuf::from(name).join(format!("{name}.dart"))
}

/// Resolves `dart:<library>` and `dart:<library>/<part>` inside an SDK.
///
/// A URL mapping entry for the exact URI takes precedence over the SDK layout.
/// Every source produced here is a system library source.
#[derive(Debug, Clone)]
pub struct SdkUriResolver {
    sdk_root: PathBuf,
    libraries: SdkLibraries,
    url_mapping: HashMap<String, PathBuf>,
}

impl SdkUriResolver {
    /// Resolver over the SDK at `sdk_root` with the built-in library table.
    pub fn new(sdk_root: impl Into<PathBuf>) -> Self {
        Self {
            sdk_root: sdk_root.into(),
            libraries: SdkLibraries::builtin(),
            url_mapping: HashMap::new(),
        }
    }

    pub fn with_libraries(mut self, libraries: SdkLibraries) -> Self {
        self.libraries = libraries;
        self
    }

    /// Install URL mapping overrides. Keys are normalized the way parsed URIs
    /// are (`DART:json` matches `dart:json`); keys that do not parse never match.
    pub fn with_url_mapping(mut self, url_mapping: HashMap<String, PathBuf>) -> Self {
        self.url_mapping = url_mapping
            .into_iter()
            .map(|(key, path)| match Url::parse(&key) {
                Ok(uri) => (String::from(uri), path),
                Err(_) => (key, path),
            })
            .collect();
        self
    }

    pub fn sdk_root(&self) -> &Path {
        &self.sdk_root
    }

    /// Directory holding the library sources.
    pub fn lib_dir(&self) -> PathBuf {
        self.sdk_root.join("lib")
    }

    pub fn libraries(&self) -> &SdkLibraries {
        &self.libraries
    }

    /// Return `true` if the given URI uses the core-library scheme.
    pub fn is_sdk_uri(uri: &Url) -> bool {
        uri.scheme() == SDK_SCHEME
    }

    fn library_path(&self, uri: &Url) -> SourceResult<PathBuf> {
        let unknown = || SourceError::UnknownLibrary { uri: uri.clone() };

        let (name, part) = match uri.path().split_once('/') {
            Some((name, part)) => (name, Some(part)),
            None => (uri.path(), None),
        };
        let name = decode_segment(name).ok_or_else(unknown)?;
        let library = self.libraries.get(&name).ok_or_else(unknown)?;
        let library_file = self.lib_dir().join(library);

        let Some(part) = part else {
            return Ok(library_file);
        };

        // parts live next to the defining library file
        let mut path = library_file
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.lib_dir());
        for segment in part.split('/') {
            let segment = decode_segment(segment).ok_or_else(unknown)?;
            match segment.as_str() {
                "" | "." | ".." => return Err(unknown()),
                _ => path.push(&segment),
            }
        }
        Ok(path)
    }
}

impl UriResolver for SdkUriResolver {
    fn id(&self) -> &'static str {
        "sdk"
    }

    fn resolve_absolute(
        &self,
        factory: &SourceFactory,
        uri: &Url,
    ) -> SourceResult<Option<Source>> {
        if !Self::is_sdk_uri(uri) {
            return Ok(None);
        }
        if let Some(mapped) = self.url_mapping.get(uri.as_str()) {
            tracing::debug!(uri = %uri, path = %mapped.display(), "using url mapping");
            return Ok(Some(Source::new_system(factory, uri.clone(), mapped.clone())));
        }
        let path = self.library_path(uri)?;
        Ok(Some(Source::new_system(factory, uri.clone(), path)))
    }
}
