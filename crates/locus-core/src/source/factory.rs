//! The caching source factory.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use url::Url;

use crate::error::{SourceError, SourceResult};
use crate::resolver::UriResolver;

use super::handle::Source;
use super::overlay::OverlayMap;
use super::uri::resolve_reference;

/// Central resolution authority.
///
/// Holds an ordered resolver chain and a cache from canonical URI to [`Source`].
/// Resolvers are tried strictly in registration order and the first one that
/// claims a URI wins. While the factory lives, a URI never maps to two distinct
/// source identities, including under concurrent resolution.
///
/// Cloning shares the same cache and resolver chain.
#[derive(Clone)]
pub struct SourceFactory {
    shared: Arc<FactoryShared>,
}

pub(super) struct FactoryShared {
    resolvers: Vec<Box<dyn UriResolver>>,
    cache: RwLock<HashMap<Url, Source>>,
    pub(super) overlays: OverlayMap,
}

/// Builder that fixes the resolver chain before the factory is shared.
///
/// Registering resolvers after resolution has begun is unsupported, so the
/// chain is immutable once [`SourceFactoryBuilder::build`] returns.
#[derive(Default)]
pub struct SourceFactoryBuilder {
    resolvers: Vec<Box<dyn UriResolver>>,
}

impl SourceFactoryBuilder {
    /// Append a resolver to the end of the chain.
    pub fn resolver(mut self, resolver: impl UriResolver + 'static) -> Self {
        self.resolvers.push(Box::new(resolver));
        self
    }

    /// Append an already boxed resolver.
    pub fn boxed_resolver(mut self, resolver: Box<dyn UriResolver>) -> Self {
        self.resolvers.push(resolver);
        self
    }

    pub fn build(self) -> SourceFactory {
        SourceFactory::new(self.resolvers)
    }
}

impl SourceFactory {
    /// Create a factory with the given resolvers, tried in order.
    pub fn new(resolvers: Vec<Box<dyn UriResolver>>) -> Self {
        Self {
            shared: Arc::new(FactoryShared {
                resolvers,
                cache: RwLock::new(HashMap::new()),
                overlays: OverlayMap::default(),
            }),
        }
    }

    pub fn builder() -> SourceFactoryBuilder {
        SourceFactoryBuilder::default()
    }

    /// Resolve an absolute URI to its canonical source.
    ///
    /// The fragment is not part of a source's identity and is dropped. The query
    /// is kept: `file:///a/x.src?v=1` and `file:///a/x.src` are two identities
    /// bound to the same path, since the factory does not know what a query means
    /// to each scheme. A resolver that claims the URI produces a source even when
    /// the content is missing; only reads report that.
    pub fn resolve(&self, uri: &Url) -> SourceResult<Source> {
        let mut canonical = uri.clone();
        canonical.set_fragment(None);

        if let Some(source) = self.cached(&canonical) {
            tracing::trace!(uri = %canonical, "source cache hit");
            return Ok(source);
        }

        for resolver in &self.shared.resolvers {
            if let Some(source) = resolver.resolve_absolute(self, &canonical)? {
                tracing::debug!(resolver = resolver.id(), uri = %canonical, "resolver claimed uri");
                return Ok(self.install(&canonical, source));
            }
        }

        Err(SourceError::UnsupportedScheme {
            scheme: canonical.scheme().to_string(),
            uri: canonical,
        })
    }

    /// Parse `text` as an absolute URI and resolve it.
    pub fn resolve_str(&self, text: &str) -> SourceResult<Source> {
        let uri = Url::parse(text).map_err(|source| SourceError::InvalidUri {
            uri: text.to_string(),
            source,
        })?;
        self.resolve(&uri)
    }

    /// Resolve `relative` against the URI of `containing`.
    ///
    /// This is how import, export and part directives become sources.
    pub fn resolve_relative(&self, containing: &Source, relative: &str) -> SourceResult<Source> {
        let uri = resolve_reference(containing.uri(), relative)?;
        self.resolve(&uri)
    }

    /// Resolve the `file` URI of an absolute local path.
    pub fn for_path(&self, path: &Path) -> SourceResult<Source> {
        let uri = Url::from_file_path(path).map_err(|()| SourceError::RelativePath {
            path: path.to_path_buf(),
        })?;
        self.resolve(&uri)
    }

    /// Look up a cached source without running the resolver chain.
    pub fn cached(&self, uri: &Url) -> Option<Source> {
        self.shared.cache.read().get(uri).cloned()
    }

    /// Number of cache entries.
    pub fn cache_len(&self) -> usize {
        self.shared.cache.read().len()
    }

    /// Drop every cached identity.
    ///
    /// Sources resolved afterwards are new instances, so this is only meant for
    /// tests and full resets. Overlays are kept.
    pub fn clear_cache(&self) {
        self.shared.cache.write().clear();
    }

    /// Identifiers of the registered resolvers in chain order.
    pub fn resolver_ids(&self) -> Vec<&'static str> {
        self.shared.resolvers.iter().map(|r| r.id()).collect()
    }

    /// Install (`Some`) or remove (`None`) in-memory content for `source`.
    ///
    /// Returns the previous overlay text, if any.
    pub fn set_overlay(&self, source: &Source, contents: Option<String>) -> Option<String> {
        self.shared
            .overlays
            .set(source.uri(), contents)
            .map(|text| text.to_string())
    }

    /// Number of installed overlays.
    pub fn overlay_count(&self) -> usize {
        self.shared.overlays.len()
    }

    /// True if both handles share the same cache.
    pub fn ptr_eq(a: &SourceFactory, b: &SourceFactory) -> bool {
        Arc::ptr_eq(&a.shared, &b.shared)
    }

    pub(super) fn downgrade(&self) -> Weak<FactoryShared> {
        Arc::downgrade(&self.shared)
    }

    pub(super) fn upgrade(shared: &Weak<FactoryShared>) -> Option<Self> {
        shared.upgrade().map(|shared| Self { shared })
    }

    /// Keep at most one instance per URI: if another thread installed first,
    /// its instance wins and `source` is discarded.
    fn install(&self, requested: &Url, source: Source) -> Source {
        let mut cache = self.shared.cache.write();
        if let Some(existing) = cache.get(requested).or_else(|| cache.get(source.uri())) {
            tracing::trace!(uri = %requested, "lost cache race, using installed source");
            return existing.clone();
        }
        cache.insert(source.uri().clone(), source.clone());
        if source.uri() != requested {
            cache.insert(requested.clone(), source.clone());
        }
        source
    }
}

impl fmt::Debug for SourceFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceFactory")
            .field("resolvers", &self.resolver_ids())
            .field("cached", &self.cache_len())
            .finish()
    }
}
