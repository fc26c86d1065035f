//! Configuration schema for locus.toml

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::resolver::{
    FileUriResolver, PackageUriResolver, ResolverKind, SdkLibraries, SdkUriResolver, UriResolver,
};
use crate::source::SourceFactory;

/// Root configuration structure for locus.toml
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Resolver chain in registration order; first match wins
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolvers: Option<Vec<ResolverKind>>,

    /// Directory holding one subdirectory per package
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_root: Option<PathBuf>,

    /// Explicit core-library URI -> file overrides
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub url_mapping: HashMap<String, PathBuf>,

    /// SDK serving the core libraries
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sdk: Option<SdkConfig>,
}

/// SDK location and extra libraries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SdkConfig {
    /// SDK root; libraries live under `<path>/lib`
    pub path: PathBuf,

    /// Libraries beyond the built-in table: name -> file under `lib/`
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub libraries: BTreeMap<String, PathBuf>,
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// The effective resolver order.
    ///
    /// Without an explicit list: `sdk` if configured, `package` if configured, then `file`.
    pub fn resolver_order(&self) -> Vec<ResolverKind> {
        if let Some(explicit) = &self.resolvers {
            return explicit.clone();
        }
        let mut order = Vec::new();
        if self.sdk.is_some() {
            order.push(ResolverKind::Sdk);
        }
        if self.package_root.is_some() {
            order.push(ResolverKind::Package);
        }
        order.push(ResolverKind::File);
        order
    }

    /// Anchor relative paths at `base_dir` (the directory of the config file).
    pub fn resolve_paths(&mut self, base_dir: &Path) {
        let anchor = |path: &mut PathBuf| {
            if path.is_relative() {
                *path = base_dir.join(&*path);
            }
        };
        if let Some(root) = self.package_root.as_mut() {
            anchor(root);
        }
        if let Some(sdk) = self.sdk.as_mut() {
            anchor(&mut sdk.path);
        }
        self.url_mapping.values_mut().for_each(anchor);
    }

    /// Check the configuration for contradictions.
    pub fn validate(&self) -> anyhow::Result<()> {
        let order = self.resolver_order();

        let mut seen = HashSet::new();
        for kind in &order {
            if !seen.insert(kind) {
                anyhow::bail!("resolvers: '{}' is listed more than once", kind);
            }
        }

        if order.contains(&ResolverKind::Sdk) && self.sdk.is_none() {
            anyhow::bail!("resolvers: 'sdk' requires an [sdk] section");
        }
        if order.contains(&ResolverKind::Package) && self.package_root.is_none() {
            anyhow::bail!("resolvers: 'package' requires package_root");
        }

        if let Some(sdk) = &self.sdk {
            if sdk.path.as_os_str().is_empty() {
                anyhow::bail!("sdk.path must not be empty");
            }
            for (name, path) in &sdk.libraries {
                if name.is_empty() || name.contains('/') {
                    anyhow::bail!("sdk.libraries: invalid library name '{}'", name);
                }
                if path.as_os_str().is_empty() {
                    anyhow::bail!("sdk.libraries.{}: path must not be empty", name);
                }
            }
        }

        for key in self.url_mapping.keys() {
            Url::parse(key).with_context(|| format!("url_mapping: '{}' is not a URI", key))?;
        }

        Ok(())
    }

    /// Build the source factory described by this configuration.
    pub fn build_factory(&self) -> anyhow::Result<SourceFactory> {
        self.validate()?;

        let mut builder = SourceFactory::builder();
        for kind in self.resolver_order() {
            builder = builder.boxed_resolver(self.build_resolver(kind)?);
        }
        Ok(builder.build())
    }

    fn build_resolver(&self, kind: ResolverKind) -> anyhow::Result<Box<dyn UriResolver>> {
        let resolver: Box<dyn UriResolver> = match kind {
            ResolverKind::File => Box::new(FileUriResolver::new()),
            ResolverKind::Package => {
                let root = self
                    .package_root
                    .as_ref()
                    .ok_or_else(|| anyhow::anyhow!("package resolver requires package_root"))?;
                Box::new(PackageUriResolver::new(root.clone()))
            }
            ResolverKind::Sdk => {
                let sdk = self
                    .sdk
                    .as_ref()
                    .ok_or_else(|| anyhow::anyhow!("sdk resolver requires an [sdk] section"))?;
                let mut libraries = SdkLibraries::builtin();
                for (name, path) in &sdk.libraries {
                    libraries.insert(name.clone(), path.clone());
                }
                Box::new(
                    SdkUriResolver::new(sdk.path.clone())
                        .with_libraries(libraries)
                        .with_url_mapping(self.url_mapping.clone()),
                )
            }
        };
        Ok(resolver)
    }
}
