//! Config store for locating and loading locus.toml.

use std::path::{Path, PathBuf};

use anyhow::Context;

use super::{EngineConfig, global_config_path, parser, project_config_path};

#[derive(Debug, Clone)]
pub struct ConfigStore {
    config_path: Option<PathBuf>,
}

impl ConfigStore {
    /// Locate the configuration: an explicit path, else the project file, else
    /// the global file. Only an explicit path is required to exist.
    pub fn discover(explicit: Option<PathBuf>, project_root: &Path) -> anyhow::Result<Self> {
        if let Some(path) = explicit {
            if !path.is_file() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            return Ok(Self::from_path(path));
        }

        let project = project_config_path(project_root);
        if project.is_file() {
            return Ok(Self::from_path(project));
        }

        let config_path = global_config_path().filter(|path| path.is_file());
        Ok(Self { config_path })
    }

    /// Discover relative to the current directory.
    pub fn from_current_dir(explicit: Option<PathBuf>) -> anyhow::Result<Self> {
        let project_root =
            std::env::current_dir().context("Could not determine current directory")?;
        Self::discover(explicit, &project_root)
    }

    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: Some(path.into()),
        }
    }

    /// The file that will be loaded, if any.
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// Load the configuration; without a file, the default (file resolver only).
    pub fn load(&self) -> anyhow::Result<EngineConfig> {
        match &self.config_path {
            Some(path) if path.exists() => {
                tracing::debug!(path = %path.display(), "loading engine config");
                parser::parse_locus_toml(path)
            }
            _ => Ok(EngineConfig::new()),
        }
    }

    pub fn save(&self, config: &EngineConfig) -> anyhow::Result<()> {
        let path = self
            .config_path
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("No config file path to save to"))?;
        let content = parser::to_toml(config)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }
}
