//! The analysis engine: the single point of resolution configuration.
//!
//! An [`AnalysisEngine`] is normally built once at startup and passed down to the
//! subsystems that need it. For callers that cannot thread it through,
//! [`AnalysisEngine::instance`] exposes one lazily created process-wide engine.
//! That instance is shared state: tests touching it must call
//! [`AnalysisEngine::reset`] when they are done.

use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;

use crate::config::EngineConfig;
use crate::logging::{Logger, NullLogger};
use crate::source::SourceFactory;

static INSTANCE: OnceLock<AnalysisEngine> = OnceLock::new();

/// Holds the active source factory and the error logging sink.
#[derive(Debug)]
pub struct AnalysisEngine {
    source_factory: RwLock<Option<SourceFactory>>,
    logger: RwLock<Arc<dyn Logger>>,
}

impl Default for AnalysisEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisEngine {
    /// Create an engine with no source factory and a no-op logger.
    pub fn new() -> Self {
        Self {
            source_factory: RwLock::new(None),
            logger: RwLock::new(Arc::new(NullLogger)),
        }
    }

    /// Create an engine whose source factory is built from `config`.
    pub fn from_config(config: &EngineConfig) -> anyhow::Result<Self> {
        let engine = Self::new();
        engine.set_source_factory(Some(config.build_factory()?));
        Ok(engine)
    }

    /// The process-wide engine, created on first use and never re-created.
    pub fn instance() -> &'static AnalysisEngine {
        INSTANCE.get_or_init(AnalysisEngine::new)
    }

    /// The active source factory, or `None` if none has been configured.
    pub fn source_factory(&self) -> Option<SourceFactory> {
        self.source_factory.read().clone()
    }

    /// Replace the active source factory.
    ///
    /// Sources already resolved by the previous factory keep working against it.
    pub fn set_source_factory(&self, factory: Option<SourceFactory>) {
        tracing::debug!(configured = factory.is_some(), "replacing source factory");
        *self.source_factory.write() = factory;
    }

    /// The logger receiving errors from within the engine. Never absent.
    pub fn logger(&self) -> Arc<dyn Logger> {
        Arc::clone(&self.logger.read())
    }

    /// Replace the logger; `None` installs the no-op logger.
    pub fn set_logger(&self, logger: Option<Arc<dyn Logger>>) {
        *self.logger.write() = logger.unwrap_or_else(|| Arc::new(NullLogger));
    }

    /// Restore the defaults: no source factory and the no-op logger.
    pub fn reset(&self) {
        self.set_source_factory(None);
        self.set_logger(None);
    }
}
