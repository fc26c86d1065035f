//! Locus Core Library
//!
//! Turns the URIs named by import, export and part directives into stable,
//! re-readable source handles. Resolution runs through an ordered chain of
//! scheme-specific resolvers owned by a caching source factory.

pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod resolver;
pub mod source;

/// Re-exports of commonly used types
pub mod prelude {
    // Engine
    pub use crate::engine::AnalysisEngine;

    // Errors
    pub use crate::error::{SourceError, SourceResult};

    // Logging
    pub use crate::logging::{Logger, NullLogger, TracingLogger};

    // Sources
    pub use crate::source::{Source, SourceFactory};

    // Resolvers
    pub use crate::resolver::{
        FileUriResolver, PackageUriResolver, ResolverKind, SdkLibraries, SdkUriResolver,
        UriResolver,
    };

    // Configuration
    pub use crate::config::{ConfigStore, EngineConfig};
}
