//! Sources and the factory that resolves them.
//!
//! This module provides the identity layer of the engine:
//! - [`Source`]: an immutable handle for one unit of content, read lazily
//! - [`SourceFactory`]: the caching authority that runs the resolver chain
//! - relative-reference combination against a containing source's URI

mod factory;
mod handle;
mod overlay;
pub mod uri;

pub use factory::{SourceFactory, SourceFactoryBuilder};
pub use handle::Source;
