//! Engine configuration loaded from `locus.toml`.
//!
//! Lookup order for the configuration file:
//! - An explicitly given path
//! - Project: ./locus.toml
//! - Global: ~/.config/locus/locus.toml

pub mod parser;
pub mod paths;
pub mod schema;
pub mod store;

pub use parser::{parse_locus_toml, parse_locus_toml_str, to_toml};
pub use paths::{CONFIG_FILE_NAME, global_config_path, project_config_path};
pub use schema::{EngineConfig, SdkConfig};
pub use store::ConfigStore;
