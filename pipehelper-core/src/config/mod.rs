//! Configuration system for pipehelper
//!
//! - Config: file-backed settings (TOML)
//! - ConfigLoader: locating and loading the config file

pub mod loader;
pub mod schema;

pub use loader::ConfigLoader;
pub use schema::{CommonConfig, Config, RelayConfig, StdinMode};
