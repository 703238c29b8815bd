//! Configuration system for propsync.
//! TOML-based, layered resolution: CLI > env > project > user > defaults.

pub mod applier_config;
pub mod logging_config;
pub mod propsync_config;
pub mod schema_config;

pub use applier_config::ApplierConfig;
pub use logging_config::{LogFormat, LoggingConfig};
pub use propsync_config::{CliOverrides, PropsyncConfig};
pub use schema_config::{PropertyEntryConfig, SchemaConfig};
