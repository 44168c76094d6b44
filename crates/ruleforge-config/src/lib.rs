//! Configuration loading and CLI definitions for ruleforge.

pub mod cli;
pub mod defaults;
pub mod loader;
pub mod types;
pub mod validate;

pub use cli::{CliOverrides, apply_overrides};
pub use loader::{ConfigError, load_config};
pub use types::{
    CompilerConfig, Config, GroupConfig, LoggingConfig, OutputConfig, SourceConfig,
};
pub use validate::validate_config;
