//! ruleforge binary crate: CLI wiring and config-to-pipeline planning.

pub mod cli;
pub mod plan;

pub use cli::Args;
