//! CLI override definitions and application logic.

use clap::Parser;

use crate::Config;

#[derive(Debug, Clone, Parser, Default)]
pub struct CliOverrides {
    /// Override the artifact output directory
    #[arg(long)]
    pub output_dir: Option<String>,
    /// Override the fingerprint record directory
    #[arg(long)]
    pub fingerprint_dir: Option<String>,
    /// Override log level (trace/debug/info/warn/error)
    #[arg(long)]
    pub log_level: Option<String>,
    /// Disable the configured external compiler for this run
    #[arg(long)]
    pub no_compile: bool,
}

pub fn apply_overrides(config: &mut Config, overrides: &CliOverrides) {
    if let Some(v) = &overrides.output_dir {
        config.output.dir = v.clone();
    }
    if let Some(v) = &overrides.fingerprint_dir {
        config.output.fingerprint_dir = v.clone();
    }
    if let Some(v) = &overrides.log_level {
        config.logging.level = Some(v.clone());
    }
    if overrides.no_compile {
        config.compiler = None;
    }
}
