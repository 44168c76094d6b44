//! CLI for the ruleforge binary.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use ruleforge_config::{
    CliOverrides, LoggingConfig, apply_overrides, load_config, validate_config,
};
use ruleforge_rules::{CompilerSpec, FingerprintStore, Pipeline};

use crate::plan;

/// ruleforge CLI arguments.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "ruleforge",
    version,
    about = "Aggregate network rule lists into deterministic artifacts"
)]
pub struct Args {
    /// Rules file or directory; each recognized file becomes a group.
    /// Processed in addition to any groups in the config file.
    pub rules_path: Option<PathBuf>,

    /// Config file path (json/yaml/toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Force dialect for rules-path files instead of inferring by extension
    #[arg(long)]
    pub dialect: Option<ruleforge_rules::Dialect>,

    /// Regenerate all groups regardless of fingerprints
    #[arg(long)]
    pub force: bool,

    #[command(flatten)]
    pub overrides: CliOverrides,
}

/// Run the pipeline with the given arguments.
///
/// The exit code is non-zero iff any group failed (or setup itself did).
pub async fn run(args: Args) -> ExitCode {
    let mut config = match args.config.as_ref().map(load_config).transpose() {
        Ok(config) => config.unwrap_or_default(),
        Err(e) => {
            eprintln!("ruleforge: failed to load config: {e}");
            return ExitCode::FAILURE;
        }
    };
    apply_overrides(&mut config, &args.overrides);
    if let Err(e) = validate_config(&config) {
        eprintln!("ruleforge: invalid config: {e}");
        return ExitCode::FAILURE;
    }

    init_tracing(&config.logging);

    let mut groups = plan::groups_from_config(&config);
    if let Some(path) = &args.rules_path {
        match plan::groups_from_path(path, args.dialect) {
            Ok(mut synthesized) => groups.append(&mut synthesized),
            Err(e) => {
                error!("failed to scan {}: {e}", path.display());
                return ExitCode::FAILURE;
            }
        }
    }
    if groups.is_empty() {
        error!("nothing to do: no groups configured and no rules path given");
        return ExitCode::FAILURE;
    }
    if let Err(e) = plan::check_unique_names(&groups) {
        error!("{e}");
        return ExitCode::FAILURE;
    }

    let store = match FingerprintStore::open(&config.output.fingerprint_dir) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            error!("failed to open fingerprint store: {e}");
            return ExitCode::FAILURE;
        }
    };

    let pipeline = Pipeline::new(&config.output.dir, store)
        .with_force(args.force)
        .with_compiler(config.compiler.as_ref().map(|c| CompilerSpec {
            command: c.command.clone(),
            args: c.args.clone(),
            extension: c.extension.clone(),
        }));

    let reports = pipeline.run(groups).await;

    let mut failed = 0usize;
    for report in &reports {
        info!(group = %report.group, status = %report.status, "group finished");
        if report.is_failed() {
            failed += 1;
        }
    }
    if failed > 0 {
        error!("{failed} of {} group(s) failed", reports.len());
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

/// Initialize the tracing subscriber from logging config.
///
/// `RUST_LOG` takes precedence over the configured level.
fn init_tracing(config: &LoggingConfig) {
    let level = config.level.as_deref().unwrap_or("info");
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
