//! ruleforge standalone binary.

use std::process::ExitCode;

use clap::Parser;
use ruleforge::{Args, cli};

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    cli::run(args).await
}
