//! External rule-set compiler invocation.
//!
//! The compiled binary format is opaque here: the compiler is any external
//! command that consumes the structured artifact and writes an output file.

use std::path::Path;

use tokio::process::Command;

use crate::error::RulesError;

/// An external compiler command template.
///
/// `{input}` and `{output}` placeholders in the arguments are replaced with
/// the structured-artifact path and the compiled-output path. Example for
/// sing-box: `command = "sing-box"`,
/// `args = ["rule-set", "compile", "--output", "{output}", "{input}"]`.
#[derive(Debug, Clone)]
pub struct CompilerSpec {
    pub command: String,
    pub args: Vec<String>,
    /// File extension of the compiled artifact (e.g. "srs").
    pub extension: String,
}

/// Run the compiler for one group.
///
/// Non-zero exit status or a missing output file are `Compile` errors,
/// fatal to the owning group only.
pub async fn compile(
    spec: &CompilerSpec,
    group: &str,
    input: &Path,
    output: &Path,
) -> Result<(), RulesError> {
    let compile_err = |reason: String| RulesError::Compile {
        group: group.to_string(),
        reason,
    };

    let args: Vec<String> = spec
        .args
        .iter()
        .map(|a| {
            a.replace("{input}", &input.to_string_lossy())
                .replace("{output}", &output.to_string_lossy())
        })
        .collect();

    tracing::debug!(group = %group, command = %spec.command, ?args, "compiling rule-set");

    let status = Command::new(&spec.command)
        .args(&args)
        .status()
        .await
        .map_err(|e| compile_err(format!("failed to run '{}': {e}", spec.command)))?;

    if !status.success() {
        return Err(compile_err(format!("'{}' exited with {status}", spec.command)));
    }
    if !output.exists() {
        return Err(compile_err(format!(
            "no output file at {}",
            output.display()
        )));
    }
    Ok(())
}
