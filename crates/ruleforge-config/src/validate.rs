//! Configuration validation logic.

use std::collections::HashSet;

use crate::Config;
use crate::loader::ConfigError;

pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.output.dir.trim().is_empty() {
        return Err(ConfigError::Validation("output.dir is empty".into()));
    }
    if config.output.fingerprint_dir.trim().is_empty() {
        return Err(ConfigError::Validation(
            "output.fingerprint_dir is empty".into(),
        ));
    }
    if let Some(compiler) = &config.compiler {
        if compiler.command.trim().is_empty() {
            return Err(ConfigError::Validation("compiler.command is empty".into()));
        }
        if compiler.extension.trim().is_empty() || compiler.extension.contains('/') {
            return Err(ConfigError::Validation(
                "compiler.extension must be a bare file extension".into(),
            ));
        }
        if !compiler.args.iter().any(|a| a.contains("{input}")) {
            return Err(ConfigError::Validation(
                "compiler.args must reference {input}".into(),
            ));
        }
    }

    let mut names = HashSet::new();
    for group in &config.groups {
        if group.name.trim().is_empty() {
            return Err(ConfigError::Validation("group name is empty".into()));
        }
        // Group names become file names: keep them path-safe.
        if group
            .name
            .chars()
            .any(|c| !(c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.'))
        {
            return Err(ConfigError::Validation(format!(
                "group name '{}' contains path-unsafe characters",
                group.name
            )));
        }
        if !names.insert(group.name.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate group name '{}'",
                group.name
            )));
        }
        if group.sources.is_empty() {
            return Err(ConfigError::Validation(format!(
                "group '{}' has no sources",
                group.name
            )));
        }
        for source in &group.sources {
            match (&source.path, &source.url) {
                (Some(_), Some(_)) => {
                    return Err(ConfigError::Validation(format!(
                        "group '{}': a source sets both 'path' and 'url'",
                        group.name
                    )));
                }
                (None, None) => {
                    return Err(ConfigError::Validation(format!(
                        "group '{}': a source sets neither 'path' nor 'url'",
                        group.name
                    )));
                }
                _ => {}
            }
        }
    }
    Ok(())
}
