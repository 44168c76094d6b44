//! Build pipeline group specs from configuration or a rules path.

use std::collections::HashSet;
use std::io;
use std::path::Path;

use ruleforge_config::Config;
use ruleforge_rules::pipeline::{GroupSpec, SourceSpec};
use ruleforge_rules::{Dialect, provider::Locator};
use tracing::debug;

/// Turn configured groups into pipeline specs.
pub fn groups_from_config(config: &Config) -> Vec<GroupSpec> {
    config
        .groups
        .iter()
        .map(|group| GroupSpec {
            name: group.name.clone(),
            sources: group
                .sources
                .iter()
                .map(|source| SourceSpec {
                    id: source.effective_id(),
                    locator: match (&source.path, &source.url) {
                        (Some(path), _) => Locator::Path(path.into()),
                        (None, Some(url)) => Locator::Url(url.clone()),
                        // validate_config rejects sources with no locator
                        (None, None) => Locator::Path(Default::default()),
                    },
                    dialect: source.dialect,
                    domains_as_suffix: source.domains_as_suffix,
                })
                .collect(),
        })
        .collect()
}

/// Synthesize one group per recognized rules file under `path`.
///
/// A file path yields a single group named after its stem; a directory is
/// scanned non-recursively for recognized extensions. `dialect_override`
/// replaces the extension-based inference for every file.
pub fn groups_from_path(
    path: &Path,
    dialect_override: Option<Dialect>,
) -> io::Result<Vec<GroupSpec>> {
    let mut groups = Vec::new();
    if path.is_dir() {
        let mut entries: Vec<_> = std::fs::read_dir(path)?
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .map(|e| e.path())
            .filter(|p| p.is_file())
            .collect();
        // Directory iteration order is filesystem-dependent; sort for
        // stable group ordering.
        entries.sort();
        for file in entries {
            match group_for_file(&file, dialect_override) {
                Some(group) => groups.push(group),
                None => debug!(file = %file.display(), "skipping unrecognized file"),
            }
        }
    } else {
        match group_for_file(path, dialect_override) {
            Some(group) => groups.push(group),
            None => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("unrecognized rules file: {}", path.display()),
                ));
            }
        }
    }
    Ok(groups)
}

fn group_for_file(path: &Path, dialect_override: Option<Dialect>) -> Option<GroupSpec> {
    let stem = path.file_stem()?.to_str()?.to_string();
    let dialect = match dialect_override {
        Some(d) => d,
        None => infer_dialect(path)?,
    };
    Some(GroupSpec {
        name: stem,
        sources: vec![SourceSpec {
            id: path.to_string_lossy().into_owned(),
            locator: Locator::Path(path.to_path_buf()),
            dialect,
            domains_as_suffix: false,
        }],
    })
}

/// Reject duplicate group names across the whole planned set.
///
/// Groups sharing a name would run concurrently and race on the same
/// artifact paths. Config-internal duplicates are caught at validation; this
/// also covers scanned files sharing a stem (`a.list` + `a.json`) and
/// collisions between scanned and configured groups.
pub fn check_unique_names(groups: &[GroupSpec]) -> Result<(), String> {
    let mut seen = HashSet::new();
    for group in groups {
        if !seen.insert(group.name.as_str()) {
            return Err(format!(
                "duplicate group name '{}': groups would overwrite each other's artifacts",
                group.name
            ));
        }
    }
    Ok(())
}

fn infer_dialect(path: &Path) -> Option<Dialect> {
    match path.extension()?.to_str()? {
        "list" | "txt" | "conf" => Some(Dialect::List),
        "yaml" | "yml" | "json" => Some(Dialect::RuleSet),
        _ => None,
    }
}
