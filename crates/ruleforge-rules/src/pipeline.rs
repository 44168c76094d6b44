//! Pipeline orchestrator: drives fetch → parse → aggregate → emit per group.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{debug, error, info};

use crate::compile::{self, CompilerSpec};
use crate::error::RulesError;
use crate::fingerprint::{FingerprintStore, SourceState, digest};
use crate::group::{RuleGroup, aggregate};
use crate::parser::{Dialect, parse_source};
use crate::provider::{self, Locator};
use crate::{emit, rule};

/// One source feeding a group.
#[derive(Debug, Clone)]
pub struct SourceSpec {
    /// Stable identifier used for fingerprint records and diagnostics.
    pub id: String,
    pub locator: Locator,
    pub dialect: Dialect,
    /// Classify bare hostnames in this source as suffix rules.
    pub domains_as_suffix: bool,
}

/// One rule group: a name plus the sources feeding it.
#[derive(Debug, Clone)]
pub struct GroupSpec {
    pub name: String,
    pub sources: Vec<SourceSpec>,
}

/// Outcome of processing one group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupStatus {
    /// All sources matched their recorded fingerprints; nothing rewritten.
    Unchanged,
    /// Artifacts regenerated and fingerprints committed.
    Updated,
    /// The group aborted; prior artifacts and fingerprints are untouched.
    Failed(String),
}

impl std::fmt::Display for GroupStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GroupStatus::Unchanged => f.write_str("unchanged"),
            GroupStatus::Updated => f.write_str("updated"),
            GroupStatus::Failed(reason) => write!(f, "failed({reason})"),
        }
    }
}

/// Per-group report returned by [`Pipeline::run`], in input order.
#[derive(Debug, Clone)]
pub struct GroupReport {
    pub group: String,
    pub status: GroupStatus,
}

impl GroupReport {
    pub fn is_failed(&self) -> bool {
        matches!(self.status, GroupStatus::Failed(_))
    }
}

/// The pipeline: owns the output directory, the fingerprint ledger, and the
/// optional external compiler. Cheap to clone; clones share the ledger.
#[derive(Clone)]
pub struct Pipeline {
    output_dir: PathBuf,
    store: Arc<FingerprintStore>,
    force: bool,
    compiler: Option<CompilerSpec>,
}

impl Pipeline {
    pub fn new(output_dir: impl Into<PathBuf>, store: Arc<FingerprintStore>) -> Self {
        Self {
            output_dir: output_dir.into(),
            store,
            force: false,
            compiler: None,
        }
    }

    /// Regenerate every group regardless of fingerprints.
    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Attach an external compiler producing the binary artifact.
    pub fn with_compiler(mut self, compiler: Option<CompilerSpec>) -> Self {
        self.compiler = compiler;
        self
    }

    pub fn list_path(&self, group: &str) -> PathBuf {
        self.output_dir.join(format!("{group}.list"))
    }

    pub fn ruleset_path(&self, group: &str) -> PathBuf {
        self.output_dir.join(format!("{group}.json"))
    }

    pub fn compiled_path(&self, group: &str) -> Option<PathBuf> {
        self.compiler
            .as_ref()
            .map(|c| self.output_dir.join(format!("{group}.{}", c.extension)))
    }

    /// Process all groups concurrently and report per-group outcomes in
    /// input order. No group's failure affects another group.
    pub async fn run(&self, groups: Vec<GroupSpec>) -> Vec<GroupReport> {
        let names: Vec<String> = groups.iter().map(|g| g.name.clone()).collect();
        let mut set = JoinSet::new();

        for (idx, spec) in groups.into_iter().enumerate() {
            let pipeline = self.clone();
            set.spawn(async move {
                let status = match pipeline.run_group(&spec).await {
                    Ok(status) => status,
                    Err(e) => {
                        error!(group = %spec.name, "group failed: {e}");
                        GroupStatus::Failed(e.to_string())
                    }
                };
                (idx, status)
            });
        }

        let mut statuses: Vec<Option<GroupStatus>> = vec![None; names.len()];
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((idx, status)) => statuses[idx] = Some(status),
                Err(e) => error!("group task aborted: {e}"),
            }
        }

        names
            .into_iter()
            .zip(statuses)
            .map(|(group, status)| GroupReport {
                group,
                status: status.unwrap_or(GroupStatus::Failed("task aborted".to_string())),
            })
            .collect()
    }

    /// Process a single group end to end.
    pub async fn run_group(&self, spec: &GroupSpec) -> Result<GroupStatus, RulesError> {
        // Fetch every source up front; a fetch failure aborts the group
        // before anything is touched.
        let mut fetched = Vec::with_capacity(spec.sources.len());
        for source in &spec.sources {
            let bytes = provider::fetch(&source.id, &source.locator).await?;
            let content_digest = digest(&bytes);
            fetched.push((source, bytes, content_digest));
        }

        if !self.is_dirty(spec, &fetched) {
            debug!(group = %spec.name, "all sources unchanged, skipping");
            return Ok(GroupStatus::Unchanged);
        }

        // Any change in any source forces full re-aggregation of the group:
        // aggregation is cheap and deterministic, partial patching is not.
        let mut per_source = Vec::with_capacity(fetched.len());
        for (source, bytes, _) in &fetched {
            let content = String::from_utf8_lossy(bytes);
            per_source.push(parse_source(
                &source.id,
                &content,
                source.dialect,
                source.domains_as_suffix,
            )?);
        }

        let group = aggregate(&spec.name, per_source);
        self.write_artifacts(&group).await?;

        // Only now that every artifact exists do the fingerprints advance;
        // a failure above leaves the old records so the next run retries.
        for (source, _, content_digest) in &fetched {
            self.store.commit(&source.id, content_digest)?;
        }

        info!(
            group = %spec.name,
            entries = group.len(),
            domains = group.count_of(rule::RuleKind::Domain),
            suffixes = group.count_of(rule::RuleKind::DomainSuffix),
            "group updated"
        );
        Ok(GroupStatus::Updated)
    }

    /// A group is dirty when forced, when any source digest differs from
    /// its record, or when an expected artifact is missing on disk (so a
    /// deleted output heals on the next run).
    fn is_dirty(&self, spec: &GroupSpec, fetched: &[(&SourceSpec, Vec<u8>, String)]) -> bool {
        if self.force {
            return true;
        }
        if fetched
            .iter()
            .any(|(s, _, d)| self.store.state(&s.id, d) == SourceState::Changed)
        {
            return true;
        }
        if !self.list_path(&spec.name).exists() || !self.ruleset_path(&spec.name).exists() {
            return true;
        }
        match self.compiled_path(&spec.name) {
            Some(path) => !path.exists(),
            None => false,
        }
    }

    /// Render and compile every artifact at staging paths, then rename the
    /// whole set into place. A failure at any step (compilation included)
    /// leaves the group's previous artifacts untouched.
    async fn write_artifacts(&self, group: &RuleGroup) -> Result<(), RulesError> {
        let mut staged: Vec<(PathBuf, PathBuf)> = Vec::new();
        let result = self.stage_and_promote(group, &mut staged).await;
        if result.is_err() {
            for (tmp, _) in &staged {
                let _ = std::fs::remove_file(tmp);
            }
        }
        result
    }

    async fn stage_and_promote(
        &self,
        group: &RuleGroup,
        staged: &mut Vec<(PathBuf, PathBuf)>,
    ) -> Result<(), RulesError> {
        let emission_err = |reason: String| RulesError::Emission {
            group: group.name().to_string(),
            reason,
        };

        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|e| emission_err(format!("{}: {e}", self.output_dir.display())))?;

        let list_path = self.list_path(group.name());
        let list_tmp = staging_path(&list_path);
        tokio::fs::write(&list_tmp, emit::render_list(group))
            .await
            .map_err(|e| emission_err(format!("{}: {e}", list_tmp.display())))?;
        staged.push((list_tmp, list_path));

        let ruleset = emit::render_ruleset(group)?;
        let ruleset_path = self.ruleset_path(group.name());
        let ruleset_tmp = staging_path(&ruleset_path);
        tokio::fs::write(&ruleset_tmp, ruleset)
            .await
            .map_err(|e| emission_err(format!("{}: {e}", ruleset_tmp.display())))?;
        let compile_input = ruleset_tmp.clone();
        staged.push((ruleset_tmp, ruleset_path));

        if let Some(compiler) = &self.compiler {
            let output = self
                .output_dir
                .join(format!("{}.{}", group.name(), compiler.extension));
            let output_tmp = staging_path(&output);
            staged.push((output_tmp.clone(), output));
            compile::compile(compiler, group.name(), &compile_input, &output_tmp).await?;
        }

        for (tmp, path) in staged.iter() {
            replace_file(tmp, path)
                .map_err(|e| emission_err(format!("{}: {e}", path.display())))?;
        }
        Ok(())
    }
}

fn staging_path(path: &Path) -> PathBuf {
    let mut os = path.as_os_str().to_os_string();
    os.push(".tmp");
    PathBuf::from(os)
}

fn replace_file(tmp: &Path, path: &Path) -> std::io::Result<()> {
    // On Windows, rename fails if the destination exists; remove it first.
    #[cfg(target_os = "windows")]
    {
        let _ = std::fs::remove_file(path);
    }
    std::fs::rename(tmp, path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file_source(id: &str, path: PathBuf, dialect: Dialect) -> SourceSpec {
        SourceSpec {
            id: id.to_string(),
            locator: Locator::Path(path),
            dialect,
            domains_as_suffix: false,
        }
    }

    fn pipeline(out: &std::path::Path, fp: &std::path::Path) -> Pipeline {
        let store = Arc::new(FingerprintStore::open(fp).unwrap());
        Pipeline::new(out, store)
    }

    #[tokio::test]
    async fn first_run_updates_second_run_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("a.list");
        std::fs::write(&src, "DOMAIN,example.com\n").unwrap();

        let p = pipeline(&dir.path().join("out"), &dir.path().join("fp"));
        let spec = GroupSpec {
            name: "a".to_string(),
            sources: vec![file_source("a", src.clone(), Dialect::List)],
        };

        assert_eq!(p.run_group(&spec).await.unwrap(), GroupStatus::Updated);
        assert!(p.list_path("a").exists());
        assert!(p.ruleset_path("a").exists());
        assert_eq!(p.run_group(&spec).await.unwrap(), GroupStatus::Unchanged);
    }

    #[tokio::test]
    async fn changed_source_regenerates() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("a.list");
        std::fs::write(&src, "DOMAIN,example.com\n").unwrap();

        let p = pipeline(&dir.path().join("out"), &dir.path().join("fp"));
        let spec = GroupSpec {
            name: "a".to_string(),
            sources: vec![file_source("a", src.clone(), Dialect::List)],
        };
        p.run_group(&spec).await.unwrap();

        std::fs::write(&src, "DOMAIN,example.org\n").unwrap();
        assert_eq!(p.run_group(&spec).await.unwrap(), GroupStatus::Updated);
        let list = std::fs::read_to_string(p.list_path("a")).unwrap();
        assert!(list.contains("example.org"));
        assert!(!list.contains("example.com"));
    }

    #[tokio::test]
    async fn missing_artifact_heals_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("a.list");
        std::fs::write(&src, "DOMAIN,example.com\n").unwrap();

        let p = pipeline(&dir.path().join("out"), &dir.path().join("fp"));
        let spec = GroupSpec {
            name: "a".to_string(),
            sources: vec![file_source("a", src, Dialect::List)],
        };
        p.run_group(&spec).await.unwrap();

        std::fs::remove_file(p.list_path("a")).unwrap();
        assert_eq!(p.run_group(&spec).await.unwrap(), GroupStatus::Updated);
        assert!(p.list_path("a").exists());
    }

    #[tokio::test]
    async fn force_regenerates_unchanged_group() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("a.list");
        std::fs::write(&src, "DOMAIN,example.com\n").unwrap();

        let store = Arc::new(FingerprintStore::open(dir.path().join("fp")).unwrap());
        let p = Pipeline::new(dir.path().join("out"), store.clone());
        let spec = GroupSpec {
            name: "a".to_string(),
            sources: vec![file_source("a", src, Dialect::List)],
        };
        p.run_group(&spec).await.unwrap();

        let forced = p.clone().with_force(true);
        assert_eq!(forced.run_group(&spec).await.unwrap(), GroupStatus::Updated);
    }

    #[tokio::test]
    async fn failed_group_keeps_fingerprints_and_other_groups_proceed() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.list");
        let bad = dir.path().join("bad.yaml");
        std::fs::write(&good, "DOMAIN,example.com\n").unwrap();
        std::fs::write(&bad, "- not\n- a\n- mapping\n").unwrap();

        let store = Arc::new(FingerprintStore::open(dir.path().join("fp")).unwrap());
        let p = Pipeline::new(dir.path().join("out"), store.clone());
        let groups = vec![
            GroupSpec {
                name: "good".to_string(),
                sources: vec![file_source("good", good, Dialect::List)],
            },
            GroupSpec {
                name: "bad".to_string(),
                sources: vec![file_source("bad", bad.clone(), Dialect::RuleSet)],
            },
        ];

        let reports = p.run(groups.clone()).await;
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].group, "good");
        assert_eq!(reports[0].status, GroupStatus::Updated);
        assert!(reports[1].is_failed());
        assert!(!p.ruleset_path("bad").exists());

        // The failed source has no fingerprint, so fixing it triggers a build.
        assert!(store.recorded("bad").is_none());
        std::fs::write(&bad, "domain:\n  - example.net\n").unwrap();
        let reports = p.run(groups).await;
        assert_eq!(reports[1].status, GroupStatus::Updated);
    }

    #[tokio::test]
    async fn failed_compile_keeps_prior_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("g.list");
        std::fs::write(&src, "DOMAIN,old.example\n").unwrap();

        let out = dir.path().join("out");
        let p = pipeline(&out, &dir.path().join("fp"));
        let spec = GroupSpec {
            name: "g".to_string(),
            sources: vec![file_source("g", src.clone(), Dialect::List)],
        };
        p.run_group(&spec).await.unwrap();

        std::fs::write(&src, "DOMAIN,new.example\n").unwrap();
        let failing = p.clone().with_compiler(Some(CompilerSpec {
            command: "false".to_string(),
            args: Vec::new(),
            extension: "srs".to_string(),
        }));
        let err = failing.run_group(&spec).await.unwrap_err();
        assert!(matches!(err, RulesError::Compile { .. }));

        // Both artifacts still hold the last successful run's content.
        let list = std::fs::read_to_string(p.list_path("g")).unwrap();
        assert!(list.contains("old.example"));
        assert!(!list.contains("new.example"));
        let json = std::fs::read_to_string(p.ruleset_path("g")).unwrap();
        assert!(json.contains("old.example"));

        // No staging leftovers either.
        let leftovers = std::fs::read_dir(&out)
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().is_some_and(|x| x == "tmp"))
            .count();
        assert_eq!(leftovers, 0);
    }

    #[tokio::test]
    async fn fetch_failure_fails_group() {
        let dir = tempfile::tempdir().unwrap();
        let p = pipeline(&dir.path().join("out"), &dir.path().join("fp"));
        let spec = GroupSpec {
            name: "gone".to_string(),
            sources: vec![file_source(
                "gone",
                dir.path().join("missing.list"),
                Dialect::List,
            )],
        };
        let err = p.run_group(&spec).await.unwrap_err();
        assert!(matches!(err, RulesError::Fetch { .. }));
    }

    #[tokio::test]
    async fn shared_source_dirties_both_groups() {
        let dir = tempfile::tempdir().unwrap();
        let shared = dir.path().join("shared.list");
        let solo = dir.path().join("solo.list");
        std::fs::write(&shared, "DOMAIN,shared.com\n").unwrap();
        std::fs::write(&solo, "DOMAIN,solo.com\n").unwrap();

        let p = pipeline(&dir.path().join("out"), &dir.path().join("fp"));
        let groups = vec![
            GroupSpec {
                name: "one".to_string(),
                sources: vec![file_source("shared", shared.clone(), Dialect::List)],
            },
            GroupSpec {
                name: "two".to_string(),
                sources: vec![
                    file_source("shared", shared.clone(), Dialect::List),
                    file_source("solo", solo, Dialect::List),
                ],
            },
        ];

        p.run(groups.clone()).await;
        std::fs::write(&shared, "DOMAIN,shared.org\n").unwrap();

        let reports = p.run(groups).await;
        assert_eq!(reports[0].status, GroupStatus::Updated);
        assert_eq!(reports[1].status, GroupStatus::Updated);
    }
}
