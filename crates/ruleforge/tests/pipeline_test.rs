//! End-to-end pipeline tests: determinism, dedup, change gating, and
//! agreement between the flat-list and structured artifacts.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use ruleforge::plan;
use ruleforge_rules::pipeline::{GroupSpec, GroupStatus, SourceSpec};
use ruleforge_rules::provider::Locator;
use ruleforge_rules::{Dialect, FingerprintStore, Pipeline};

fn pipeline(out: &Path, fp: &Path) -> Pipeline {
    let store = Arc::new(FingerprintStore::open(fp).unwrap());
    Pipeline::new(out, store)
}

fn file_group(name: &str, path: &Path, dialect: Dialect) -> GroupSpec {
    GroupSpec {
        name: name.to_string(),
        sources: vec![SourceSpec {
            id: path.to_string_lossy().into_owned(),
            locator: Locator::Path(path.to_path_buf()),
            dialect,
            domains_as_suffix: false,
        }],
    }
}

#[tokio::test]
async fn mixed_source_dedups_and_sorts() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("mixed.list");
    fs::write(
        &src,
        "example.com\nEXAMPLE.com\n# comment\n\n10.0.0.0/8\n",
    )
    .unwrap();

    let p = pipeline(&dir.path().join("out"), &dir.path().join("fp"));
    let group = file_group("mixed", &src, Dialect::List);

    let reports = p.run(vec![group.clone()]).await;
    assert_eq!(reports[0].status, GroupStatus::Updated);

    let list = fs::read_to_string(p.list_path("mixed")).unwrap();
    let rule_lines: Vec<&str> = list
        .lines()
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .collect();
    // Case-folded duplicate collapses; domains sort before CIDRs.
    assert_eq!(rule_lines, vec!["DOMAIN,example.com", "IP-CIDR,10.0.0.0/8"]);
    assert!(list.contains("# TOTAL: 2\n"));

    // Re-run: nothing changed, artifacts byte-identical.
    let before = fs::read(p.list_path("mixed")).unwrap();
    let reports = p.run(vec![group]).await;
    assert_eq!(reports[0].status, GroupStatus::Unchanged);
    assert_eq!(fs::read(p.list_path("mixed")).unwrap(), before);
}

#[tokio::test]
async fn source_order_does_not_affect_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a.list");
    let b = dir.path().join("b.list");
    fs::write(&a, "DOMAIN,zebra.example\nIP-CIDR,192.168.0.0/16\n").unwrap();
    fs::write(&b, "DOMAIN-SUFFIX,example.org\nDOMAIN,apple.example\n").unwrap();

    let forward = pipeline(&dir.path().join("out1"), &dir.path().join("fp1"));
    let reversed = pipeline(&dir.path().join("out2"), &dir.path().join("fp2"));

    let sources = |paths: [&Path; 2]| -> GroupSpec {
        GroupSpec {
            name: "g".to_string(),
            sources: paths
                .iter()
                .map(|p| SourceSpec {
                    id: p.to_string_lossy().into_owned(),
                    locator: Locator::Path(p.to_path_buf()),
                    dialect: Dialect::List,
                    domains_as_suffix: false,
                })
                .collect(),
        }
    };

    forward.run(vec![sources([&a, &b])]).await;
    reversed.run(vec![sources([&b, &a])]).await;

    assert_eq!(
        fs::read(forward.list_path("g")).unwrap(),
        fs::read(reversed.list_path("g")).unwrap()
    );
    assert_eq!(
        fs::read(forward.ruleset_path("g")).unwrap(),
        fs::read(reversed.ruleset_path("g")).unwrap()
    );
}

#[tokio::test]
async fn single_byte_edit_dirties_only_dependent_group() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a.list");
    let b = dir.path().join("b.list");
    fs::write(&a, "DOMAIN,a.example\n").unwrap();
    fs::write(&b, "DOMAIN,b.example\n").unwrap();

    let p = pipeline(&dir.path().join("out"), &dir.path().join("fp"));
    let groups = vec![
        file_group("a", &a, Dialect::List),
        file_group("b", &b, Dialect::List),
    ];
    p.run(groups.clone()).await;

    fs::write(&a, "DOMAIN,a.example2\n").unwrap();
    let reports = p.run(groups).await;
    assert_eq!(reports[0].status, GroupStatus::Updated);
    assert_eq!(reports[1].status, GroupStatus::Unchanged);
}

#[tokio::test]
async fn list_and_ruleset_artifacts_agree() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("g.list");
    fs::write(
        &src,
        "DOMAIN,exact.example\nDOMAIN-SUFFIX,suffix.example\nDOMAIN-KEYWORD,track\nIP-CIDR,10.0.0.0/8\nIP-CIDR6,fd00::/8\n",
    )
    .unwrap();

    let p = pipeline(&dir.path().join("out"), &dir.path().join("fp"));
    p.run(vec![file_group("g", &src, Dialect::List)]).await;

    let doc: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(p.ruleset_path("g")).unwrap()).unwrap();
    assert_eq!(doc["version"], 1);
    let rules = &doc["rules"][0];
    assert_eq!(rules["domain"], serde_json::json!(["exact.example"]));
    assert_eq!(rules["domain_suffix"], serde_json::json!(["suffix.example"]));
    assert_eq!(rules["domain_keyword"], serde_json::json!(["track"]));
    // v4 then v6, merged under one key.
    assert_eq!(
        rules["ip_cidr"],
        serde_json::json!(["10.0.0.0/8", "fd00::/8"])
    );

    // Total entry count matches the flat list.
    let list = fs::read_to_string(p.list_path("g")).unwrap();
    let listed = list
        .lines()
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .count();
    assert_eq!(listed, 5);
}

#[tokio::test]
async fn structured_artifact_round_trips_as_source() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("g.list");
    fs::write(&src, "DOMAIN,exact.example\nIP-CIDR,10.0.0.0/8\n").unwrap();

    let first = pipeline(&dir.path().join("out1"), &dir.path().join("fp1"));
    first.run(vec![file_group("g", &src, Dialect::List)]).await;

    // Feed the emitted JSON back in as a rule-set source.
    let second = pipeline(&dir.path().join("out2"), &dir.path().join("fp2"));
    second
        .run(vec![file_group(
            "g",
            &first.ruleset_path("g"),
            Dialect::RuleSet,
        )])
        .await;

    assert_eq!(
        fs::read(first.list_path("g")).unwrap(),
        fs::read(second.list_path("g")).unwrap()
    );
}

#[tokio::test]
async fn directory_scan_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let rules = dir.path().join("rules");
    fs::create_dir(&rules).unwrap();
    fs::write(rules.join("ads.list"), "DOMAIN-SUFFIX,ads.example\n").unwrap();
    fs::write(
        rules.join("direct.yaml"),
        "domain:\n  - intranet.example\n",
    )
    .unwrap();

    let groups = plan::groups_from_path(&rules, None).unwrap();
    let p = pipeline(&dir.path().join("out"), &dir.path().join("fp"));
    let reports = p.run(groups).await;

    assert_eq!(reports.len(), 2);
    assert!(reports.iter().all(|r| r.status == GroupStatus::Updated));
    assert!(p.list_path("ads").exists());
    assert!(p.ruleset_path("direct").exists());
    let direct = fs::read_to_string(p.list_path("direct")).unwrap();
    assert!(direct.contains("DOMAIN,intranet.example"));
}
