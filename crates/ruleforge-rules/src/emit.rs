//! Artifact renderers.
//!
//! Both renderers read only the in-memory [`RuleGroup`], so the flat list
//! and the structured document always agree on membership and order. Output
//! is fully deterministic: no timestamps, no environment-dependent content.

use crate::error::RulesError;
use crate::group::RuleGroup;
use crate::parser::ruleset::{RuleSection, RuleSetDoc, default_version};
use crate::rule::RuleKind;

/// Render the flat-list artifact: a stats header followed by `TAG,value`
/// lines in canonical order.
pub fn render_list(group: &RuleGroup) -> String {
    let mut out = String::new();

    out.push_str(&format!("# NAME: {}\n", group.name()));
    for kind in RuleKind::ALL {
        let count = group.count_of(kind);
        if count > 0 {
            out.push_str(&format!("# {}: {}\n", kind.tag(), count));
        }
    }
    out.push_str(&format!("# TOTAL: {}\n\n", group.len()));

    for entry in group.iter() {
        out.push_str(&entry.to_line());
        out.push('\n');
    }

    out
}

/// Render the structured rule-set artifact (pretty-printed JSON).
///
/// Kinds with no entries are omitted entirely. v4 and v6 prefixes share the
/// `ip_cidr` key (v4 block first) — the single list the downstream compiler
/// consumes — while staying distinct kinds in the flat list.
pub fn render_ruleset(group: &RuleGroup) -> Result<String, RulesError> {
    let mut ip_cidr: Vec<String> = group
        .values_of(RuleKind::IpCidr)
        .map(str::to_string)
        .collect();
    ip_cidr.extend(group.values_of(RuleKind::IpCidr6).map(str::to_string));

    let section = RuleSection {
        domain: group.values_of(RuleKind::Domain).map(str::to_string).collect(),
        domain_suffix: group
            .values_of(RuleKind::DomainSuffix)
            .map(str::to_string)
            .collect(),
        domain_keyword: group
            .values_of(RuleKind::DomainKeyword)
            .map(str::to_string)
            .collect(),
        ip_cidr,
    };

    let doc = RuleSetDoc {
        version: default_version(),
        rules: if section.is_empty() { Vec::new() } else { vec![section] },
        inline: RuleSection::default(),
    };

    let mut json = serde_json::to_string_pretty(&doc)?;
    json.push('\n');
    Ok(json)
}
