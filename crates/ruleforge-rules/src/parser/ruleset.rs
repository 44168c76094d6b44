//! Structured rule-set dialect parser (mapping-of-lists, YAML or JSON).
//!
//! The document shape doubles as the structured artifact format: kind keys
//! (`domain`, `domain_suffix`, `domain_keyword`, `ip_cidr`) each holding a
//! sequence of string payloads, either at the top level or under a `rules:`
//! sequence of such maps.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::classify::entry_from_tag;
use crate::error::RulesError;
use crate::rule::{RuleEntry, RuleKind};

/// A structured rule-set document.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct RuleSetDoc {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<RuleSection>,
    /// Kind keys given directly at the top level.
    #[serde(flatten)]
    pub inline: RuleSection,
}

/// One mapping of kind keys to value lists.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct RuleSection {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub domain: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub domain_suffix: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub domain_keyword: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ip_cidr: Vec<String>,
}

impl RuleSection {
    pub fn is_empty(&self) -> bool {
        self.domain.is_empty()
            && self.domain_suffix.is_empty()
            && self.domain_keyword.is_empty()
            && self.ip_cidr.is_empty()
    }
}

pub(crate) fn default_version() -> u32 {
    1
}

/// Parse a structured rule-set source.
///
/// A document that is not mapping-shaped, or whose payloads are not strings,
/// is a fatal `Parse` error for this source. Individual values that fail
/// normalization are logged and skipped, same as plain-dialect lines.
pub fn parse_ruleset(source_id: &str, content: &str) -> Result<Vec<RuleEntry>, RulesError> {
    // serde_yaml parses JSON documents too, so one deserializer covers both
    // encodings of this dialect.
    let doc: RuleSetDoc = serde_yaml::from_str(content).map_err(|e| RulesError::Parse {
        source_id: source_id.to_string(),
        detail: e.to_string(),
    })?;

    let mut entries = Vec::new();
    collect_section(&doc.inline, source_id, &mut entries);
    for section in &doc.rules {
        collect_section(section, source_id, &mut entries);
    }
    Ok(entries)
}

fn collect_section(section: &RuleSection, source_id: &str, entries: &mut Vec<RuleEntry>) {
    let tagged = [
        (RuleKind::Domain, &section.domain),
        (RuleKind::DomainSuffix, &section.domain_suffix),
        (RuleKind::DomainKeyword, &section.domain_keyword),
        (RuleKind::IpCidr, &section.ip_cidr),
    ];
    for (kind, values) in tagged {
        for value in values {
            match entry_from_tag(kind, value, source_id) {
                Ok(entry) => entries.push(entry),
                Err(e) => warn!(source = %source_id, "skipping value: {e}"),
            }
        }
    }
}
