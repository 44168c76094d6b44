//! Source-dialect parsers.
//!
//! Each supported dialect has its own parser producing the same
//! intermediate representation (a sequence of [`RuleEntry`] values), so the
//! rest of the pipeline never inspects source shapes at runtime.

pub mod plain;
pub mod ruleset;

use serde::{Deserialize, Serialize};

use crate::error::RulesError;
use crate::rule::RuleEntry;

pub use plain::{parse_domain_set, parse_list};
pub use ruleset::parse_ruleset;

/// The closed set of source dialects a source may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Dialect {
    /// Plain lines: `TAG,VALUE` or bare tokens, `#` comments.
    List,
    /// Bare domain per line; leading `.` or `+.` marks a suffix.
    DomainSet,
    /// Structured mapping-of-lists (YAML or JSON) keyed by rule kind.
    RuleSet,
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Dialect::List => "list",
            Dialect::DomainSet => "domain-set",
            Dialect::RuleSet => "rule-set",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "list" => Ok(Dialect::List),
            "domain-set" => Ok(Dialect::DomainSet),
            "rule-set" | "ruleset" => Ok(Dialect::RuleSet),
            other => Err(format!(
                "unknown dialect '{other}' (expected list, domain-set, or rule-set)"
            )),
        }
    }
}

/// One raw line of a plain source, with its 1-based line number.
#[derive(Debug, Clone, Copy)]
pub struct RawLine<'a> {
    pub text: &'a str,
    pub number: usize,
}

/// Parse one source document according to its declared dialect.
///
/// Unclassifiable lines are logged and skipped; structural errors are fatal
/// for this source (and, by extension, its group) only.
pub fn parse_source(
    source_id: &str,
    content: &str,
    dialect: Dialect,
    domains_as_suffix: bool,
) -> Result<Vec<RuleEntry>, RulesError> {
    match dialect {
        Dialect::List => parse_list(source_id, content, domains_as_suffix),
        Dialect::DomainSet => parse_domain_set(source_id, content, domains_as_suffix),
        Dialect::RuleSet => parse_ruleset(source_id, content),
    }
}
