//! Plain-list dialect parsers.

use tracing::warn;

use crate::classify::{classify_bare, entry_from_tag, strip_comment};
use crate::error::RulesError;
use crate::parser::RawLine;
use crate::rule::{RuleEntry, RuleKind};

/// Iterate the meaningful lines of a plain source: comments and blanks are
/// dropped, inline comments stripped, line numbers preserved for diagnostics.
pub fn raw_lines(content: &str) -> impl Iterator<Item = RawLine<'_>> {
    content
        .lines()
        .enumerate()
        .map(|(i, line)| RawLine {
            text: strip_comment(line),
            number: i + 1,
        })
        .filter(|raw| !raw.text.is_empty())
}

/// Parse a plain rule list.
///
/// Each line is either `TAG,VALUE` (explicit kind; trailing comma-separated
/// fields such as policy names are stripped) or a bare token classified by
/// shape. Unrecognized lines are logged and skipped.
pub fn parse_list(
    source_id: &str,
    content: &str,
    domains_as_suffix: bool,
) -> Result<Vec<RuleEntry>, RulesError> {
    let mut entries = Vec::new();

    for raw in raw_lines(content) {
        let result = match tagged_parts(raw.text) {
            Some((kind, value)) => entry_from_tag(kind, value, source_id),
            None => classify_bare(raw.text, domains_as_suffix, source_id),
        };
        push_or_skip(&mut entries, result, source_id, raw.number)?;
    }

    Ok(entries)
}

/// Parse a domain-set source: one bare domain per line, leading `.` or `+.`
/// marking a suffix rule.
pub fn parse_domain_set(
    source_id: &str,
    content: &str,
    domains_as_suffix: bool,
) -> Result<Vec<RuleEntry>, RulesError> {
    let mut entries = Vec::new();

    for raw in raw_lines(content) {
        let result = classify_bare(raw.text, domains_as_suffix, source_id);
        push_or_skip(&mut entries, result, source_id, raw.number)?;
    }

    Ok(entries)
}

/// Split a `TAG,VALUE[,extra...]` line. Returns `None` when the line has no
/// comma or the tag is not a known kind (the caller falls back to shape
/// classification, which will reject unknown-tag lines as unclassifiable).
fn tagged_parts(line: &str) -> Option<(RuleKind, &str)> {
    let (tag, rest) = line.split_once(',')?;
    let kind = RuleKind::from_tag(tag.trim())?;
    // Take only the first value; ignore trailing fields like ",no-resolve"
    let value = rest.split(',').next().unwrap_or("").trim();
    Some((kind, value))
}

/// Apply the recoverable-per-line policy: unclassifiable lines are warned
/// about and skipped, anything else propagates.
fn push_or_skip(
    entries: &mut Vec<RuleEntry>,
    result: Result<RuleEntry, RulesError>,
    source_id: &str,
    line_number: usize,
) -> Result<(), RulesError> {
    match result {
        Ok(entry) => {
            entries.push(entry);
            Ok(())
        }
        Err(e) if e.is_recoverable() => {
            warn!(source = %source_id, line = line_number, "skipping line: {e}");
            Ok(())
        }
        Err(e) => Err(e),
    }
}
