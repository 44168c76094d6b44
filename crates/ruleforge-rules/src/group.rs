//! Rule groups: deduplicated, canonically ordered entry sets.

use std::collections::BTreeSet;

use crate::rule::{RuleEntry, RuleKind};

/// A named collection of rules destined for one artifact triplet.
///
/// Entries live in a `BTreeSet`, so uniqueness by (kind, value) and the
/// canonical order (kind first, then lexicographic value) hold by
/// construction regardless of source ordering.
#[derive(Debug, Clone)]
pub struct RuleGroup {
    name: String,
    entries: BTreeSet<RuleEntry>,
}

impl RuleGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: BTreeSet::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Insert one entry. Returns false when an equal entry was already
    /// present (the duplicate is silently dropped).
    pub fn insert(&mut self, entry: RuleEntry) -> bool {
        self.entries.insert(entry)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = &RuleEntry> {
        self.entries.iter()
    }

    /// Values of one kind, in canonical (lexicographic) order.
    pub fn values_of(&self, kind: RuleKind) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(move |e| e.kind == kind)
            .map(|e| e.value.as_str())
    }

    /// Number of entries of one kind.
    pub fn count_of(&self, kind: RuleKind) -> usize {
        self.values_of(kind).count()
    }
}

/// Union per-source entry sequences into one group.
///
/// First occurrence across sources wins; later duplicates are dropped. The
/// union is idempotent, so shared sources feeding several groups never
/// interfere.
pub fn aggregate(name: impl Into<String>, per_source: Vec<Vec<RuleEntry>>) -> RuleGroup {
    let mut group = RuleGroup::new(name);
    for entries in per_source {
        for entry in entries {
            group.insert(entry);
        }
    }
    group
}
