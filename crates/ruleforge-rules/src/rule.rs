//! Rule entry and kind definitions.

/// The kind of a normalized rule.
///
/// Declaration order is the canonical output order: artifacts list exact
/// domains first, then suffixes, keywords, and CIDRs. `Ord` is derived from
/// it, so sorted containers of entries come out in emission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RuleKind {
    /// Exact host match.
    Domain,
    /// Match the domain itself and all subdomains.
    DomainSuffix,
    /// Match any domain containing the keyword.
    DomainKeyword,
    /// IPv4 network prefix.
    IpCidr,
    /// IPv6 network prefix.
    IpCidr6,
}

impl RuleKind {
    /// All kinds, in canonical output order.
    pub const ALL: [RuleKind; 5] = [
        RuleKind::Domain,
        RuleKind::DomainSuffix,
        RuleKind::DomainKeyword,
        RuleKind::IpCidr,
        RuleKind::IpCidr6,
    ];

    /// Stable textual tag used in flat-list artifacts and tagged sources.
    pub fn tag(&self) -> &'static str {
        match self {
            RuleKind::Domain => "DOMAIN",
            RuleKind::DomainSuffix => "DOMAIN-SUFFIX",
            RuleKind::DomainKeyword => "DOMAIN-KEYWORD",
            RuleKind::IpCidr => "IP-CIDR",
            RuleKind::IpCidr6 => "IP-CIDR6",
        }
    }

    /// Look up a kind by its textual tag (case-insensitive).
    pub fn from_tag(tag: &str) -> Option<RuleKind> {
        match tag.to_ascii_uppercase().as_str() {
            "DOMAIN" => Some(RuleKind::Domain),
            "DOMAIN-SUFFIX" => Some(RuleKind::DomainSuffix),
            "DOMAIN-KEYWORD" => Some(RuleKind::DomainKeyword),
            "IP-CIDR" => Some(RuleKind::IpCidr),
            "IP-CIDR6" => Some(RuleKind::IpCidr6),
            _ => None,
        }
    }
}

/// One normalized rule: a kind plus its canonical string payload.
///
/// The derived `Ord` sorts by kind first, then lexicographically by value —
/// the composite key every artifact is ordered by.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RuleEntry {
    pub kind: RuleKind,
    pub value: String,
}

impl RuleEntry {
    pub fn new(kind: RuleKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }

    /// Render as a flat-list line, e.g. `DOMAIN-SUFFIX,example.com`.
    pub fn to_line(&self) -> String {
        format!("{},{}", self.kind.tag(), self.value)
    }
}
