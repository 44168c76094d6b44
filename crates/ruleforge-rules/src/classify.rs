//! Token classification and normalization.
//!
//! Maps raw source tokens to [`RuleEntry`] values. Explicitly tagged tokens
//! (tagged dialects) go through [`entry_from_tag`]; untagged tokens are
//! classified by shape via [`classify_bare`].

use std::net::IpAddr;

use ipnet::IpNet;

use crate::error::RulesError;
use crate::rule::{RuleEntry, RuleKind};

/// Marker wrapping keyword rules in plain-list sources, e.g. `keyword:ads`.
pub const KEYWORD_MARKER: &str = "keyword:";

/// Strip a trailing `#` comment and surrounding whitespace.
///
/// Rule values never contain `#`, so everything from the first `#` on is
/// comment text.
pub fn strip_comment(line: &str) -> &str {
    let cut = match line.find('#') {
        Some(i) => &line[..i],
        None => line,
    };
    cut.trim()
}

/// Build an entry from an explicitly tagged kind and its raw value.
///
/// The value is normalized per kind; a value that fails normalization is an
/// `Unclassifiable` error (recoverable: the caller skips the line). An
/// `IP-CIDR` tag holding a v6 prefix is reclassified as `IP-CIDR6` and vice
/// versa — the parsed address family is authoritative, not the tag.
pub fn entry_from_tag(
    kind: RuleKind,
    raw: &str,
    source_id: &str,
) -> Result<RuleEntry, RulesError> {
    let raw = raw.trim();
    let unclassifiable = || RulesError::Unclassifiable {
        source_id: source_id.to_string(),
        token: raw.to_string(),
    };

    match kind {
        RuleKind::Domain => {
            let value = normalize_domain(raw).ok_or_else(unclassifiable)?;
            Ok(RuleEntry::new(RuleKind::Domain, value))
        }
        RuleKind::DomainSuffix => {
            let value = normalize_domain(strip_suffix_marker(raw)).ok_or_else(unclassifiable)?;
            Ok(RuleEntry::new(RuleKind::DomainSuffix, value))
        }
        RuleKind::DomainKeyword => {
            let value = normalize_keyword(raw).ok_or_else(unclassifiable)?;
            Ok(RuleEntry::new(RuleKind::DomainKeyword, value))
        }
        RuleKind::IpCidr | RuleKind::IpCidr6 => {
            let (kind, value) = normalize_cidr(raw).map_err(|_| unclassifiable())?;
            Ok(RuleEntry::new(kind, value))
        }
    }
}

/// Classify an untagged token by shape.
///
/// Priority: keyword marker, suffix marker, IP shape, hostname shape. A
/// hostname-shaped token becomes `Domain`, or `DomainSuffix` when the source
/// declares `domains_as_suffix` (upstream lists disagree on this convention,
/// so it is per-source configuration rather than a global guess).
pub fn classify_bare(
    token: &str,
    domains_as_suffix: bool,
    source_id: &str,
) -> Result<RuleEntry, RulesError> {
    let unclassifiable = || RulesError::Unclassifiable {
        source_id: source_id.to_string(),
        token: token.to_string(),
    };

    if let Some(keyword) = token.strip_prefix(KEYWORD_MARKER) {
        let value = normalize_keyword(keyword).ok_or_else(unclassifiable)?;
        return Ok(RuleEntry::new(RuleKind::DomainKeyword, value));
    }

    if has_suffix_marker(token) {
        let value = normalize_domain(strip_suffix_marker(token)).ok_or_else(unclassifiable)?;
        return Ok(RuleEntry::new(RuleKind::DomainSuffix, value));
    }

    if looks_like_ip(token) {
        let (kind, value) = normalize_cidr(token).map_err(|_| unclassifiable())?;
        return Ok(RuleEntry::new(kind, value));
    }

    if let Some(value) = normalize_domain(token) {
        let kind = if domains_as_suffix {
            RuleKind::DomainSuffix
        } else {
            RuleKind::Domain
        };
        return Ok(RuleEntry::new(kind, value));
    }

    Err(unclassifiable())
}

/// Parse and canonicalize a CIDR value.
///
/// A bare address is widened to its single-host prefix (`/32` or `/128`);
/// host bits beyond the prefix length are truncated so e.g. `10.1.2.3/8`
/// canonicalizes to `10.0.0.0/8`.
pub fn normalize_cidr(value: &str) -> Result<(RuleKind, String), RulesError> {
    let net: IpNet = if value.contains('/') {
        value
            .parse()
            .map_err(|e| RulesError::InvalidCidr(format!("{value}: {e}")))?
    } else {
        let ip: IpAddr = value
            .parse()
            .map_err(|e| RulesError::InvalidCidr(format!("{value}: {e}")))?;
        IpNet::from(ip)
    };

    let net = net.trunc();
    let kind = match net {
        IpNet::V4(_) => RuleKind::IpCidr,
        IpNet::V6(_) => RuleKind::IpCidr6,
    };
    Ok((kind, net.to_string()))
}

/// Lower-case and validate a hostname. Returns `None` for anything that is
/// not hostname-shaped (empty, empty labels, invalid characters).
fn normalize_domain(raw: &str) -> Option<String> {
    let lower = raw.trim().to_ascii_lowercase();
    if lower.is_empty() || lower.starts_with('.') || lower.ends_with('.') {
        return None;
    }
    let valid = lower.split('.').all(|label| {
        !label.is_empty()
            && label
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    });
    if valid { Some(lower) } else { None }
}

/// Lower-case and validate a keyword: any non-empty token without whitespace.
fn normalize_keyword(raw: &str) -> Option<String> {
    let lower = raw.trim().to_ascii_lowercase();
    if lower.is_empty() || lower.chars().any(|c| c.is_whitespace()) {
        return None;
    }
    Some(lower)
}

fn has_suffix_marker(token: &str) -> bool {
    token.starts_with("+.") || token.starts_with("*.") || token.starts_with('.')
}

/// Strip any number of leading suffix markers (`+.`, `*.`, `.`).
fn strip_suffix_marker(token: &str) -> &str {
    let mut t = token;
    loop {
        if let Some(rest) = t.strip_prefix("+.") {
            t = rest;
        } else if let Some(rest) = t.strip_prefix("*.") {
            t = rest;
        } else if let Some(rest) = t.strip_prefix('.') {
            t = rest;
        } else {
            return t;
        }
    }
}

/// True if the token is made only of CIDR characters. Hex letters are
/// allowed for v6; the token must still parse to count as an IP rule.
fn looks_like_ip(token: &str) -> bool {
    !token.is_empty()
        && token.chars().any(|c| c.is_ascii_digit())
        && (token.contains(':') || token.contains('.'))
        && token
            .chars()
            .all(|c| c.is_ascii_hexdigit() || c == '.' || c == ':' || c == '/')
}
