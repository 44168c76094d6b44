//! Rule-list aggregation engine for ruleforge.
//!
//! Ingests network rule lists in several dialects (Surge-style tagged lists,
//! bare domain sets, Clash/sing-box structured rule-sets), normalizes them
//! into a canonical rule model, deduplicates and aggregates per group, and
//! emits deterministic flat-list and structured JSON artifacts. Regeneration
//! is gated on SHA-256 fingerprints of the source content.
//!
//! # Architecture
//!
//! - **Model**: [`RuleKind`] and [`RuleEntry`] define the canonical rule
//!   universe and its total order
//! - **Parsers**: plain-line dialects (`list`, `domain-set`) and structured
//!   rule-set documents (YAML/JSON)
//! - **Providers**: file loading, HTTP behind the `http` feature
//! - **Fingerprints**: [`FingerprintStore`] persists per-source digests so
//!   unchanged sources skip regeneration
//! - **Pipeline**: [`Pipeline`] drives fetch → parse → aggregate → emit per
//!   group, concurrently and with per-group failure isolation
//!
//! # Example
//!
//! ```
//! use ruleforge_rules::{parse_source, aggregate, render_list, Dialect};
//!
//! let rules = parse_source(
//!     "ads",
//!     "DOMAIN-SUFFIX,ad.example.com\nDOMAIN,tracker.example.net\n",
//!     Dialect::List,
//!     false,
//! ).unwrap();
//! let group = aggregate("ads", vec![rules]);
//! let list = render_list(&group);
//! assert!(list.contains("DOMAIN,tracker.example.net"));
//! ```

pub mod classify;
pub mod compile;
pub mod emit;
pub mod error;
pub mod fingerprint;
pub mod group;
pub mod parser;
pub mod pipeline;
pub mod provider;
pub mod rule;

pub use compile::CompilerSpec;
pub use emit::{render_list, render_ruleset};
pub use error::RulesError;
pub use fingerprint::{FingerprintStore, SourceState, digest};
pub use group::{RuleGroup, aggregate};
pub use parser::{Dialect, parse_source};
pub use pipeline::{GroupReport, GroupSpec, GroupStatus, Pipeline, SourceSpec};
pub use provider::{Locator, fetch};
pub use rule::{RuleEntry, RuleKind};
