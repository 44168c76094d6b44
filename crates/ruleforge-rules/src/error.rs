//! Error types for the rule pipeline.

use thiserror::Error;

/// Errors that can occur while building rule groups.
#[derive(Error, Debug)]
pub enum RulesError {
    /// A source could not be retrieved. Distinct from content errors so the
    /// orchestration layer can decide to retry.
    #[error("fetch failed for source '{source_id}': {reason}")]
    Fetch { source_id: String, reason: String },

    /// A source document is structurally malformed. Fatal to that source.
    #[error("parse error in source '{source_id}': {detail}")]
    Parse { source_id: String, detail: String },

    /// A single line matched no recognized rule shape. Recoverable: the
    /// caller logs and skips the line.
    #[error("unclassifiable rule in source '{source_id}': {token}")]
    Unclassifiable { source_id: String, token: String },

    #[error("invalid CIDR: {0}")]
    InvalidCidr(String),

    /// Failed to write an artifact. Fatal to the owning group.
    #[error("emission failed for group '{group}': {reason}")]
    Emission { group: String, reason: String },

    /// The external rule-set compiler failed. Fatal to the owning group.
    #[error("compiler failed for group '{group}': {reason}")]
    Compile { group: String, reason: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RulesError {
    /// True for errors the per-line skip policy may swallow (with a warning).
    pub fn is_recoverable(&self) -> bool {
        matches!(self, RulesError::Unclassifiable { .. })
    }
}
