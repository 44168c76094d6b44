//! Source providers: retrieve raw bytes for a locator.

pub mod file;
#[cfg(feature = "http")]
pub mod http;

use std::path::PathBuf;

use crate::error::RulesError;

/// Where a source's raw bytes come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    Path(PathBuf),
    Url(String),
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Locator::Path(p) => write!(f, "{}", p.display()),
            Locator::Url(u) => f.write_str(u),
        }
    }
}

/// Fetch the raw bytes for a source.
///
/// Retrieval failures are `RulesError::Fetch`, distinct from content errors:
/// the orchestration layer may retry a fetch, never a parse.
pub async fn fetch(source_id: &str, locator: &Locator) -> Result<Vec<u8>, RulesError> {
    match locator {
        Locator::Path(path) => file::load(source_id, path).await,
        #[cfg(feature = "http")]
        Locator::Url(url) => http::fetch_url(source_id, url).await,
        #[cfg(not(feature = "http"))]
        Locator::Url(url) => Err(RulesError::Fetch {
            source_id: source_id.to_string(),
            reason: format!("cannot fetch '{url}': built without the 'http' feature"),
        }),
    }
}
