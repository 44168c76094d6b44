//! Local-file source provider.

use std::path::Path;

use crate::error::RulesError;

/// Read a source file's raw bytes.
pub async fn load(source_id: &str, path: &Path) -> Result<Vec<u8>, RulesError> {
    tokio::fs::read(path)
        .await
        .map_err(|e| RulesError::Fetch {
            source_id: source_id.to_string(),
            reason: format!("{}: {e}", path.display()),
        })
}
