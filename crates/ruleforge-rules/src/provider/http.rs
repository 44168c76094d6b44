//! HTTP source provider.

use std::time::Duration;

use crate::error::RulesError;

/// Default HTTP request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Fetch a source's raw bytes from an HTTP/HTTPS URL.
pub async fn fetch_url(source_id: &str, url: &str) -> Result<Vec<u8>, RulesError> {
    tracing::debug!(source = %source_id, url = %url, "fetching remote source");

    let fetch_err = |reason: String| RulesError::Fetch {
        source_id: source_id.to_string(),
        reason,
    };

    let client = reqwest::Client::builder()
        .timeout(DEFAULT_TIMEOUT)
        .build()
        .map_err(|e| fetch_err(format!("failed to build HTTP client: {e}")))?;

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| fetch_err(format!("request failed for {url}: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(fetch_err(format!("HTTP {status} for {url}")));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| fetch_err(format!("failed to read response body: {e}")))?;

    tracing::debug!(source = %source_id, bytes = bytes.len(), "fetched remote source");
    Ok(bytes.to_vec())
}
