//! Source content fingerprints and the persisted fingerprint ledger.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use sha2::{Digest, Sha256};

use crate::error::RulesError;

/// Compute the SHA-256 digest of raw source bytes as lowercase hex.
pub fn digest(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Whether a source's content matches its last recorded fingerprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceState {
    Unchanged,
    Changed,
}

/// Persisted ledger of per-source content fingerprints.
///
/// One small text record per source (`sha256sum` line format:
/// `"{digest}  {source_id}\n"`), replaced atomically via tmp-file + rename.
/// Records are only written after the owning group emitted successfully, so
/// a failed group is retried on the next run. A missing record reads as
/// `Changed`.
pub struct FingerprintStore {
    dir: PathBuf,
    // Guards both the cache and record writes: commits for the same source
    // from concurrent groups must not interleave.
    cache: Mutex<HashMap<String, Option<String>>>,
}

impl FingerprintStore {
    /// Open (creating if needed) a ledger directory.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, RulesError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            cache: Mutex::new(HashMap::new()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Compare a freshly computed digest against the recorded one.
    pub fn state(&self, source_id: &str, digest: &str) -> SourceState {
        match self.recorded(source_id) {
            Some(prev) if prev == digest => SourceState::Unchanged,
            _ => SourceState::Changed,
        }
    }

    /// The last recorded digest for a source, if any.
    pub fn recorded(&self, source_id: &str) -> Option<String> {
        let mut cache = self.cache.lock();
        if let Some(cached) = cache.get(source_id) {
            return cached.clone();
        }
        let loaded = read_record(&self.record_path(source_id));
        cache.insert(source_id.to_string(), loaded.clone());
        loaded
    }

    /// Record a new digest for a source, replacing the record atomically.
    pub fn commit(&self, source_id: &str, digest: &str) -> Result<(), RulesError> {
        let path = self.record_path(source_id);
        let mut cache = self.cache.lock();

        let tmp = path.with_extension("tmp");
        fs::write(&tmp, format!("{digest}  {source_id}\n"))?;
        // On Windows, rename fails if the destination exists; remove it first.
        #[cfg(target_os = "windows")]
        {
            let _ = fs::remove_file(&path);
        }
        fs::rename(&tmp, &path)?;

        cache.insert(source_id.to_string(), Some(digest.to_string()));
        Ok(())
    }

    /// Record file path for a source id: a readable slug plus a short hash
    /// of the full id, so distinct ids never collide after sanitizing.
    fn record_path(&self, source_id: &str) -> PathBuf {
        let slug: String = source_id
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '.' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .take(64)
            .collect();
        let short = &digest(source_id.as_bytes())[..8];
        self.dir.join(format!("{slug}-{short}.sha256"))
    }
}

fn read_record(path: &Path) -> Option<String> {
    let content = fs::read_to_string(path).ok()?;
    let first = content.lines().next()?;
    let digest = first.split_whitespace().next()?;
    if digest.is_empty() {
        None
    } else {
        Some(digest.to_string())
    }
}
