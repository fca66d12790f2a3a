//! File-based cache store.
//!
//! [`FileCache`] stores each entry as a single file named after its key. The
//! file starts with a fixed-size header carrying the expiry deadline,
//! followed by the data:
//!
//! ```text
//! [expires_at_ms: u64 LE][data bytes]
//! ```
//!
//! `expires_at_ms` is milliseconds since the Unix epoch, with `0` meaning
//! "never expires". On read, only the header is read first; the data is read
//! only when the entry is still live. Expired files are removed on read.
//!
//! On construction, [`FileCache`] validates a `VERSION` file in the cache
//! root. If the version mismatches or is missing, the whole directory is
//! wiped and recreated, so pages rendered by an older build are never served.

use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::CacheStore;

/// Header value for entries without expiry.
const NO_EXPIRY: u64 = 0;

/// File-based [`CacheStore`] rooted at a directory on disk.
///
/// Directory layout:
/// ```text
/// {root}/
/// +-- VERSION            # contains the cache version string
/// +-- page_3f2a...       # cache entry
/// +-- page_9c01...
/// ```
#[derive(Debug)]
pub struct FileCache {
    root: PathBuf,
}

impl FileCache {
    /// Create a new file-based cache at `root`, validating the cache version.
    ///
    /// If the `VERSION` file inside `root` does not match `version`, the
    /// entire cache directory is removed and recreated with the new version.
    /// Errors during validation are logged but never fatal.
    #[must_use]
    pub fn new(root: PathBuf, version: &str) -> Self {
        validate_version(&root, version);
        Self { root }
    }

    /// Root directory of this cache.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl CacheStore for FileCache {
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        let path = self.root.join(key);
        let mut file = File::open(&path).ok()?;

        let mut header = [0u8; 8];
        file.read_exact(&mut header).ok()?;
        let expires_at = u64::from_le_bytes(header);

        if expires_at != NO_EXPIRY && now_millis() >= expires_at {
            drop(file);
            if let Err(e) = fs::remove_file(&path) {
                tracing::debug!(key, "failed to remove expired cache entry: {e}");
            }
            return None;
        }

        let mut data = Vec::new();
        file.read_to_end(&mut data).ok()?;
        Some(data)
    }

    fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) {
        let path = self.root.join(key);

        // Cache writes are best effort
        let Some(parent) = path.parent() else {
            return;
        };
        if let Err(e) = fs::create_dir_all(parent) {
            tracing::warn!("failed to create cache directory: {e}");
            return;
        }

        let expires_at = ttl.map_or(NO_EXPIRY, |ttl| {
            let ttl_ms = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX);
            now_millis().saturating_add(ttl_ms).max(1)
        });

        let mut buf = Vec::with_capacity(8 + value.len());
        buf.extend_from_slice(&expires_at.to_le_bytes());
        buf.extend_from_slice(value);

        if let Err(e) = fs::write(&path, &buf) {
            tracing::warn!(key, "failed to write cache entry: {e}");
        }
    }
}

/// Current wall-clock time in milliseconds since the Unix epoch.
fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
}

/// Validate the cache version, wiping the directory on mismatch.
fn validate_version(root: &Path, version: &str) {
    let version_file = root.join("VERSION");

    match fs::read_to_string(&version_file) {
        Ok(stored) if stored == version => {
            tracing::debug!("cache version matches: {version}");
            return;
        }
        Ok(stored) => {
            tracing::info!(
                "cache version mismatch (stored={stored}, current={version}), wiping cache"
            );
        }
        Err(_) => {
            tracing::info!("no cache VERSION file found, initializing cache");
        }
    }

    if root.exists()
        && let Err(e) = fs::remove_dir_all(root)
    {
        tracing::warn!("failed to remove cache directory: {e}");
    }
    if let Err(e) = fs::create_dir_all(root) {
        tracing::warn!("failed to create cache directory: {e}");
        return;
    }
    if let Err(e) = fs::write(&version_file, version) {
        tracing::warn!("failed to write cache VERSION file: {e}");
    }
}
