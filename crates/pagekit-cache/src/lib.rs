//! Rendered page cache stores for PageKit.
//!
//! This crate defines the key-value contract the view layer uses to memoize
//! rendered HTML, decoupled from where the bytes actually live:
//!
//! - [`CacheStore`]: Key-value store with optional per-entry expiry
//! - [`CacheStoreExt`]: UTF-8 string helpers over any store
//!
//! # Implementations
//!
//! - [`NullCache`]: No-op store (always misses)
//! - [`MemoryCache`]: In-process map, expired entries swept on write
//! - [`FileCache`]: One file per key with version validation
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use pagekit_cache::{CacheStore, CacheStoreExt, MemoryCache};
//!
//! let cache = MemoryCache::new();
//! cache.set_string("page_abc", "<html>hello</html>", Some(Duration::from_secs(60)));
//! assert!(cache.has("page_abc"));
//! assert_eq!(cache.get_string("page_abc").as_deref(), Some("<html>hello</html>"));
//! ```

mod ext;
mod file;
mod memory;

use std::time::Duration;

pub use ext::CacheStoreExt;
pub use file::FileCache;
pub use memory::MemoryCache;

/// A key-value store for rendered pages.
///
/// Entries are stored either without expiry (`ttl = None`) or for a fixed
/// duration. An expired entry behaves exactly like a missing one. Stores are
/// shared across requests, so implementations must be `Send + Sync`; no
/// read-modify-write atomicity is promised beyond a single key.
pub trait CacheStore: Send + Sync {
    /// Check whether a live entry exists for `key`.
    fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Retrieve a live entry.
    ///
    /// Returns `None` on miss or when the entry has expired.
    fn get(&self, key: &str) -> Option<Vec<u8>>;

    /// Store a value, overwriting any existing entry for the same key.
    ///
    /// # Arguments
    ///
    /// * `key` - Cache key (e.g., `page_<hash>`)
    /// * `value` - Raw bytes to cache
    /// * `ttl` - Lifetime of the entry, `None` for no expiry
    fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>);
}

/// No-op [`CacheStore`] that never stores or retrieves data.
///
/// Use when caching is disabled. Every `get` returns `None`; every `set` is
/// silently discarded.
#[derive(Debug, Default)]
pub struct NullCache;

impl CacheStore for NullCache {
    fn has(&self, _key: &str) -> bool {
        false
    }

    fn get(&self, _key: &str) -> Option<Vec<u8>> {
        None
    }

    fn set(&self, _key: &str, _value: &[u8], _ttl: Option<Duration>) {}
}
