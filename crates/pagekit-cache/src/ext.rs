//! String helpers over [`CacheStore`].

use std::time::Duration;

use crate::CacheStore;

/// UTF-8 convenience methods for [`CacheStore`].
///
/// Rendered pages are stored as strings; implementors only handle raw bytes
/// and [`CacheStore`] stays object-safe.
///
/// # Example
///
/// ```
/// use pagekit_cache::{CacheStoreExt, NullCache};
///
/// let cache = NullCache;
/// cache.set_string("page_abc", "<p>hi</p>", None);
/// assert_eq!(cache.get_string("page_abc"), None); // NullCache always misses
/// ```
pub trait CacheStoreExt: CacheStore {
    /// Retrieve a cached UTF-8 string.
    ///
    /// Returns `None` on miss, expiry, or invalid UTF-8.
    fn get_string(&self, key: &str) -> Option<String> {
        let bytes = self.get(key)?;
        String::from_utf8(bytes).ok()
    }

    fn set_string(&self, key: &str, value: &str, ttl: Option<Duration>) {
        self.set(key, value.as_bytes(), ttl);
    }
}

impl<S: CacheStore + ?Sized> CacheStoreExt for S {}
