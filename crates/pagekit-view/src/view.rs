//! Render/cache layer between page builders and the template engine.

use std::sync::Arc;
use std::time::Duration;

use indexmap::IndexMap;
use md5::{Digest, Md5};
use pagekit_cache::{CacheStore, CacheStoreExt};
use pagekit_page::{PageVars, WebPage};
use serde_json::Value;

use crate::engine::TemplateEngine;
use crate::error::ViewError;
use crate::event::{BeforeRenderEvent, RenderListeners};
use crate::response::{CONTENT_TYPE, HtmlResponse, TEXT_HTML};

/// Cache key for a request URI: `page_` followed by the hex MD5 of the URI.
#[must_use]
pub fn page_cache_key(uri: &str) -> String {
    format!("page_{}", hex::encode(Md5::digest(uri.as_bytes())))
}

/// Per-call render settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    pub status: u16,
    pub headers: IndexMap<String, String>,
    /// Seconds to cache the rendered HTML; `Some(0)` caches without expiry,
    /// `None` skips the cache write.
    pub cache_ttl: Option<u64>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            status: 200,
            headers: IndexMap::new(),
            cache_ttl: None,
        }
    }
}

impl RenderOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn cache_ttl(mut self, seconds: u64) -> Self {
        self.cache_ttl = Some(seconds);
        self
    }
}

/// Accumulates template variables and renders layouts, serving repeat
/// requests for the same URI from the page cache.
pub struct View {
    engine: Arc<dyn TemplateEngine>,
    cache: Option<Arc<dyn CacheStore>>,
    listeners: RenderListeners,
    request_uri: String,
    vars: PageVars,
}

impl View {
    /// View without a cache store or listeners.
    #[must_use]
    pub fn new(engine: Arc<dyn TemplateEngine>) -> Self {
        Self {
            engine,
            cache: None,
            listeners: RenderListeners::new(),
            request_uri: String::new(),
            vars: PageVars::new(),
        }
    }

    /// Attach a page cache.
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<dyn CacheStore>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Set the URI whose hash keys the page cache.
    pub fn set_request_uri(&mut self, uri: impl Into<String>) -> &mut Self {
        self.request_uri = uri.into();
        self
    }

    pub fn request_uri(&self) -> &str {
        &self.request_uri
    }

    /// Cache key for the current request URI.
    #[must_use]
    pub fn cache_key(&self) -> String {
        page_cache_key(&self.request_uri)
    }

    /// Subscribers notified before every render.
    pub fn listeners_mut(&mut self) -> &mut RenderListeners {
        &mut self.listeners
    }

    /// Pending variables.
    pub fn vars(&self) -> &PageVars {
        &self.vars
    }

    /// Assign one variable.
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::DuplicateVariable`] if `check` is set and `key`
    /// is already assigned.
    pub fn assign(
        &mut self,
        key: &str,
        value: impl Into<Value>,
        check: bool,
    ) -> Result<&mut Self, ViewError> {
        if check && self.vars.contains_key(key) {
            return Err(ViewError::DuplicateVariable(key.to_owned()));
        }
        self.vars.insert(key.to_owned(), value.into());
        Ok(self)
    }

    /// Assign every entry of `vars`, in order.
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::DuplicateVariable`] on the first key that is
    /// already assigned when `check` is set. Entries before it stay
    /// assigned.
    pub fn assign_all(&mut self, vars: PageVars, check: bool) -> Result<&mut Self, ViewError> {
        for (key, value) in vars {
            self.assign(&key, value, check)?;
        }
        Ok(self)
    }

    /// Drop all pending variables.
    pub fn clear(&mut self) -> &mut Self {
        self.vars.clear();
        self
    }

    /// Assign `vars` and render `layout` without touching the cache or
    /// listeners.
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::DuplicateVariable`] on a variable collision, or
    /// [`ViewError::Template`] if rendering fails.
    pub fn fetch(&mut self, layout: &str, vars: PageVars) -> Result<String, ViewError> {
        self.assign_all(vars, true)?;
        self.engine.fetch(layout, &self.vars)
    }

    /// Cached HTML for the current request URI.
    #[must_use]
    pub fn fetch_from_cache(&self) -> Option<String> {
        let cache = self.cache.as_ref()?;
        let key = self.cache_key();
        let html = cache.get_string(&key);
        if html.is_some() {
            tracing::debug!(uri = %self.request_uri, key = %key, "Page cache hit");
        } else {
            tracing::debug!(uri = %self.request_uri, key = %key, "Page cache miss");
        }
        html
    }

    /// Cached HTML for the current request URI as a `200 text/html`
    /// response.
    #[must_use]
    pub fn render_from_cache(&self) -> Option<HtmlResponse> {
        self.fetch_from_cache().map(HtmlResponse::html)
    }

    /// Render `layout` into a response.
    ///
    /// A cached page for the current URI is returned as-is. Otherwise `vars`
    /// are assigned, listeners may rewrite the request, and the rendered
    /// HTML is cached when `options.cache_ttl` is set.
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::DuplicateVariable`] on a variable collision,
    /// [`ViewError::UncacheableResponse`] if caching was requested for a
    /// status other than 200, or [`ViewError::Template`] if rendering fails.
    pub fn render(
        &mut self,
        layout: &str,
        vars: PageVars,
        options: RenderOptions,
    ) -> Result<HtmlResponse, ViewError> {
        if let Some(response) = self.render_from_cache() {
            return Ok(response);
        }

        self.assign_all(vars, true)?;

        let mut event = BeforeRenderEvent::new(
            layout,
            std::mem::take(&mut self.vars),
            options.status,
            options.headers,
        );
        self.listeners.dispatch(&mut event);
        let (layout, vars, status, headers) = event.into_parts();
        self.vars = vars;

        if options.cache_ttl.is_some() && status != 200 {
            return Err(ViewError::UncacheableResponse { status });
        }

        let html = self.engine.fetch(&layout, &self.vars)?;

        if let Some(ttl) = options.cache_ttl {
            self.store(&html, ttl);
        }

        let mut response = HtmlResponse::new(status, html);
        for (name, value) in headers {
            response.set_header(name, value);
        }
        if !response.has_header(CONTENT_TYPE) {
            response.set_header(CONTENT_TYPE, TEXT_HTML);
        }
        Ok(response)
    }

    /// Render a page built with [`WebPage`].
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::Page`] if the page variables cannot be
    /// materialized, otherwise as [`View::render`].
    pub fn render_page(
        &mut self,
        layout: &str,
        page: &WebPage,
        options: RenderOptions,
    ) -> Result<HtmlResponse, ViewError> {
        let vars = page.webpage()?;
        self.render(layout, vars, options)
    }

    fn store(&self, html: &str, ttl_secs: u64) {
        let Some(cache) = &self.cache else {
            return;
        };
        let key = self.cache_key();
        let ttl = (ttl_secs > 0).then(|| Duration::from_secs(ttl_secs));
        cache.set_string(&key, html, ttl);
        tracing::debug!(uri = %self.request_uri, key = %key, ttl_secs, "Stored page in cache");
    }
}

impl std::fmt::Debug for View {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("View")
            .field("has_cache", &self.cache.is_some())
            .field("listeners", &self.listeners)
            .field("request_uri", &self.request_uri)
            .field("vars", &self.vars)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use pagekit_cache::{MemoryCache, NullCache};
    use pagekit_page::{AssetsCollection, Topology};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    /// Engine that counts calls and echoes the layout and title.
    #[derive(Default)]
    struct CountingEngine {
        calls: AtomicUsize,
    }

    impl CountingEngine {
        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl TemplateEngine for CountingEngine {
        fn fetch(&self, layout: &str, vars: &PageVars) -> Result<String, ViewError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let title = vars.get("title").and_then(Value::as_str).unwrap_or("");
            Ok(format!("<{layout}>{title}</{layout}>"))
        }
    }

    fn vars(value: Value) -> PageVars {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    fn cached_view(engine: &Arc<CountingEngine>, cache: &Arc<MemoryCache>) -> View {
        let engine = Arc::clone(engine);
        let cache = Arc::clone(cache);
        let mut view = View::new(engine).with_cache(cache);
        view.set_request_uri("/about?lang=en");
        view
    }

    #[test]
    fn test_cache_key() {
        assert_eq!(page_cache_key(""), "page_d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(
            page_cache_key("/about?lang=en"),
            "page_f5b634511469e82eb50e006cd6a2e060"
        );
    }

    #[test]
    fn test_render_sets_default_content_type() {
        let engine = Arc::new(CountingEngine::default());
        let mut view = View::new(engine);

        let response = view
            .render(
                "main",
                vars(json!({"title": "Hi"})),
                RenderOptions::new().header("X-Frame-Options", "DENY"),
            )
            .unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.body, "<main>Hi</main>");
        assert_eq!(response.header("content-type"), Some("text/html"));
        assert_eq!(response.header("X-Frame-Options"), Some("DENY"));
    }

    #[test]
    fn test_caller_content_type_is_kept() {
        let engine = Arc::new(CountingEngine::default());
        let mut view = View::new(engine);

        let response = view
            .render(
                "feed",
                PageVars::new(),
                RenderOptions::new()
                    .status(404)
                    .header("content-type", "application/xml"),
            )
            .unwrap();

        assert_eq!(response.status, 404);
        assert_eq!(response.headers.len(), 1);
        assert_eq!(response.header("Content-Type"), Some("application/xml"));
    }

    #[test]
    fn test_cache_round_trip_skips_engine() {
        let engine = Arc::new(CountingEngine::default());
        let cache = Arc::new(MemoryCache::new());

        let first = cached_view(&engine, &cache)
            .render(
                "main",
                vars(json!({"title": "Cached"})),
                RenderOptions::new().cache_ttl(60),
            )
            .unwrap();
        let second = cached_view(&engine, &cache)
            .render(
                "main",
                vars(json!({"title": "Different"})),
                RenderOptions::new(),
            )
            .unwrap();

        assert_eq!(engine.calls(), 1);
        assert_eq!(second.body, first.body);
        assert_eq!(second.status, 200);
        assert_eq!(second.header("Content-Type"), Some("text/html"));
    }

    #[test]
    fn test_zero_ttl_caches_without_expiry() {
        let engine = Arc::new(CountingEngine::default());
        let cache = Arc::new(MemoryCache::new());
        let mut view = cached_view(&engine, &cache);

        view.render("main", PageVars::new(), RenderOptions::new().cache_ttl(0))
            .unwrap();

        assert_eq!(
            cache.get_string(&page_cache_key("/about?lang=en")).as_deref(),
            Some("<main></main>")
        );
        assert_eq!(view.fetch_from_cache().as_deref(), Some("<main></main>"));
    }

    #[test]
    fn test_huge_ttl_is_stored() {
        let engine = Arc::new(CountingEngine::default());
        let cache = Arc::new(MemoryCache::new());
        let mut view = cached_view(&engine, &cache);

        view.render(
            "main",
            PageVars::new(),
            RenderOptions::new().cache_ttl(u64::MAX),
        )
        .unwrap();

        assert_eq!(view.fetch_from_cache().as_deref(), Some("<main></main>"));
    }

    #[test]
    fn test_no_ttl_does_not_cache() {
        let engine = Arc::new(CountingEngine::default());
        let cache = Arc::new(MemoryCache::new());
        let mut view = cached_view(&engine, &cache);

        view.render("main", PageVars::new(), RenderOptions::new())
            .unwrap();

        assert!(cache.is_empty());
        assert!(view.render_from_cache().is_none());
    }

    #[test]
    fn test_non_200_with_ttl_is_uncacheable() {
        let engine = Arc::new(CountingEngine::default());
        let cache = Arc::new(MemoryCache::new());
        let mut view = cached_view(&engine, &cache);

        let err = view
            .render(
                "main",
                PageVars::new(),
                RenderOptions::new().status(500).cache_ttl(60),
            )
            .unwrap_err();

        assert!(matches!(err, ViewError::UncacheableResponse { status: 500 }));
        assert!(cache.is_empty());
        assert_eq!(engine.calls(), 0);
    }

    #[test]
    fn test_duplicate_assign_fails_with_check() {
        let engine = Arc::new(CountingEngine::default());
        let mut view = View::new(engine);
        view.assign("title", "Framework", true).unwrap();

        let err = view.assign("title", "Page", true).unwrap_err();
        assert!(matches!(err, ViewError::DuplicateVariable(ref key) if key == "title"));

        view.assign("title", "Page", false).unwrap();
        assert_eq!(view.vars()["title"], "Page");

        let err = view
            .render("main", vars(json!({"title": "Again"})), RenderOptions::new())
            .unwrap_err();
        assert!(matches!(err, ViewError::DuplicateVariable(_)));
    }

    #[test]
    fn test_clear_and_fetch() {
        let engine = Arc::new(CountingEngine::default());
        let mut view = View::new(engine);
        view.assign_all(vars(json!({"title": "One", "x": 1})), true)
            .unwrap();
        view.clear();

        let html = view.fetch("p", vars(json!({"title": "Two"}))).unwrap();

        assert_eq!(html, "<p>Two</p>");
        assert_eq!(view.vars().len(), 1);
    }

    #[test]
    fn test_listeners_rewrite_request() {
        let engine = Arc::new(CountingEngine::default());
        let mut view = View::new(engine);
        view.listeners_mut()
            .subscribe(|event| {
                event
                    .set_layout("maintenance")
                    .set_var("title", "Down")
                    .set_response_code(503)
                    .set_header("Retry-After", "120");
            });

        let response = view
            .render("main", vars(json!({"title": "Up"})), RenderOptions::new())
            .unwrap();

        assert_eq!(response.body, "<maintenance>Down</maintenance>");
        assert_eq!(response.status, 503);
        assert_eq!(response.header("Retry-After"), Some("120"));
    }

    #[test]
    fn test_listener_status_change_blocks_caching() {
        let engine = Arc::new(CountingEngine::default());
        let cache = Arc::new(MemoryCache::new());
        let mut view = cached_view(&engine, &cache);
        view.listeners_mut().subscribe(|event| {
            event.set_response_code(404);
        });

        let err = view
            .render("main", PageVars::new(), RenderOptions::new().cache_ttl(0))
            .unwrap_err();

        assert!(matches!(err, ViewError::UncacheableResponse { status: 404 }));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_null_cache_always_renders() {
        let engine = Arc::new(CountingEngine::default());
        let shared = Arc::clone(&engine);
        let mut view = View::new(shared).with_cache(Arc::new(NullCache));

        view.render("a", PageVars::new(), RenderOptions::new().cache_ttl(0))
            .unwrap();
        view.render("a", PageVars::new(), RenderOptions::new().cache_ttl(0))
            .unwrap();

        assert_eq!(engine.calls(), 2);
    }

    #[test]
    fn test_render_page_propagates_page_errors() {
        let engine = Arc::new(CountingEngine::default());
        let mut view = View::new(engine);
        let mut page = WebPage::new(
            Arc::new(Topology::new()),
            Arc::new(AssetsCollection::new()),
        );
        page.set_page_title("From page");

        let response = view
            .render_page("main", &page, RenderOptions::new())
            .unwrap();
        assert_eq!(response.body, "<main>From page</main>");

        page.set_attribute("styles", "clash").unwrap();
        view.clear();
        let err = view
            .render_page("main", &page, RenderOptions::new())
            .unwrap_err();
        assert!(matches!(err, ViewError::Page(_)));
    }
}
