//! View layer for PageKit.
//!
//! [`View`] merges page variables, lets [`RenderListeners`] rewrite the
//! request through a [`BeforeRenderEvent`], renders with a
//! [`TemplateEngine`] and caches the HTML under a hash of the request URI.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use pagekit_cache::MemoryCache;
//! use pagekit_page::PageVars;
//! use pagekit_view::{MiniJinjaEngine, RenderOptions, View};
//!
//! let engine = MiniJinjaEngine::from_templates([("home.html", "<h1>{{ title }}</h1>")])?;
//! let mut view = View::new(Arc::new(engine)).with_cache(Arc::new(MemoryCache::new()));
//! view.set_request_uri("/");
//!
//! let mut vars = PageVars::new();
//! vars.insert("title".to_owned(), "Welcome".into());
//! let response = view.render("home.html", vars, RenderOptions::new().cache_ttl(300))?;
//!
//! assert_eq!(response.body, "<h1>Welcome</h1>");
//! assert_eq!(response.header("Content-Type"), Some("text/html"));
//! # Ok::<(), pagekit_view::ViewError>(())
//! ```

mod engine;
mod error;
mod event;
mod response;
mod view;

pub use engine::{MiniJinjaEngine, TemplateEngine};
pub use error::{EngineError, ViewError};
pub use event::{BeforeRenderEvent, RenderListeners};
pub use response::HtmlResponse;
pub use view::{RenderOptions, View, page_cache_key};
