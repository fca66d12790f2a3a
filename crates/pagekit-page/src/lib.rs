//! Page assembly for PageKit.
//!
//! This crate builds the variable map a template receives for one page:
//!
//! - [`Topology`]: URL prefixes (base, theme, libs, css, js, images, fonts)
//!   and template search paths
//! - [`AssetsCollection`]: named scripts, styles and pre-resolved bundles
//! - [`WebPage`]: title, meta tags, keywords, import map, script and style
//!   blobs, and free-form attributes, flattened by [`WebPage::webpage`]
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use pagekit_page::{AssetsCollection, Placement, Topology, WebPage};
//!
//! let mut topology = Topology::new();
//! topology.set_base_url("https://example.com").set_js_url("https://example.com/js");
//!
//! let mut assets = AssetsCollection::new();
//! assets.set_script("jquery", "https://code.jquery.com/jquery.min.js", "");
//!
//! let mut page = WebPage::new(Arc::new(topology), Arc::new(assets));
//! page.set_page_title("Home").set_script("app.js", Placement::Footer, "defer", "3");
//! page.set_script_from_lib("jquery", Placement::Header, "")?;
//!
//! let vars = page.webpage()?;
//! assert_eq!(vars["title"], "Home");
//! # Ok::<(), pagekit_page::PageError>(())
//! ```

mod assets;
mod error;
mod import_map;
mod keywords;
mod meta;
mod topology;
mod webpage;

pub use assets::{AssetBundle, AssetsCollection, ScriptAsset};
pub use error::{AssetKind, PageError};
pub use import_map::ImportMap;
pub use keywords::{KeywordSource, Keywords};
pub use meta::{MetaTag, MetaTags};
pub use topology::{Topology, UrlRole};
pub use webpage::{PAGE_VARIABLES, PageVars, Placement, WebPage};
