//! Page builder that accumulates head metadata, scripts and styles into the
//! flat variable map handed to a template engine.
//!
//! A [`WebPage`] is request-scoped: build it, call [`WebPage::webpage`] once,
//! then drop it or [`WebPage::clear`] it. Topology and asset registries are
//! shared read-only through [`Arc`].

use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;

use crate::assets::AssetsCollection;
use crate::error::PageError;
use crate::import_map::ImportMap;
use crate::keywords::{KeywordSource, Keywords};
use crate::meta::MetaTags;
use crate::topology::{Topology, UrlRole};

/// Ordered variable map produced by [`WebPage::webpage`].
pub type PageVars = serde_json::Map<String, Value>;

/// Built-in page variable names, in output order.
pub const PAGE_VARIABLES: [&str; 17] = [
    "base",
    "libs",
    "css",
    "js",
    "theme",
    "images",
    "fonts",
    "microformat",
    "keywords",
    "meta_tags",
    "title",
    "header",
    "description",
    "importmap",
    "scripts_header",
    "scripts_footer",
    "styles",
];

/// Which script blob a tag is appended to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Placement {
    #[default]
    Header,
    Footer,
}

/// Builder for one page's template variables.
#[derive(Debug, Clone)]
pub struct WebPage {
    topology: Arc<Topology>,
    assets: Arc<AssetsCollection>,
    title: String,
    header: String,
    description: String,
    microformat: String,
    keywords: Keywords,
    meta_tags: MetaTags,
    import_map: ImportMap,
    importmap_html: String,
    scripts_header: String,
    scripts_footer: String,
    styles: String,
    attributes: IndexMap<String, Value>,
}

impl WebPage {
    /// Create an empty page over shared topology and asset registries.
    #[must_use]
    pub fn new(topology: Arc<Topology>, assets: Arc<AssetsCollection>) -> Self {
        Self {
            topology,
            assets,
            title: String::new(),
            header: String::new(),
            description: String::new(),
            microformat: String::new(),
            keywords: Keywords::new(),
            meta_tags: MetaTags::new(),
            import_map: ImportMap::new(),
            importmap_html: String::new(),
            scripts_header: String::new(),
            scripts_footer: String::new(),
            styles: String::new(),
            attributes: IndexMap::new(),
        }
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn assets(&self) -> &AssetsCollection {
        &self.assets
    }

    /// Store a JSON-LD microformat block verbatim.
    pub fn set_micro_formatting(&mut self, json: impl Into<String>) -> &mut Self {
        self.microformat = json.into();
        self
    }

    /// Union keywords into the page and refresh the keywords meta tag.
    ///
    /// A string is split on commas; list elements are taken whole. Empty
    /// entries and repeats are dropped, first occurrence wins.
    pub fn set_page_keywords(&mut self, keywords: impl KeywordSource) -> &mut Self {
        self.keywords.extend_from(keywords);
        if !self.keywords.is_empty() {
            let content = self.keywords.to_string();
            self.meta_tags.set("name", "keywords", Some(&content));
        }
        self
    }

    /// Set or append a `<meta>` tag.
    ///
    /// With `content`, a tag with the same attribute and value is replaced in
    /// place; without it, the first tag with the same attribute is.
    pub fn set_meta_tag(
        &mut self,
        attribute: &str,
        value: &str,
        content: Option<&str>,
    ) -> &mut Self {
        self.meta_tags.set(attribute, value, content);
        self
    }

    pub fn set_page_charset(&mut self, charset: &str) -> &mut Self {
        self.set_meta_tag("charset", charset, None)
    }

    pub fn set_page_viewport(&mut self, viewport: &str) -> &mut Self {
        self.set_meta_tag("name", "viewport", Some(viewport))
    }

    pub fn set_cache_control(&mut self, directive: &str) -> &mut Self {
        self.set_meta_tag("http-equiv", "Cache-Control", Some(directive))
    }

    pub fn set_expires(&mut self, directive: &str) -> &mut Self {
        self.set_meta_tag("http-equiv", "Expires", Some(directive))
    }

    pub fn set_last_modified(&mut self, date: &str) -> &mut Self {
        self.set_meta_tag("http-equiv", "Last-Modified", Some(date))
    }

    pub fn set_etag(&mut self, etag: &str) -> &mut Self {
        self.set_meta_tag("http-equiv", "ETag", Some(etag))
    }

    pub fn set_pragma(&mut self, directive: &str) -> &mut Self {
        self.set_meta_tag("http-equiv", "Pragma", Some(directive))
    }

    pub fn set_page_title(&mut self, title: impl Into<String>) -> &mut Self {
        self.title = title.into();
        self
    }

    pub fn set_page_header(&mut self, header: impl Into<String>) -> &mut Self {
        self.header = header.into();
        self
    }

    pub fn set_page_description(&mut self, description: impl Into<String>) -> &mut Self {
        self.description = description.into();
        self
    }

    /// Merge entries into the import map and rebuild its `<script>` block.
    ///
    /// `internal` entries are resolved as `{libs}/{value}`; others are used
    /// verbatim. Entries from earlier calls are kept unless overridden.
    pub fn set_import_map<I, K, V>(
        &mut self,
        entries: I,
        internal: bool,
        script_type: &str,
    ) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        for (specifier, value) in entries {
            let url = if internal {
                format!("{}/{}", self.topology.libs_url(), value.as_ref())
            } else {
                value.as_ref().to_owned()
            };
            self.import_map.insert(specifier, url);
        }
        self.importmap_html = self.import_map.to_script(script_type);
        self
    }

    /// Append a `<script>` tag for an absolute URL.
    pub fn set_script_cdn(&mut self, url: &str, placement: Placement, params: &str) -> &mut Self {
        let tag = script_tag(url, params);
        self.blob_mut(placement).push_str(&tag);
        self
    }

    /// Append a `<script>` tag for `{js}/{name}`, with `?v={version}` when a
    /// version is given.
    pub fn set_script(
        &mut self,
        name: &str,
        placement: Placement,
        params: &str,
        version: &str,
    ) -> &mut Self {
        let url = format!("{}/{name}{}", self.topology.js_url(), version_suffix(version));
        self.set_script_cdn(&url, placement, params)
    }

    /// Append a `<script>` tag for `{libs}/{name}`.
    pub fn set_script_from_global(
        &mut self,
        name: &str,
        placement: Placement,
        params: &str,
    ) -> &mut Self {
        let url = format!("{}/{name}", self.topology.libs_url());
        self.set_script_cdn(&url, placement, params)
    }

    /// Append `<script>` tags for registered scripts.
    ///
    /// `keys` may be a comma-separated list. When `params` is empty, each
    /// script's registered params are used.
    ///
    /// # Errors
    ///
    /// Returns [`PageError::UnknownAssetKey`] for an unregistered key. Tags
    /// for keys before the failing one have already been appended.
    pub fn set_script_from_lib(
        &mut self,
        keys: &str,
        placement: Placement,
        params: &str,
    ) -> Result<&mut Self, PageError> {
        let assets = Arc::clone(&self.assets);
        for key in keys.split(',') {
            let script = assets.script(key)?;
            let params = if params.is_empty() {
                script.params.as_str()
            } else {
                params
            };
            self.set_script_cdn(&script.url, placement, params);
        }
        Ok(self)
    }

    /// Append a stylesheet `<link>` for an absolute URL.
    pub fn set_style_cdn(&mut self, url: &str) -> &mut Self {
        self.styles.push_str(&style_tag(url));
        self
    }

    /// Append a stylesheet `<link>` for `{css}/{name}`, with `?v={version}`
    /// when a version is given.
    pub fn set_style(&mut self, name: &str, version: &str) -> &mut Self {
        let url = format!("{}/{name}{}", self.topology.css_url(), version_suffix(version));
        self.set_style_cdn(&url)
    }

    /// Append a stylesheet `<link>` for `{libs}/{name}`.
    pub fn set_style_from_global(&mut self, name: &str) -> &mut Self {
        let url = format!("{}/{name}", self.topology.libs_url());
        self.set_style_cdn(&url)
    }

    /// Append stylesheet `<link>`s for registered styles.
    ///
    /// # Errors
    ///
    /// Returns [`PageError::UnknownAssetKey`] for an unregistered key.
    pub fn set_style_from_lib(&mut self, keys: &str) -> Result<&mut Self, PageError> {
        let assets = Arc::clone(&self.assets);
        for key in keys.split(',') {
            self.set_style_cdn(assets.style_url(key)?);
        }
        Ok(self)
    }

    /// Append pre-built markup to a script blob as-is.
    pub fn append_scripts(&mut self, data: &str, placement: Placement) -> &mut Self {
        self.blob_mut(placement).push_str(data);
        self
    }

    /// Append every asset of a bundle: header scripts, footer scripts, then
    /// styles, each in the bundle's order.
    ///
    /// # Errors
    ///
    /// Returns [`PageError::UnknownCollection`] if no bundle has this name.
    pub fn apply_asset_collection(&mut self, name: &str) -> Result<&mut Self, PageError> {
        let assets = Arc::clone(&self.assets);
        let bundle = assets.collection(name)?;
        for script in bundle.scripts_header.values() {
            self.set_script_cdn(&script.url, Placement::Header, &script.params);
        }
        for script in bundle.scripts_footer.values() {
            self.set_script_cdn(&script.url, Placement::Footer, &script.params);
        }
        for url in bundle.styles.values() {
            self.set_style_cdn(url);
        }
        Ok(self)
    }

    /// Add a free-form template variable.
    ///
    /// Collisions with built-in variable names are only detected by
    /// [`WebPage::webpage`].
    ///
    /// # Errors
    ///
    /// Returns [`PageError::DuplicateAttribute`] if `key` was already set.
    pub fn set_attribute(
        &mut self,
        key: &str,
        value: impl Into<Value>,
    ) -> Result<&mut Self, PageError> {
        if self.attributes.contains_key(key) {
            return Err(PageError::DuplicateAttribute(key.to_owned()));
        }
        self.attributes.insert(key.to_owned(), value.into());
        Ok(self)
    }

    /// Materialize the flat variable map: built-in variables in
    /// [`PAGE_VARIABLES`] order, then attributes in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`PageError::DuplicateAttribute`] if an attribute shadows a
    /// built-in variable.
    pub fn webpage(&self) -> Result<PageVars, PageError> {
        let mut vars = PageVars::new();
        for role in UrlRole::ALL {
            vars.insert(role.var_name().to_owned(), self.topology.url(role).into());
        }
        let fields = [
            ("microformat", self.microformat.clone()),
            ("keywords", self.keywords.to_string()),
            ("meta_tags", self.meta_tags.render()),
            ("title", self.title.clone()),
            ("header", self.header.clone()),
            ("description", self.description.clone()),
            ("importmap", self.importmap_html.clone()),
            ("scripts_header", self.scripts_header.clone()),
            ("scripts_footer", self.scripts_footer.clone()),
            ("styles", self.styles.clone()),
        ];
        for (name, value) in fields {
            vars.insert(name.to_owned(), Value::String(value));
        }

        for (key, value) in &self.attributes {
            if vars.contains_key(key) {
                return Err(PageError::DuplicateAttribute(key.clone()));
            }
            vars.insert(key.clone(), value.clone());
        }
        Ok(vars)
    }

    /// Reset accumulated page state, keeping topology and assets.
    pub fn clear(&mut self) -> &mut Self {
        *self = Self::new(Arc::clone(&self.topology), Arc::clone(&self.assets));
        self
    }

    fn blob_mut(&mut self, placement: Placement) -> &mut String {
        match placement {
            Placement::Header => &mut self.scripts_header,
            Placement::Footer => &mut self.scripts_footer,
        }
    }
}

fn script_tag(url: &str, params: &str) -> String {
    if params.is_empty() {
        format!("<script src=\"{url}\"></script>\r\n")
    } else {
        format!("<script {params} src=\"{url}\"></script>\r\n")
    }
}

fn style_tag(url: &str) -> String {
    format!("<link rel=\"stylesheet\" href=\"{url}\">\r\n")
}

fn version_suffix(version: &str) -> String {
    if version.is_empty() {
        String::new()
    } else {
        format!("?v={version}")
    }
}
