//! URL topology: where base, theme, library and asset URLs live, and where
//! templates are searched for.

use pagekit_config::TopologyConfig;

/// Named URL prefix slot in a [`Topology`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UrlRole {
    Base,
    Libs,
    Css,
    Js,
    Theme,
    Images,
    Fonts,
}

impl UrlRole {
    /// Every role, in the order the page variables list them.
    pub const ALL: [Self; 7] = [
        Self::Base,
        Self::Libs,
        Self::Css,
        Self::Js,
        Self::Theme,
        Self::Images,
        Self::Fonts,
    ];

    /// Name of the page variable that carries this URL.
    #[must_use]
    pub fn var_name(self) -> &'static str {
        match self {
            Self::Base => "base",
            Self::Libs => "libs",
            Self::Css => "css",
            Self::Js => "js",
            Self::Theme => "theme",
            Self::Images => "images",
            Self::Fonts => "fonts",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// URL prefixes and ordered template search paths.
///
/// Values are stored verbatim; no URL validation is performed. Unset roles
/// read as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Topology {
    urls: [String; 7],
    template_paths: Vec<String>,
}

impl Topology {
    /// Create an empty topology.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// URL stored under `role`, or `""` when unset.
    #[must_use]
    pub fn url(&self, role: UrlRole) -> &str {
        &self.urls[role.index()]
    }

    /// Store a URL under `role`.
    pub fn set_url(&mut self, role: UrlRole, url: impl Into<String>) -> &mut Self {
        self.urls[role.index()] = url.into();
        self
    }

    pub fn base_url(&self) -> &str {
        self.url(UrlRole::Base)
    }

    pub fn theme_url(&self) -> &str {
        self.url(UrlRole::Theme)
    }

    pub fn libs_url(&self) -> &str {
        self.url(UrlRole::Libs)
    }

    pub fn css_url(&self) -> &str {
        self.url(UrlRole::Css)
    }

    pub fn js_url(&self) -> &str {
        self.url(UrlRole::Js)
    }

    pub fn images_url(&self) -> &str {
        self.url(UrlRole::Images)
    }

    pub fn fonts_url(&self) -> &str {
        self.url(UrlRole::Fonts)
    }

    pub fn set_base_url(&mut self, url: impl Into<String>) -> &mut Self {
        self.set_url(UrlRole::Base, url)
    }

    pub fn set_theme_url(&mut self, url: impl Into<String>) -> &mut Self {
        self.set_url(UrlRole::Theme, url)
    }

    pub fn set_libs_url(&mut self, url: impl Into<String>) -> &mut Self {
        self.set_url(UrlRole::Libs, url)
    }

    pub fn set_css_url(&mut self, url: impl Into<String>) -> &mut Self {
        self.set_url(UrlRole::Css, url)
    }

    pub fn set_js_url(&mut self, url: impl Into<String>) -> &mut Self {
        self.set_url(UrlRole::Js, url)
    }

    pub fn set_images_url(&mut self, url: impl Into<String>) -> &mut Self {
        self.set_url(UrlRole::Images, url)
    }

    pub fn set_fonts_url(&mut self, url: impl Into<String>) -> &mut Self {
        self.set_url(UrlRole::Fonts, url)
    }

    /// Template search paths in insertion order.
    #[must_use]
    pub fn template_paths(&self) -> &[String] {
        &self.template_paths
    }

    /// Append a template search path unless the exact string is already
    /// present.
    pub fn set_template_path(&mut self, path: impl Into<String>) -> &mut Self {
        let path = path.into();
        if !self.template_paths.contains(&path) {
            self.template_paths.push(path);
        }
        self
    }

    /// Append several template search paths, skipping ones already present.
    pub fn set_template_paths<I, P>(&mut self, paths: I) -> &mut Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        for path in paths {
            self.set_template_path(path);
        }
        self
    }
}

impl From<&TopologyConfig> for Topology {
    fn from(config: &TopologyConfig) -> Self {
        let mut topology = Self::new();
        topology
            .set_base_url(config.base_url.as_str())
            .set_theme_url(config.theme_url.as_str())
            .set_libs_url(config.libs_url.as_str())
            .set_css_url(config.css_url.as_str())
            .set_js_url(config.js_url.as_str())
            .set_images_url(config.images_url.as_str())
            .set_fonts_url(config.fonts_url.as_str())
            .set_template_paths(config.template_paths.iter().map(String::as_str));
        topology
    }
}
