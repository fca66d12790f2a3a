//! `pagekit render` command implementation.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use pagekit_cache::{CacheStore, FileCache};
use pagekit_config::{CliSettings, Config};
use pagekit_page::{AssetsCollection, Topology, WebPage};
use pagekit_view::{HtmlResponse, MiniJinjaEngine, RenderOptions, View};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Layout to render, relative to the template paths.
    layout: String,

    /// Path to configuration file (default: auto-discover pagekit.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Request URI used as the page cache key.
    #[arg(long, default_value = "/")]
    uri: String,

    /// Base URL (overrides config).
    #[arg(long, env = "PAGEKIT_BASE_URL")]
    base_url: Option<String>,

    /// Page title.
    #[arg(long)]
    title: Option<String>,

    /// Page description.
    #[arg(long)]
    description: Option<String>,

    /// Page header.
    #[arg(long)]
    header: Option<String>,

    /// Comma-separated page keywords.
    #[arg(long)]
    keywords: Option<String>,

    /// Asset bundle to apply (repeatable).
    #[arg(long = "collection")]
    collections: Vec<String>,

    /// Extra template variable as key=value (repeatable).
    #[arg(long = "attr", value_name = "KEY=VALUE")]
    attrs: Vec<String>,

    /// Response status code.
    #[arg(long, default_value_t = 200)]
    status: u16,

    /// Cache the rendered page for this many seconds (0 = no expiry).
    #[arg(long)]
    ttl: Option<u64>,

    /// Enable the page cache (overrides config).
    #[arg(long)]
    cache: Option<bool>,

    /// Disable the page cache.
    #[arg(long, conflicts_with = "cache")]
    no_cache: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

impl RenderArgs {
    /// Execute the render command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration, page assembly or rendering fails.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            base_url: self.base_url.clone(),
            cache_enabled: self.resolve_cache_enabled(),
            cache_dir: None,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        if let Some(path) = &config.config_path {
            tracing::info!(path = %path.display(), "Loaded configuration");
        }

        let response = self.render(&config)?;
        if response.status != 200 {
            output.warning(&format!("rendered with status {}", response.status));
        }

        let mut stdout = std::io::stdout().lock();
        stdout.write_all(response.body.as_bytes())?;
        stdout.flush()?;
        Ok(())
    }

    /// Build the page and render it through the view.
    fn render(&self, config: &Config) -> Result<HtmlResponse, CliError> {
        let topology = Arc::new(Topology::from(&config.topology));
        let assets = Arc::new(AssetsCollection::from_config(&config.assets)?);
        let page = self.build_page(Arc::clone(&topology), assets)?;

        let engine = MiniJinjaEngine::from_topology(&topology);
        let mut view = View::new(Arc::new(engine));
        let cache = &config.cache_resolved;
        let mut options = RenderOptions::new().status(self.status);
        if cache.enabled {
            let store: Arc<dyn CacheStore> =
                Arc::new(FileCache::new(cache.dir.clone(), &cache.version));
            view = view.with_cache(store);
            options.cache_ttl = self.cache_ttl(cache.default_ttl);
        }
        view.set_request_uri(self.uri.as_str());

        Ok(view.render_page(&self.layout, &page, options)?)
    }

    fn build_page(
        &self,
        topology: Arc<Topology>,
        assets: Arc<AssetsCollection>,
    ) -> Result<WebPage, CliError> {
        let mut page = WebPage::new(topology, assets);
        if let Some(title) = &self.title {
            page.set_page_title(title.as_str());
        }
        if let Some(description) = &self.description {
            page.set_page_description(description.as_str());
        }
        if let Some(header) = &self.header {
            page.set_page_header(header.as_str());
        }
        if let Some(keywords) = &self.keywords {
            page.set_page_keywords(keywords.as_str());
        }
        for name in &self.collections {
            page.apply_asset_collection(name)?;
        }
        for attr in &self.attrs {
            let (key, value) = parse_attr(attr)?;
            page.set_attribute(key, value)?;
        }
        Ok(page)
    }

    /// TTL to cache with: an explicit `--ttl`, else the configured default
    /// for 200 responses only.
    fn cache_ttl(&self, default_ttl: Option<u64>) -> Option<u64> {
        self.ttl.or_else(|| default_ttl.filter(|_| self.status == 200))
    }

    /// Resolve `cache_enabled` from --cache/--no-cache flags.
    fn resolve_cache_enabled(&self) -> Option<bool> {
        self.no_cache.then_some(false).or(self.cache)
    }
}

/// Split a `key=value` argument.
fn parse_attr(attr: &str) -> Result<(&str, &str), CliError> {
    match attr.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key, value)),
        _ => Err(CliError::Validation(format!(
            "invalid --attr {attr:?}, expected KEY=VALUE"
        ))),
    }
}
