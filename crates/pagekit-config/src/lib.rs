//! Configuration management for PageKit.
//!
//! Parses `pagekit.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! URL values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - every `topology.*_url`
//! - every `assets.scripts.*` and `assets.styles.*` URL

mod expand;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override base URL.
    pub base_url: Option<String>,
    /// Override cache enabled flag.
    pub cache_enabled: Option<bool>,
    /// Override cache directory.
    pub cache_dir: Option<PathBuf>,
}

/// Configuration filename to search for.
pub const CONFIG_FILENAME: &str = "pagekit.toml";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// URL prefixes and template search paths.
    pub topology: TopologyConfig,
    /// Script/style registries and named bundles.
    pub assets: AssetsConfig,
    /// Cache configuration (paths are relative strings from TOML).
    cache: CacheConfigRaw,

    /// Resolved cache configuration (set after loading).
    #[serde(skip)]
    pub cache_resolved: CacheConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// URL prefixes and template search paths.
///
/// Template paths are resolved against the config file directory on load.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TopologyConfig {
    pub base_url: String,
    pub theme_url: String,
    pub libs_url: String,
    pub css_url: String,
    pub js_url: String,
    pub images_url: String,
    pub fonts_url: String,
    pub template_paths: Vec<String>,
}

/// Script and style registries plus named bundles.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AssetsConfig {
    /// Scripts by key.
    pub scripts: BTreeMap<String, ScriptConfig>,
    /// Style URLs by key.
    pub styles: BTreeMap<String, String>,
    /// Bundles by name, referencing script/style keys.
    pub collections: BTreeMap<String, CollectionConfig>,
}

/// A registered script: either a bare URL or a URL with inline tag params.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ScriptConfig {
    /// `jquery = "https://..."`
    Url(String),
    /// `app = { url = "...", params = "defer" }`
    Detailed {
        url: String,
        #[serde(default)]
        params: String,
    },
}

impl ScriptConfig {
    /// Script URL.
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            Self::Url(url) | Self::Detailed { url, .. } => url,
        }
    }

    /// Inline params for the `<script>` tag (empty for bare URLs).
    #[must_use]
    pub fn params(&self) -> &str {
        match self {
            Self::Url(_) => "",
            Self::Detailed { params, .. } => params,
        }
    }

    fn url_mut(&mut self) -> &mut String {
        match self {
            Self::Url(url) | Self::Detailed { url, .. } => url,
        }
    }
}

/// A named bundle of asset keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CollectionConfig {
    pub scripts_header: Vec<String>,
    pub scripts_footer: Vec<String>,
    pub styles: Vec<String>,
}

/// Raw cache configuration as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct CacheConfigRaw {
    enabled: Option<bool>,
    dir: Option<String>,
    version: Option<String>,
    default_ttl: Option<u64>,
}

/// Resolved cache configuration with absolute paths.
#[derive(Debug, Default)]
pub struct CacheConfig {
    /// Whether rendered pages are cached.
    pub enabled: bool,
    /// Directory for cached pages.
    pub dir: PathBuf,
    /// Cache version; a change wipes the cache directory.
    pub version: String,
    /// TTL applied when the caller does not pass one (`0` = no expiry).
    pub default_ttl: Option<u64>,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`topology.libs_url`").
        field: String,
        /// Error message (e.g., "${`CDN_URL`} not set").
        message: String,
    },
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `pagekit.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or validation fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Parse configuration from a TOML string, resolving paths against
    /// `base_dir`.
    ///
    /// # Errors
    ///
    /// Returns error if parsing, expansion or validation fails.
    pub fn from_toml_str(content: &str, base_dir: &Path) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(content)?;
        config.expand_env_vars()?;
        config.resolve_paths(base_dir);
        config.validate()?;
        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(base_url) = &settings.base_url {
            self.topology.base_url.clone_from(base_url);
        }
        if let Some(cache_enabled) = settings.cache_enabled {
            self.cache_resolved.enabled = cache_enabled;
        }
        if let Some(cache_dir) = &settings.cache_dir {
            self.cache_resolved.dir.clone_from(cache_dir);
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            topology: TopologyConfig::default(),
            assets: AssetsConfig::default(),
            cache: CacheConfigRaw::default(),
            cache_resolved: CacheConfig {
                enabled: false,
                dir: base.join(".pagekit").join("cache"),
                version: env!("CARGO_PKG_VERSION").to_owned(),
                default_ttl: None,
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config_dir = path.parent().unwrap_or(Path::new("."));
        let mut config = Self::from_toml_str(&content, config_dir)?;
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Checks that every bundle only references registered keys and that the
    /// cache version is usable. Called automatically after loading from file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_collections()?;
        self.validate_cache()?;
        Ok(())
    }

    /// Validate that bundles reference registered scripts and styles.
    fn validate_collections(&self) -> Result<(), ConfigError> {
        for (name, collection) in &self.assets.collections {
            let scripts = collection
                .scripts_header
                .iter()
                .chain(&collection.scripts_footer);
            for key in scripts {
                if !self.assets.scripts.contains_key(key) {
                    return Err(ConfigError::Validation(format!(
                        "assets.collections.{name} references unknown script '{key}'"
                    )));
                }
            }
            for key in &collection.styles {
                if !self.assets.styles.contains_key(key) {
                    return Err(ConfigError::Validation(format!(
                        "assets.collections.{name} references unknown style '{key}'"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Validate cache configuration.
    fn validate_cache(&self) -> Result<(), ConfigError> {
        if self.cache_resolved.enabled && self.cache_resolved.version.is_empty() {
            return Err(ConfigError::Validation(
                "cache.version cannot be empty".to_owned(),
            ));
        }
        Ok(())
    }

    /// Expand environment variable references in URL strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        let topology = &mut self.topology;
        for (field, value) in [
            ("topology.base_url", &mut topology.base_url),
            ("topology.theme_url", &mut topology.theme_url),
            ("topology.libs_url", &mut topology.libs_url),
            ("topology.css_url", &mut topology.css_url),
            ("topology.js_url", &mut topology.js_url),
            ("topology.images_url", &mut topology.images_url),
            ("topology.fonts_url", &mut topology.fonts_url),
        ] {
            *value = expand::expand_env(value, field)?;
        }

        for (key, script) in &mut self.assets.scripts {
            let url = script.url_mut();
            *url = expand::expand_env(url, &format!("assets.scripts.{key}"))?;
        }
        for (key, url) in &mut self.assets.styles {
            *url = expand::expand_env(url, &format!("assets.styles.{key}"))?;
        }

        Ok(())
    }

    /// Resolve relative paths to absolute paths based on config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        self.topology.template_paths = self
            .topology
            .template_paths
            .iter()
            .map(|p| config_dir.join(p).display().to_string())
            .collect();

        self.cache_resolved = CacheConfig {
            enabled: self.cache.enabled.unwrap_or(false),
            dir: config_dir.join(self.cache.dir.as_deref().unwrap_or(".pagekit/cache")),
            version: self
                .cache
                .version
                .clone()
                .unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_owned()),
            default_ttl: self.cache.default_ttl,
        };
    }
}
