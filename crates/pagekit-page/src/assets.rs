//! Registry of named scripts and styles, plus pre-resolved bundles.
//!
//! Bundles are resolved when they are defined: [`AssetsCollection::set_collection`]
//! copies the current script and style entries into the bundle, so later
//! registry changes never reach an already-defined bundle.

use std::collections::HashMap;

use indexmap::IndexMap;
use pagekit_config::AssetsConfig;
use serde::Serialize;

use crate::error::PageError;

/// A registered script URL with the inline params for its `<script>` tag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScriptAsset {
    pub url: String,
    pub params: String,
}

/// A named, pre-resolved group of assets applied to a page in one call.
///
/// Maps preserve the key order given at definition time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AssetBundle {
    pub scripts_header: IndexMap<String, ScriptAsset>,
    pub scripts_footer: IndexMap<String, ScriptAsset>,
    pub styles: IndexMap<String, String>,
}

/// Script, style and bundle registries.
#[derive(Debug, Clone, Default)]
pub struct AssetsCollection {
    scripts: HashMap<String, ScriptAsset>,
    styles: HashMap<String, String>,
    collections: HashMap<String, AssetBundle>,
}

impl AssetsCollection {
    /// Create empty registries.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed registries from configuration.
    ///
    /// Scripts are registered first, then styles, then bundles, so every
    /// bundle resolves against the full seeded registries.
    ///
    /// # Errors
    ///
    /// Returns [`PageError::UnknownAssetKey`] if a bundle references a key
    /// that is not registered.
    pub fn from_config(config: &AssetsConfig) -> Result<Self, PageError> {
        let mut assets = Self::new();
        for (key, script) in &config.scripts {
            assets.set_script(key.as_str(), script.url(), script.params());
        }
        for (key, url) in &config.styles {
            assets.set_style(key.as_str(), url.as_str());
        }
        for (name, collection) in &config.collections {
            assets.set_collection(
                name.as_str(),
                &as_strs(&collection.scripts_header),
                &as_strs(&collection.scripts_footer),
                &as_strs(&collection.styles),
            )?;
        }
        Ok(assets)
    }

    /// Register a script, replacing any existing entry under `key`.
    pub fn set_script(
        &mut self,
        key: impl Into<String>,
        url: impl Into<String>,
        params: impl Into<String>,
    ) -> &mut Self {
        self.scripts.insert(
            key.into(),
            ScriptAsset {
                url: url.into(),
                params: params.into(),
            },
        );
        self
    }

    /// Register a style, replacing any existing entry under `key`.
    pub fn set_style(&mut self, key: impl Into<String>, url: impl Into<String>) -> &mut Self {
        self.styles.insert(key.into(), url.into());
        self
    }

    /// Define a bundle by resolving each key against the current registries.
    ///
    /// On error nothing is stored and any previous bundle of the same name is
    /// kept.
    ///
    /// # Errors
    ///
    /// Returns [`PageError::UnknownAssetKey`] for the first key that is not
    /// registered.
    pub fn set_collection(
        &mut self,
        name: impl Into<String>,
        header_keys: &[&str],
        footer_keys: &[&str],
        style_keys: &[&str],
    ) -> Result<&mut Self, PageError> {
        let bundle = AssetBundle {
            scripts_header: self.resolve_scripts(header_keys)?,
            scripts_footer: self.resolve_scripts(footer_keys)?,
            styles: self.resolve_styles(style_keys)?,
        };
        let name = name.into();
        tracing::debug!(
            collection = %name,
            header = bundle.scripts_header.len(),
            footer = bundle.scripts_footer.len(),
            styles = bundle.styles.len(),
            "Registered asset collection"
        );
        self.collections.insert(name, bundle);
        Ok(self)
    }

    /// Look up a bundle.
    ///
    /// # Errors
    ///
    /// Returns [`PageError::UnknownCollection`] if no bundle has that name.
    pub fn collection(&self, name: &str) -> Result<&AssetBundle, PageError> {
        self.collections
            .get(name)
            .ok_or_else(|| PageError::UnknownCollection(name.to_owned()))
    }

    /// Look up a registered script entry.
    ///
    /// # Errors
    ///
    /// Returns [`PageError::UnknownAssetKey`] if the key is not registered.
    pub fn script(&self, key: &str) -> Result<&ScriptAsset, PageError> {
        self.scripts
            .get(key)
            .ok_or_else(|| PageError::unknown_script(key))
    }

    /// URL of a registered script.
    ///
    /// # Errors
    ///
    /// Returns [`PageError::UnknownAssetKey`] if the key is not registered.
    pub fn script_url(&self, key: &str) -> Result<&str, PageError> {
        self.script(key).map(|script| script.url.as_str())
    }

    /// URL of a registered style.
    ///
    /// # Errors
    ///
    /// Returns [`PageError::UnknownAssetKey`] if the key is not registered.
    pub fn style_url(&self, key: &str) -> Result<&str, PageError> {
        self.styles
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| PageError::unknown_style(key))
    }

    /// Bundle names, sorted.
    pub fn collection_names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.collections.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered scripts.
    pub fn script_count(&self) -> usize {
        self.scripts.len()
    }

    /// Number of registered styles.
    pub fn style_count(&self) -> usize {
        self.styles.len()
    }

    /// Clear all three registries.
    pub fn reset(&mut self) -> &mut Self {
        self.scripts.clear();
        self.styles.clear();
        self.collections.clear();
        self
    }

    fn resolve_scripts(&self, keys: &[&str]) -> Result<IndexMap<String, ScriptAsset>, PageError> {
        keys.iter()
            .map(|&key| {
                self.script(key)
                    .map(|script| (key.to_owned(), script.clone()))
            })
            .collect()
    }

    fn resolve_styles(&self, keys: &[&str]) -> Result<IndexMap<String, String>, PageError> {
        keys.iter()
            .map(|&key| self.style_url(key).map(|url| (key.to_owned(), url.to_owned())))
            .collect()
    }
}

fn as_strs(values: &[String]) -> Vec<&str> {
    values.iter().map(String::as_str).collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::BTreeMap;

    use pagekit_config::{CollectionConfig, ScriptConfig};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::error::AssetKind;

    /// Registries used across the crate's tests.
    pub(crate) fn sample_assets() -> AssetsCollection {
        let mut ac = AssetsCollection::new();
        ac.set_style(
            "bootstrap5",
            "https://cdn.jsdelivr.net/npm/bootstrap@5.2.3/dist/css/bootstrap.min.css",
        )
        .set_script(
            "axios",
            "https://cdnjs.cloudflare.com/ajax/libs/axios/1.4.0/axios.min.js",
            "",
        )
        .set_script("jquery", "https://code.jquery.com/jquery-3.7.0.min.js", "")
        .set_script("vuejs", "https://cdn.jsdelivr.net/npm/vue@2.7.8/dist/vue.js", "")
        .set_script(
            "bootstrap5",
            "https://cdn.jsdelivr.net/npm/bootstrap@5.2.3/dist/js/bootstrap.min.js",
            "",
        );
        ac.set_collection("mycollection", &["vuejs"], &[], &["bootstrap5"])
            .unwrap();
        ac.set_script("myscript", "url", "").set_style("mystyle", "mystyleurl");
        ac.set_collection(
            "standard",
            &["bootstrap5", "jquery", "myscript"],
            &["axios"],
            &["bootstrap5", "mystyle"],
        )
        .unwrap();
        ac
    }

    #[test]
    fn test_standard_collection_is_resolved() {
        let ac = sample_assets();
        let standard = ac.collection("standard").unwrap();

        let header: Vec<_> = standard.scripts_header.keys().collect();
        assert_eq!(header, ["bootstrap5", "jquery", "myscript"]);
        assert_eq!(standard.scripts_header["myscript"].url, "url");
        assert_eq!(standard.scripts_header["myscript"].params, "");
        assert_eq!(
            standard.scripts_footer["axios"].url,
            "https://cdnjs.cloudflare.com/ajax/libs/axios/1.4.0/axios.min.js"
        );
        let styles: Vec<_> = standard.styles.keys().collect();
        assert_eq!(styles, ["bootstrap5", "mystyle"]);
        assert_eq!(standard.styles["mystyle"], "mystyleurl");
    }

    #[test]
    fn test_partial_collection() {
        let ac = sample_assets();
        let mine = ac.collection("mycollection").unwrap();

        assert!(mine.scripts_footer.is_empty());
        assert!(mine.scripts_header.contains_key("vuejs"));
        assert!(mine.styles.contains_key("bootstrap5"));
    }

    #[test]
    fn test_unknown_lookups_fail() {
        let ac = sample_assets();

        assert_eq!(
            ac.script_url("nope"),
            Err(PageError::UnknownAssetKey {
                kind: AssetKind::Script,
                key: "nope".to_owned()
            })
        );
        assert_eq!(
            ac.style_url("jquery"),
            Err(PageError::UnknownAssetKey {
                kind: AssetKind::Style,
                key: "jquery".to_owned()
            })
        );
        assert_eq!(
            ac.collection("missing"),
            Err(PageError::UnknownCollection("missing".to_owned()))
        );
    }

    #[test]
    fn test_set_collection_with_unknown_key_stores_nothing() {
        let mut ac = sample_assets();
        let before = ac.collection("standard").unwrap().clone();

        let err = ac
            .set_collection("standard", &["jquery"], &["ghost"], &[])
            .unwrap_err();

        assert_eq!(err, PageError::unknown_script("ghost"));
        assert_eq!(ac.collection("standard").unwrap(), &before);

        let err = ac
            .set_collection("fresh", &[], &[], &["ghost"])
            .unwrap_err();
        assert_eq!(err, PageError::unknown_style("ghost"));
        assert!(ac.collection("fresh").is_err());
    }

    #[test]
    fn test_collection_is_frozen_at_definition() {
        let mut ac = sample_assets();

        ac.set_script("jquery", "https://example.com/jquery-4.js", "defer")
            .set_style("mystyle", "changed");

        let standard = ac.collection("standard").unwrap();
        assert_eq!(
            standard.scripts_header["jquery"].url,
            "https://code.jquery.com/jquery-3.7.0.min.js"
        );
        assert_eq!(standard.styles["mystyle"], "mystyleurl");
        // The registry itself sees the new value
        assert_eq!(ac.script_url("jquery").unwrap(), "https://example.com/jquery-4.js");
    }

    #[test]
    fn test_upsert_overwrites() {
        let mut ac = AssetsCollection::new();
        ac.set_script("app", "/a.js", "").set_script("app", "/b.js", "async");

        assert_eq!(
            ac.script("app").unwrap(),
            &ScriptAsset {
                url: "/b.js".to_owned(),
                params: "async".to_owned()
            }
        );
        assert_eq!(ac.script_count(), 1);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut ac = sample_assets();
        ac.reset();

        assert_eq!(ac.script_count(), 0);
        assert_eq!(ac.style_count(), 0);
        assert!(ac.collection_names().is_empty());
        assert!(ac.script_url("jquery").is_err());
    }

    #[test]
    fn test_from_config() {
        let config = AssetsConfig {
            scripts: BTreeMap::from([
                (
                    "jquery".to_owned(),
                    ScriptConfig::Url("https://code.jquery.com/jquery.js".to_owned()),
                ),
                (
                    "app".to_owned(),
                    ScriptConfig::Detailed {
                        url: "/js/app.js".to_owned(),
                        params: "defer".to_owned(),
                    },
                ),
            ]),
            styles: BTreeMap::from([("site".to_owned(), "/css/site.css".to_owned())]),
            collections: BTreeMap::from([(
                "standard".to_owned(),
                CollectionConfig {
                    scripts_header: vec!["jquery".to_owned()],
                    scripts_footer: vec!["app".to_owned()],
                    styles: vec!["site".to_owned()],
                },
            )]),
        };

        let ac = AssetsCollection::from_config(&config).unwrap();

        assert_eq!(ac.collection_names(), ["standard"]);
        let standard = ac.collection("standard").unwrap();
        assert_eq!(standard.scripts_footer["app"].params, "defer");
        assert_eq!(standard.styles["site"], "/css/site.css");
    }

    #[test]
    fn test_from_config_rejects_unknown_reference() {
        let config = AssetsConfig {
            collections: BTreeMap::from([(
                "broken".to_owned(),
                CollectionConfig {
                    scripts_header: vec!["missing".to_owned()],
                    ..CollectionConfig::default()
                },
            )]),
            ..AssetsConfig::default()
        };

        let err = AssetsCollection::from_config(&config).unwrap_err();
        assert_eq!(err, PageError::unknown_script("missing"));
    }
}
