//! Browser import map accumulated across calls.

use indexmap::IndexMap;
use serde::Serialize;

/// Specifier → URL mapping rendered as `{"imports": {...}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportMap {
    imports: IndexMap<String, String>,
}

impl ImportMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or override a single specifier.
    pub fn insert(&mut self, specifier: impl Into<String>, url: impl Into<String>) {
        self.imports.insert(specifier.into(), url.into());
    }

    pub fn get(&self, specifier: &str) -> Option<&str> {
        self.imports.get(specifier).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.imports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.imports.is_empty()
    }

    pub fn clear(&mut self) {
        self.imports.clear();
    }

    /// Pretty-printed JSON with four-space indentation.
    #[must_use]
    pub fn to_json_pretty(&self) -> String {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        if self.serialize(&mut serializer).is_err() {
            return "{}".to_owned();
        }
        String::from_utf8(buf).unwrap_or_else(|_| "{}".to_owned())
    }

    /// The whole map wrapped in a `<script type="...">` block.
    #[must_use]
    pub fn to_script(&self, script_type: &str) -> String {
        format!(
            "<script type=\"{script_type}\">\n{}\n</script>",
            self.to_json_pretty()
        )
    }
}
