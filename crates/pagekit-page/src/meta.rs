//! `<meta>` tags with set-or-append semantics.

use std::fmt;

/// A single `<meta attribute="value" content="...">` tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaTag {
    pub attribute: String,
    pub value: String,
    pub content: Option<String>,
}

impl fmt::Display for MetaTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<meta {}=\"{}\"", self.attribute, self.value)?;
        if let Some(content) = &self.content {
            write!(f, " content=\"{content}\"")?;
        }
        f.write_str(">")
    }
}

/// Ordered list of meta tags.
///
/// Setting a tag replaces a matching one in place, keeping its position:
/// tags with content match on `(attribute, value)`, tags without content
/// match on `attribute` alone. Anything else is appended.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetaTags(Vec<MetaTag>);

impl MetaTags {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a tag.
    pub fn set(&mut self, attribute: &str, value: &str, content: Option<&str>) {
        let tag = MetaTag {
            attribute: attribute.to_owned(),
            value: value.to_owned(),
            content: content.map(str::to_owned),
        };
        let existing = self.0.iter_mut().find(|t| {
            t.attribute == attribute && (content.is_none() || t.value == value)
        });
        match existing {
            Some(slot) => *slot = tag,
            None => self.0.push(tag),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &MetaTag> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Render every tag, one per line.
    #[must_use]
    pub fn render(&self) -> String {
        self.0.iter().map(|tag| format!("{tag}\n")).collect()
    }
}
