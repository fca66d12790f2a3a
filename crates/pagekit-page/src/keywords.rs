//! Ordered keyword set serialized as a comma-joined list.

use std::fmt;

use indexmap::IndexSet;

/// Values accepted by [`Keywords::extend_from`].
///
/// A single string is split on commas; list elements are taken as-is.
pub trait KeywordSource {
    fn into_keywords(self) -> Vec<String>;
}

impl KeywordSource for &str {
    fn into_keywords(self) -> Vec<String> {
        self.split(',').map(str::to_owned).collect()
    }
}

impl KeywordSource for String {
    fn into_keywords(self) -> Vec<String> {
        self.as_str().into_keywords()
    }
}

impl<S: AsRef<str>> KeywordSource for &[S] {
    fn into_keywords(self) -> Vec<String> {
        self.iter().map(|s| s.as_ref().to_owned()).collect()
    }
}

impl<S: AsRef<str>, const N: usize> KeywordSource for [S; N] {
    fn into_keywords(self) -> Vec<String> {
        self.as_slice().into_keywords()
    }
}

impl<S: AsRef<str>> KeywordSource for Vec<S> {
    fn into_keywords(self) -> Vec<String> {
        self.as_slice().into_keywords()
    }
}

/// Set of keywords kept in first-occurrence order.
///
/// Empty entries are never stored, so the serialized form has no stray
/// commas.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Keywords(IndexSet<String>);

impl Keywords {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Union `source` into the set.
    pub fn extend_from(&mut self, source: impl KeywordSource) {
        self.0.extend(
            source
                .into_keywords()
                .into_iter()
                .filter(|keyword| !keyword.is_empty()),
        );
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

impl fmt::Display for Keywords {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, keyword) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            f.write_str(keyword)?;
        }
        Ok(())
    }
}
