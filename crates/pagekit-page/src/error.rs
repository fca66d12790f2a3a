//! Page construction errors.

use std::fmt;

/// Which asset registry a key was looked up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Script,
    Style,
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Script => f.write_str("script"),
            Self::Style => f.write_str("style"),
        }
    }
}

/// Error raised while registering assets or building a page.
///
/// A page that hit one of these is unusable and should be discarded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PageError {
    /// A script or style key is not registered.
    #[error("{kind} key not found: {key}")]
    UnknownAssetKey {
        /// Registry that was searched.
        kind: AssetKind,
        /// The missing key.
        key: String,
    },
    /// A named asset collection is not defined.
    #[error("asset collection not found: {0}")]
    UnknownCollection(String),
    /// An attribute key was set twice or shadows a page variable.
    #[error("attribute with key {0} already exists")]
    DuplicateAttribute(String),
}

impl PageError {
    pub(crate) fn unknown_script(key: &str) -> Self {
        Self::UnknownAssetKey {
            kind: AssetKind::Script,
            key: key.to_owned(),
        }
    }

    pub(crate) fn unknown_style(key: &str) -> Self {
        Self::UnknownAssetKey {
            kind: AssetKind::Style,
            key: key.to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            PageError::unknown_script("jquery").to_string(),
            "script key not found: jquery"
        );
        assert_eq!(
            PageError::unknown_style("bootstrap5").to_string(),
            "style key not found: bootstrap5"
        );
        assert_eq!(
            PageError::UnknownCollection("standard".to_owned()).to_string(),
            "asset collection not found: standard"
        );
        assert_eq!(
            PageError::DuplicateAttribute("title".to_owned()).to_string(),
            "attribute with key title already exists"
        );
    }
}
