//! Error type for view rendering.

use pagekit_page::PageError;

/// Boxed error produced by a template engine.
pub type EngineError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised while assigning variables or rendering a view.
#[derive(Debug, thiserror::Error)]
pub enum ViewError {
    /// Variable assigned twice while duplicate checking was on.
    #[error("variable {0} is already assigned")]
    DuplicateVariable(String),

    /// Caching was requested for a response that is not `200 OK`.
    #[error("only 200 responses can be cached, got {status}")]
    UncacheableResponse { status: u16 },

    /// The template engine failed to load or render a layout.
    #[error("failed to render template {layout}: {source}")]
    Template {
        layout: String,
        #[source]
        source: EngineError,
    },

    /// Page variables could not be materialized.
    #[error(transparent)]
    Page(#[from] PageError),
}

impl ViewError {
    pub(crate) fn template(layout: &str, source: impl Into<EngineError>) -> Self {
        Self::Template {
            layout: layout.to_owned(),
            source: source.into(),
        }
    }
}
