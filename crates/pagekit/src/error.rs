//! CLI error types.

use pagekit_config::ConfigError;
use pagekit_page::PageError;
use pagekit_view::ViewError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Page(#[from] PageError),

    #[error("{0}")]
    View(#[from] ViewError),

    #[error("{0}")]
    Validation(String),
}
