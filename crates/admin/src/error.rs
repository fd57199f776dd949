//! Unified error handling for admin.

use thiserror::Error;

use crate::catalog::CatalogError;
use crate::config::ConfigError;
use crate::editor::EditorError;

/// Application-level error type for admin tooling.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Products API operation failed.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Product form submission failed.
    #[error("Editor error: {0}")]
    Editor(#[from] EditorError),

    /// Local file access failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Bad input from the caller.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl AppError {
    /// Whether the error means the requested product does not exist.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::Catalog(CatalogError::NotFound(_))
                | Self::Editor(EditorError::Catalog(CatalogError::NotFound(_)))
        )
    }
}
