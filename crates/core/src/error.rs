//! Engine error types
//!
//! Errors here are always scoped to a single page, element or gesture. None
//! of them halts interaction with the rest of the document.

use crate::config::ConfigError;
use crate::element::ElementId;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A page's raster or text runs never arrived, or arrived malformed
    #[error("page {page} failed to render: {reason}")]
    PageRender { page: usize, reason: String },

    #[error("page {page} out of range (page_count={count})")]
    PageOutOfRange { page: usize, count: usize },

    /// A page completion arrived for a document that has since been replaced
    #[error("page data belongs to a document that is no longer loaded")]
    StaleDocument,

    /// Update/delete/duplicate targeted a missing id; logged, never returned by those calls
    #[error("no element with id {0}")]
    InvalidElementReference(ElementId),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;
