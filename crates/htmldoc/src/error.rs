//! Error types for document operations
//!
//! Simple, flat error hierarchy. Every variant is a local precondition
//! violation surfaced immediately to the caller; nothing is recovered
//! silently.

use crate::types::NodeId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DomError>;

#[derive(Debug, Error)]
pub enum DomError {
    /// Node construction requires a non-empty tag name.
    #[error("node tag must not be empty")]
    MissingTag,

    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    /// Id generation is only available on documents created in dynamic mode.
    #[error("document is not dynamic, cannot generate ids")]
    InvalidDocumentMode,

    /// An explicitly supplied id is already registered in this document.
    #[error("id already registered: {0}")]
    DuplicateId(String),
}
