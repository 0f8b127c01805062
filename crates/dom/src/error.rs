//! Error types for host tree operations
//!
//! Simple, flat error hierarchy. No over-engineering.

use crate::types::NodeId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DomError>;

#[derive(Debug, Error)]
pub enum DomError {
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Invalid node type: expected {expected}, got {actual}")]
    InvalidNodeType { expected: String, actual: String },

    #[error("Invalid name: {0:?}")]
    InvalidName(String),

    #[error("Hierarchy request error: {0}")]
    HierarchyRequest(String),

    #[error("Node {child} is not a child of {parent}")]
    NotAChild { parent: NodeId, child: NodeId },

    #[error("Malformed fragment: {0}")]
    Malformed(String),

    #[error("Parse error: {0}")]
    ParseError(#[from] serde_json::Error),
}
