//! Typed inputs for element accessors
//!
//! Each accessor takes a closed set of variants instead of "any value",
//! so a malformed argument is a compile error or an explicit
//! `InvalidInput`, never a silently ignored write.

use crate::error::{ElementError, Result};
use crate::handle::ElementHandle;
use dom::{DocumentHost, NodeId};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// One entry of an element's child list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Child {
    /// Literal text, materialized as a new text node
    Text(String),
    /// An existing node, moved under the element
    Node(NodeId),
}

impl From<&str> for Child {
    fn from(text: &str) -> Self {
        Child::Text(text.to_string())
    }
}

impl From<String> for Child {
    fn from(text: String) -> Self {
        Child::Text(text)
    }
}

impl From<NodeId> for Child {
    fn from(node_id: NodeId) -> Self {
        Child::Node(node_id)
    }
}

impl TryFrom<&ElementHandle> for Child {
    type Error = ElementError;

    fn try_from(handle: &ElementHandle) -> Result<Self> {
        handle
            .node()
            .map(Child::Node)
            .ok_or(ElementError::DetachedNodeAccess)
    }
}

/// Where an element is attached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Parent {
    /// The host's root container
    #[default]
    Root,
    Node(NodeId),
}

impl Parent {
    /// Concrete node this parent refers to
    pub fn resolve<H: DocumentHost + ?Sized>(self, host: &H) -> NodeId {
        match self {
            Parent::Root => host.root_container(),
            Parent::Node(node_id) => node_id,
        }
    }
}

impl From<NodeId> for Parent {
    fn from(node_id: NodeId) -> Self {
        Parent::Node(node_id)
    }
}

impl TryFrom<&ElementHandle> for Parent {
    type Error = ElementError;

    fn try_from(handle: &ElementHandle) -> Result<Self> {
        handle
            .node()
            .map(Parent::Node)
            .ok_or(ElementError::DetachedNodeAccess)
    }
}

/// Target slot among siblings
///
/// Serialized as `"first"`, `"last"` or `{"index": n}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    First,
    Last,
    /// Zero-based: exactly `index` siblings end up before the element.
    /// Past the end means last.
    #[serde(untagged)]
    Index { index: usize },
}

impl Position {
    pub fn index(index: usize) -> Self {
        Position::Index { index }
    }

    /// Insertion slot in a sibling list of `len` entries (self excluded)
    pub fn slot(self, len: usize) -> usize {
        match self {
            Position::First => 0,
            Position::Last => len,
            Position::Index { index } => index.min(len),
        }
    }
}

impl FromStr for Position {
    type Err = ElementError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "first" => Ok(Position::First),
            "last" => Ok(Position::Last),
            other => other.parse::<usize>().map(Position::index).map_err(|_| {
                ElementError::invalid(format!(
                    "position must be \"first\", \"last\" or an index, got {:?}",
                    s
                ))
            }),
        }
    }
}
