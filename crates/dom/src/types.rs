//! Core type definitions for the host document tree
//!
//! Key design principles:
//! 1. Use u32 for indices (4 bytes vs 8 bytes pointer)
//! 2. Use SmallVec for small arrays (avoid heap allocation)
//! 3. Keep attribute order as written, like a live document does

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Node identifier (index into arena)
/// u32 allows 4 billion nodes, enough for any document
pub type NodeId = u32;

/// Attribute storage: ordered (name, value) pairs
pub type AttributeList = SmallVec<[(String, String); 4]>;

/// Node type matching DOM specification codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum NodeType {
    Element = 1,
    Text = 3,
    Comment = 8,
    Document = 9,
}

impl NodeType {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(NodeType::Element),
            3 => Some(NodeType::Text),
            8 => Some(NodeType::Comment),
            9 => Some(NodeType::Document),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            NodeType::Element => "element",
            NodeType::Text => "text",
            NodeType::Comment => "comment",
            NodeType::Document => "document",
        }
    }
}

/// The main document tree node
///
/// Design philosophy:
/// - Small fixed-size fields first (better packing)
/// - Use indices instead of pointers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomNode {
    pub node_id: NodeId,
    pub node_type: NodeType,

    // Navigation indices
    pub parent_id: Option<NodeId>,
    pub children_ids: SmallVec<[NodeId; 4]>, // Most nodes have <4 children

    /// Tag name for elements, `#text` / `#comment` / `#document` otherwise
    pub node_name: String,
    /// Character data for text and comment nodes
    pub node_value: String,
    pub attributes: AttributeList,

    /// Identity of this node instance. A node rebuilt from another one
    /// never inherits it.
    pub uuid: String,
}

impl DomNode {
    /// Create a new node with required fields
    pub fn new(node_id: NodeId, node_type: NodeType, node_name: String) -> Self {
        Self {
            node_id,
            node_type,
            parent_id: None,
            children_ids: SmallVec::new(),
            node_name,
            node_value: String::new(),
            attributes: SmallVec::new(),
            uuid: uuid::Uuid::new_v4().to_string(),
        }
    }

    /// Get tag name for element nodes
    pub fn tag_name(&self) -> Option<&str> {
        if self.node_type == NodeType::Element {
            Some(&self.node_name)
        } else {
            None
        }
    }

    /// Check if node is an element
    pub fn is_element(&self) -> bool {
        self.node_type == NodeType::Element
    }

    /// Check if node is text
    pub fn is_text(&self) -> bool {
        self.node_type == NodeType::Text
    }

    /// Check if node may hold children
    pub fn can_have_children(&self) -> bool {
        matches!(self.node_type, NodeType::Element | NodeType::Document)
    }

    /// Get attribute value
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Document configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    /// Tag of the element new nodes attach to when no parent is given
    pub root_container: String,
    /// Arena pre-allocation
    pub capacity: usize,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            root_container: "body".to_string(),
            capacity: 1024, // Pre-allocate for typical page
        }
    }
}

/// Elements that never carry an end tag
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];
