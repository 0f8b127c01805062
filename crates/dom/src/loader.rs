//! Fragment loader - build nodes from CDP-shaped JSON
//!
//! Input format matches a CDP `DOM.Node` (without ids, which the arena
//! assigns itself):
//! ```json
//! {
//!   "nodeType": 1,
//!   "nodeName": "UL",
//!   "attributes": ["id", "list1"],
//!   "children": [
//!     { "nodeType": 3, "nodeName": "#text", "nodeValue": "a" }
//!   ]
//! }
//! ```
//!
//! Element names are lowercased, the way an HTML document stores them.

use crate::arena::DomArena;
use crate::error::{DomError, Result};
use crate::types::{NodeId, NodeType};
use crate::utils::{validate_attribute_name, validate_tag_name};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Configuration for fragment loading
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Deepest nesting accepted before the fragment is rejected
    pub max_depth: usize,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self { max_depth: 256 }
    }
}

/// Builds detached or attached subtrees inside an arena
pub struct DomLoader<'a> {
    config: LoaderConfig,
    arena: &'a mut DomArena,
}

impl<'a> DomLoader<'a> {
    pub fn new(arena: &'a mut DomArena) -> Self {
        Self::with_config(arena, LoaderConfig::default())
    }

    pub fn with_config(arena: &'a mut DomArena, config: LoaderConfig) -> Self {
        Self { config, arena }
    }

    /// Parse a JSON string and load it, see [`DomLoader::load`]
    pub fn load_str(&mut self, json: &str, parent: Option<NodeId>) -> Result<NodeId> {
        let value: Value = serde_json::from_str(json)?;
        self.load(&value, parent)
    }

    /// Load a fragment, returning the id of its root node
    ///
    /// With `parent` the new subtree is appended there; without it the
    /// subtree stays detached. The whole fragment is checked before the
    /// first node is allocated, so a rejected fragment leaves the arena
    /// exactly as it was.
    pub fn load(&mut self, fragment: &Value, parent: Option<NodeId>) -> Result<NodeId> {
        if let Some(parent_id) = parent {
            let parent_node = self.arena.get(parent_id)?;
            if !parent_node.can_have_children() {
                return Err(DomError::HierarchyRequest(format!(
                    "{} node {} cannot have children",
                    parent_node.node_type.name(),
                    parent_id
                )));
            }
        }
        self.validate_node(fragment, 0)?;

        let root_id = self.build_node(fragment)?;
        if let Some(parent_id) = parent {
            self.arena.append_child(parent_id, root_id)?;
        }
        tracing::debug!("Loaded fragment rooted at node {}", root_id);
        Ok(root_id)
    }

    /// Check a CDP-shaped node and its descendants without touching the arena
    fn validate_node(&self, cdp_node: &Value, depth: usize) -> Result<()> {
        if depth > self.config.max_depth {
            return Err(DomError::Malformed(format!(
                "nesting deeper than {}",
                self.config.max_depth
            )));
        }

        let node_type = node_type_of(cdp_node)?;
        if node_type == NodeType::Element {
            validate_tag_name(&element_name(cdp_node)?)?;
        }

        // Attributes come as a flat [name, value, name, value, ...] array
        let attrs = attribute_pairs(cdp_node)?;
        if !attrs.is_empty() && node_type != NodeType::Element {
            return Err(DomError::InvalidNodeType {
                expected: NodeType::Element.name().to_string(),
                actual: node_type.name().to_string(),
            });
        }
        for (key, _) in attrs {
            validate_attribute_name(key)?;
        }

        let children = child_list(cdp_node)?;
        if !children.is_empty() && node_type != NodeType::Element {
            return Err(DomError::HierarchyRequest(format!(
                "{} node cannot have children",
                node_type.name()
            )));
        }
        for child in children {
            self.validate_node(child, depth + 1)?;
        }
        Ok(())
    }

    /// Allocate a node that already passed [`DomLoader::validate_node`]
    fn build_node(&mut self, cdp_node: &Value) -> Result<NodeId> {
        let node_value = cdp_node["nodeValue"].as_str().unwrap_or("");
        let node_id = match node_type_of(cdp_node)? {
            NodeType::Element => self.arena.create_element(&element_name(cdp_node)?)?,
            NodeType::Text => self.arena.create_text(node_value),
            NodeType::Comment => self.arena.create_comment(node_value),
            NodeType::Document => return Err(document_rejected()),
        };

        for (key, value) in attribute_pairs(cdp_node)? {
            self.arena.set_attribute(node_id, key, value)?;
        }
        for child in child_list(cdp_node)? {
            let child_id = self.build_node(child)?;
            self.arena.append_child(node_id, child_id)?;
        }

        Ok(node_id)
    }
}

fn document_rejected() -> DomError {
    DomError::InvalidNodeType {
        expected: "element, text or comment".to_string(),
        actual: NodeType::Document.name().to_string(),
    }
}

fn node_type_of(cdp_node: &Value) -> Result<NodeType> {
    let node_type_val = cdp_node["nodeType"]
        .as_u64()
        .ok_or_else(|| DomError::Malformed("missing nodeType".to_string()))?;

    match u8::try_from(node_type_val).ok().and_then(NodeType::from_u8) {
        Some(NodeType::Document) => Err(document_rejected()),
        Some(node_type) => Ok(node_type),
        None => Err(DomError::InvalidNodeType {
            expected: "element, text or comment".to_string(),
            actual: node_type_val.to_string(),
        }),
    }
}

fn element_name(cdp_node: &Value) -> Result<String> {
    cdp_node["nodeName"]
        .as_str()
        .map(str::to_ascii_lowercase)
        .ok_or_else(|| DomError::Malformed("missing nodeName".to_string()))
}

fn attribute_pairs(cdp_node: &Value) -> Result<Vec<(&str, &str)>> {
    let attrs = match cdp_node.get("attributes") {
        Some(attrs) => attrs
            .as_array()
            .ok_or_else(|| DomError::Malformed("attributes is not an array".to_string()))?,
        None => return Ok(Vec::new()),
    };
    if attrs.len() % 2 != 0 {
        return Err(DomError::Malformed(
            "attributes must come in name/value pairs".to_string(),
        ));
    }
    attrs
        .chunks(2)
        .map(|pair| match (pair[0].as_str(), pair[1].as_str()) {
            (Some(key), Some(value)) => Ok((key, value)),
            _ => Err(DomError::Malformed(
                "attribute names and values must be strings".to_string(),
            )),
        })
        .collect()
}

fn child_list(cdp_node: &Value) -> Result<&[Value]> {
    match cdp_node.get("children") {
        Some(children) => children
            .as_array()
            .map(Vec::as_slice)
            .ok_or_else(|| DomError::Malformed("children is not an array".to_string())),
        None => Ok(&[]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serializer::DomSerializer;

    #[test]
    fn test_load_attached_fragment() {
        let json = serde_json::json!({
            "nodeType": 1,
            "nodeName": "UL",
            "attributes": ["id", "list1"],
            "children": [
                { "nodeType": 3, "nodeName": "#text", "nodeValue": "a" },
                { "nodeType": 8, "nodeName": "#comment", "nodeValue": " note " }
            ]
        });

        let mut arena = DomArena::new();
        let body = arena.root_container();
        let ul = DomLoader::new(&mut arena).load(&json, Some(body)).unwrap();

        assert_eq!(arena.parent(ul).unwrap(), Some(body));
        assert_eq!(arena.find_by_id("list1"), Some(ul));
        assert_eq!(
            DomSerializer::new().outer_html(&arena, ul).unwrap(),
            "<ul id=\"list1\">a<!-- note --></ul>"
        );
    }

    #[test]
    fn test_load_detached_fragment() {
        let mut arena = DomArena::new();
        let div = DomLoader::new(&mut arena)
            .load_str(r#"{"nodeType": 1, "nodeName": "div"}"#, None)
            .unwrap();

        assert_eq!(arena.parent(div).unwrap(), None);
        assert!(!arena.is_connected(div).unwrap());
    }

    #[test]
    fn test_malformed_fragments() {
        let mut arena = DomArena::new();
        let mut loader = DomLoader::new(&mut arena);

        let cases = [
            serde_json::json!({ "nodeName": "div" }),
            serde_json::json!({ "nodeType": 1 }),
            serde_json::json!({ "nodeType": 1, "nodeName": "div", "attributes": ["id"] }),
            serde_json::json!({ "nodeType": 1, "nodeName": "div", "attributes": ["id", 3] }),
            serde_json::json!({ "nodeType": 1, "nodeName": "div", "children": {} }),
        ];
        for case in &cases {
            assert!(
                matches!(loader.load(case, None), Err(DomError::Malformed(_))),
                "expected Malformed for {}",
                case
            );
        }

        assert!(matches!(
            loader.load(&serde_json::json!({ "nodeType": 9 }), None),
            Err(DomError::InvalidNodeType { .. })
        ));
        assert!(matches!(
            loader.load_str("{ not json", None),
            Err(DomError::ParseError(_))
        ));
    }

    #[test]
    fn test_rejected_fragment_allocates_nothing() {
        let fragment = serde_json::json!({
            "nodeType": 1,
            "nodeName": "SECTION",
            "attributes": ["id", "outer"],
            "children": [
                { "nodeType": 3, "nodeName": "#text", "nodeValue": "intro" },
                {
                    "nodeType": 1,
                    "nodeName": "DIV",
                    "attributes": ["id", "inner"],
                    "children": [
                        { "nodeType": 1, "nodeName": "P" },
                        { "nodeType": 1, "nodeName": "SPAN", "attributes": ["class"] }
                    ]
                }
            ]
        });

        let mut arena = DomArena::new();
        let before = arena.len();
        let body = arena.root_container();

        let mut loader = DomLoader::new(&mut arena);
        assert!(matches!(
            loader.load(&fragment, Some(body)),
            Err(DomError::Malformed(_))
        ));
        assert!(matches!(
            loader.load(
                &serde_json::json!({
                    "nodeType": 1,
                    "nodeName": "div",
                    "attributes": ["id", "x"],
                    "children": [{ "nodeType": 1, "nodeName": "bad name" }]
                }),
                None
            ),
            Err(DomError::InvalidName(_))
        ));
        assert!(matches!(
            loader.load(
                &serde_json::json!({
                    "nodeType": 3,
                    "nodeValue": "t",
                    "children": [{ "nodeType": 1, "nodeName": "b" }]
                }),
                None
            ),
            Err(DomError::HierarchyRequest(_))
        ));

        let text = arena.create_text("leaf");
        let before_leaf_parent = arena.len();
        assert!(matches!(
            DomLoader::new(&mut arena).load(&serde_json::json!({ "nodeType": 1, "nodeName": "b" }), Some(text)),
            Err(DomError::HierarchyRequest(_))
        ));

        assert_eq!(before + 1, before_leaf_parent);
        assert_eq!(arena.len(), before_leaf_parent);
        assert!(arena.nodes_with_id("outer").is_empty());
        assert!(arena.nodes_with_id("inner").is_empty());
        assert!(arena.nodes_with_id("x").is_empty());
        assert!(arena.children(body).unwrap().is_empty());
    }

    #[test]
    fn test_depth_limit() {
        let mut fragment = serde_json::json!({ "nodeType": 1, "nodeName": "span" });
        for _ in 0..3 {
            fragment = serde_json::json!({
                "nodeType": 1,
                "nodeName": "div",
                "children": [fragment]
            });
        }

        let mut arena = DomArena::new();
        let mut loader = DomLoader::with_config(&mut arena, LoaderConfig { max_depth: 2 });
        assert!(matches!(
            loader.load(&fragment, None),
            Err(DomError::Malformed(_))
        ));
    }
}
