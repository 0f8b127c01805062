//! Arena-based document tree storage
//!
//! "Bad programmers worry about the code. Good programmers worry about
//! data structures and their relationships."
//!
//! Every node ever created lives in one `Vec<DomNode>` and is addressed by
//! a 4-byte index. Nodes are never freed: a node that leaves the tree is
//! simply detached (no parent) and stays addressable, so stale ids never
//! alias a different node.
//!
//! ## Memory Layout
//!
//! ```text
//! Arena: Vec<DomNode>
//!        [#document][html][head][body][...]
//!         ↑ 4-byte index, not 8-byte pointer
//! ```

use crate::error::{DomError, Result};
use crate::types::{DocumentConfig, DomNode, NodeId, NodeType};
use crate::utils::{validate_attribute_name, validate_tag_name};
use ahash::AHashMap;
use smallvec::SmallVec;

/// Arena allocator and mutation primitives for one document
///
/// Design:
/// - Single Vec<DomNode> for sequential allocation
/// - HashMap for `id` attribute → candidates lookup
/// - No Rc/Arc: use indices everywhere
#[derive(Debug)]
pub struct DomArena {
    /// All nodes stored sequentially (cache-friendly)
    nodes: Vec<DomNode>,

    /// `id` attribute value → nodes that were given it
    id_index: AHashMap<String, SmallVec<[NodeId; 2]>>,

    /// The `#document` node
    document_id: NodeId,

    /// Default attachment point for parentless elements
    container_id: NodeId,

    config: DocumentConfig,
}

impl DomArena {
    /// Create a document with the default `html > (head, body)` skeleton
    pub fn new() -> Self {
        let config = DocumentConfig::default();
        let mut arena = Self::bare(&config);
        let body = arena.skeleton();
        arena.container_id = body;
        arena.config = config;
        arena
    }

    /// Create a document whose root container is the element named by
    /// `config.root_container`. `html`, `head` and `body` reuse the skeleton
    /// elements; any other tag is created as the last child of `body`.
    pub fn with_config(config: DocumentConfig) -> Result<Self> {
        validate_tag_name(&config.root_container)?;

        let mut arena = Self::bare(&config);
        let body = arena.skeleton();
        arena.container_id = match config.root_container.to_ascii_lowercase().as_str() {
            "body" => body,
            "html" => arena.parent(body)?.ok_or(DomError::NodeNotFound(body))?,
            "head" => arena.children(arena.document_id)?
                .first()
                .and_then(|&html| arena.nodes[html as usize].children_ids.first().copied())
                .ok_or(DomError::NodeNotFound(body))?,
            _ => {
                let container = arena.create_element(&config.root_container)?;
                arena.append_child(body, container)?;
                container
            }
        };
        arena.config = config;
        Ok(arena)
    }

    fn bare(config: &DocumentConfig) -> Self {
        let mut arena = Self {
            nodes: Vec::with_capacity(config.capacity),
            id_index: AHashMap::new(),
            document_id: 0,
            container_id: 0,
            config: config.clone(),
        };
        arena.document_id = arena.push_node(NodeType::Document, "#document", String::new());
        arena
    }

    /// Build `html > (head, body)` under the document node, returns `body`
    fn skeleton(&mut self) -> NodeId {
        let html = self.push_node(NodeType::Element, "html", String::new());
        let head = self.push_node(NodeType::Element, "head", String::new());
        let body = self.push_node(NodeType::Element, "body", String::new());

        self.link_last(self.document_id, html);
        self.link_last(html, head);
        self.link_last(html, body);
        body
    }

    fn push_node(&mut self, node_type: NodeType, name: &str, value: String) -> NodeId {
        let node_id = self.nodes.len() as NodeId;
        let mut node = DomNode::new(node_id, node_type, name.to_string());
        node.node_value = value;
        self.nodes.push(node);
        node_id
    }

    /// Raw append without validation. Callers guarantee `child` is detached.
    fn link_last(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[child as usize].parent_id = Some(parent);
        self.nodes[parent as usize].children_ids.push(child);
    }

    /// Configuration this document was built with
    pub fn config(&self) -> &DocumentConfig {
        &self.config
    }

    /// The `#document` node
    pub fn document_id(&self) -> NodeId {
        self.document_id
    }

    /// Default attachment point for elements created without a parent
    pub fn root_container(&self) -> NodeId {
        self.container_id
    }

    /// Create a detached element
    pub fn create_element(&mut self, tag: &str) -> Result<NodeId> {
        validate_tag_name(tag)?;
        let node_id = self.push_node(NodeType::Element, tag, String::new());
        tracing::trace!("Created element <{}> as node {}", tag, node_id);
        Ok(node_id)
    }

    /// Create a detached text node
    pub fn create_text(&mut self, value: &str) -> NodeId {
        let node_id = self.push_node(NodeType::Text, "#text", value.to_string());
        tracing::trace!("Created text node {}", node_id);
        node_id
    }

    /// Create a detached comment node
    pub fn create_comment(&mut self, value: &str) -> NodeId {
        self.push_node(NodeType::Comment, "#comment", value.to_string())
    }

    /// Get node by ID (immutable)
    pub fn get(&self, node_id: NodeId) -> Result<&DomNode> {
        self.nodes
            .get(node_id as usize)
            .ok_or(DomError::NodeNotFound(node_id))
    }

    fn get_mut(&mut self, node_id: NodeId) -> Result<&mut DomNode> {
        self.nodes
            .get_mut(node_id as usize)
            .ok_or(DomError::NodeNotFound(node_id))
    }

    fn element_mut(&mut self, node_id: NodeId) -> Result<&mut DomNode> {
        let node = self.get_mut(node_id)?;
        if !node.is_element() {
            return Err(DomError::InvalidNodeType {
                expected: NodeType::Element.name().to_string(),
                actual: node.node_type.name().to_string(),
            });
        }
        Ok(node)
    }

    /// Total number of nodes ever created (attached or not)
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if arena is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterator over all nodes
    pub fn iter(&self) -> impl Iterator<Item = &DomNode> {
        self.nodes.iter()
    }

    /// Iterator over all node IDs
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(|i| i as NodeId)
    }

    /// Children of a node, in document order
    pub fn children(&self, node_id: NodeId) -> Result<&[NodeId]> {
        Ok(&self.get(node_id)?.children_ids)
    }

    /// Parent of a node, `None` when detached
    pub fn parent(&self, node_id: NodeId) -> Result<Option<NodeId>> {
        Ok(self.get(node_id)?.parent_id)
    }

    /// True when `node` is `root` or lies somewhere below it
    pub fn contains_in_subtree(&self, root: NodeId, node: NodeId) -> Result<bool> {
        self.get(root)?;
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if current == root {
                return Ok(true);
            }
            cursor = self.get(current)?.parent_id;
        }
        Ok(false)
    }

    /// True when the node is reachable from the document node
    pub fn is_connected(&self, node_id: NodeId) -> Result<bool> {
        self.contains_in_subtree(self.document_id, node_id)
    }

    /// Set (or replace in place) an attribute on an element
    pub fn set_attribute(&mut self, node_id: NodeId, name: &str, value: &str) -> Result<()> {
        validate_attribute_name(name)?;
        let node = self.element_mut(node_id)?;

        let existing = node.attributes.iter().position(|(key, _)| key == name);
        let previous = match existing {
            Some(idx) => Some(std::mem::replace(
                &mut node.attributes[idx].1,
                value.to_string(),
            )),
            None => {
                node.attributes.push((name.to_string(), value.to_string()));
                None
            }
        };

        if name == "id" {
            if let Some(old) = previous {
                self.unindex_id(&old, node_id);
            }
            let candidates = self.id_index.entry(value.to_string()).or_default();
            if !candidates.contains(&node_id) {
                candidates.push(node_id);
            }
        }
        Ok(())
    }

    /// Remove an attribute, returning its old value
    pub fn remove_attribute(&mut self, node_id: NodeId, name: &str) -> Result<Option<String>> {
        let node = self.element_mut(node_id)?;
        let removed = node
            .attributes
            .iter()
            .position(|(key, _)| key == name)
            .map(|idx| node.attributes.remove(idx).1);

        if name == "id" {
            if let Some(old) = &removed {
                self.unindex_id(old, node_id);
            }
        }
        Ok(removed)
    }

    fn unindex_id(&mut self, value: &str, node_id: NodeId) {
        if let Some(candidates) = self.id_index.get_mut(value) {
            candidates.retain(|id| *id != node_id);
            if candidates.is_empty() {
                self.id_index.remove(value);
            }
        }
    }

    /// Attributes of an element, in the order they were first set
    pub fn attributes(&self, node_id: NodeId) -> Result<&[(String, String)]> {
        Ok(&self.get(node_id)?.attributes)
    }

    /// Validate that `child` may be placed under `parent`
    fn check_insertion(&self, parent: NodeId, child: NodeId) -> Result<()> {
        let parent_node = self.get(parent)?;
        self.get(child)?;

        if !parent_node.can_have_children() {
            return Err(DomError::HierarchyRequest(format!(
                "{} node {} cannot have children",
                parent_node.node_type.name(),
                parent
            )));
        }
        if child == self.document_id {
            return Err(DomError::HierarchyRequest(
                "the document node cannot be inserted".to_string(),
            ));
        }
        if child == parent {
            return Err(DomError::HierarchyRequest(format!(
                "node {} cannot be inserted into itself",
                child
            )));
        }
        // Prevent cycles: parent must not be inside child's subtree.
        // A childless node encloses nothing but itself.
        let child_is_leaf = self.nodes[child as usize].children_ids.is_empty();
        if !child_is_leaf && self.contains_in_subtree(child, parent)? {
            return Err(DomError::HierarchyRequest(format!(
                "inserting node {} under {} would create a cycle",
                child, parent
            )));
        }
        Ok(())
    }

    fn unlink(&mut self, child: NodeId) {
        if let Some(old_parent) = self.nodes[child as usize].parent_id.take() {
            self.nodes[old_parent as usize]
                .children_ids
                .retain(|id| *id != child);
        }
    }

    /// Move `child` to the end of `parent`'s children
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.check_insertion(parent, child)?;
        self.unlink(child);
        self.link_last(parent, child);
        tracing::debug!("Appended node {} to {}", child, parent);
        Ok(())
    }

    /// Move `child` directly before `reference`; appends when `reference` is `None`
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> Result<()> {
        let Some(reference) = reference else {
            return self.append_child(parent, child);
        };

        if self.parent(reference)? != Some(parent) {
            return Err(DomError::NotAChild {
                parent,
                child: reference,
            });
        }
        self.check_insertion(parent, child)?;
        if child == reference {
            return Ok(());
        }

        self.unlink(child);
        let index = self.nodes[parent as usize]
            .children_ids
            .iter()
            .position(|id| *id == reference)
            .ok_or(DomError::NotAChild {
                parent,
                child: reference,
            })?;
        self.nodes[child as usize].parent_id = Some(parent);
        self.nodes[parent as usize].children_ids.insert(index, child);
        tracing::debug!("Inserted node {} into {} before {}", child, parent, reference);
        Ok(())
    }

    /// Remove a node from its parent. No-op when already detached.
    pub fn detach(&mut self, node_id: NodeId) -> Result<()> {
        if self.get(node_id)?.parent_id.is_some() {
            self.unlink(node_id);
            tracing::debug!("Detached node {}", node_id);
        }
        Ok(())
    }

    /// Re-attach every child of `parent` in the given order
    ///
    /// `order` must be a permutation of the current children. All children
    /// leave the tree as a group first, then go back one by one, so no
    /// intermediate state mixes old and new positions.
    pub fn reorder_children(&mut self, parent: NodeId, order: &[NodeId]) -> Result<()> {
        let current = self.children(parent)?;
        if let Some(&stray) = order.iter().find(|id| !current.contains(id)) {
            return Err(DomError::NotAChild {
                parent,
                child: stray,
            });
        }
        let mut seen: SmallVec<[NodeId; 16]> = SmallVec::new();
        for &id in order {
            if seen.contains(&id) {
                return Err(DomError::HierarchyRequest(format!(
                    "node {} listed twice in reorder of {}",
                    id, parent
                )));
            }
            seen.push(id);
        }
        if order.len() != current.len() {
            return Err(DomError::HierarchyRequest(format!(
                "reorder of {} lists {} of {} children",
                parent,
                order.len(),
                current.len()
            )));
        }

        // Detach the whole batch
        let batch = std::mem::take(&mut self.get_mut(parent)?.children_ids);
        for &child in &batch {
            self.nodes[child as usize].parent_id = None;
        }

        // Reattach in sequence
        for &child in order {
            self.link_last(parent, child);
        }
        tracing::debug!("Reordered {} children of node {}", order.len(), parent);
        Ok(())
    }

    /// Traverse tree depth-first (iterative, no recursion)
    pub fn traverse_df<F>(&self, start_id: NodeId, mut visit: F) -> Result<()>
    where
        F: FnMut(&DomNode) -> Result<()>,
    {
        let mut stack = vec![start_id];

        while let Some(node_id) = stack.pop() {
            let node = self.get(node_id)?;
            visit(node)?;

            // Push children in reverse order (so they're visited left-to-right)
            for &child_id in node.children_ids.iter().rev() {
                stack.push(child_id);
            }
        }

        Ok(())
    }

    /// Find all connected elements by tag name, in document order
    pub fn find_by_tag(&self, tag: &str) -> Result<Vec<NodeId>> {
        let mut found = Vec::new();
        self.traverse_df(self.document_id, |node| {
            if node.is_element() && node.node_name.eq_ignore_ascii_case(tag) {
                found.push(node.node_id);
            }
            Ok(())
        })?;
        Ok(found)
    }

    /// Every node currently indexed under `id`, connected or not
    pub fn nodes_with_id(&self, id: &str) -> &[NodeId] {
        self.id_index.get(id).map(|ids| ids.as_slice()).unwrap_or(&[])
    }

    /// Find the connected element carrying `id`
    pub fn find_by_id(&self, id: &str) -> Option<NodeId> {
        self.id_index.get(id)?.iter().copied().find(|&node_id| {
            self.nodes[node_id as usize].attr("id") == Some(id)
                && self.is_connected(node_id).unwrap_or(false)
        })
    }
}

impl Default for DomArena {
    fn default() -> Self {
        Self::new()
    }
}
