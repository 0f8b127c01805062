//! Host primitives - the only surface element wrappers are allowed to use
//!
//! Anything that owns a document tree and can create, link, unlink and
//! annotate nodes is a host. `DomArena` is the in-memory one.

use crate::arena::DomArena;
use crate::error::Result;
use crate::types::{DomNode, NodeId};

/// Document tree primitives
///
/// Every mutation is immediate and synchronous. Hosts assume a single
/// writer; callers sharing one across threads wrap it in a lock.
pub trait DocumentHost {
    /// Default attachment point for nodes created without a parent
    fn root_container(&self) -> NodeId;

    /// Create a detached element
    fn create_element(&mut self, tag: &str) -> Result<NodeId>;

    /// Create a detached text node
    fn create_text(&mut self, value: &str) -> NodeId;

    /// Read-only view of a node
    fn node(&self, node_id: NodeId) -> Result<&DomNode>;

    fn parent(&self, node_id: NodeId) -> Result<Option<NodeId>>;

    fn children(&self, node_id: NodeId) -> Result<&[NodeId]>;

    fn attributes(&self, node_id: NodeId) -> Result<&[(String, String)]>;

    fn set_attribute(&mut self, node_id: NodeId, name: &str, value: &str) -> Result<()>;

    fn remove_attribute(&mut self, node_id: NodeId, name: &str) -> Result<Option<String>>;

    fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()>;

    fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> Result<()>;

    fn detach(&mut self, node_id: NodeId) -> Result<()>;

    /// Batch detach-and-reattach of all children of `parent`
    fn reorder_children(&mut self, parent: NodeId, order: &[NodeId]) -> Result<()>;

    /// True when `node` is `root` or one of its descendants
    fn contains_in_subtree(&self, root: NodeId, node: NodeId) -> Result<bool>;
}

impl DocumentHost for DomArena {
    fn root_container(&self) -> NodeId {
        DomArena::root_container(self)
    }

    fn create_element(&mut self, tag: &str) -> Result<NodeId> {
        DomArena::create_element(self, tag)
    }

    fn create_text(&mut self, value: &str) -> NodeId {
        DomArena::create_text(self, value)
    }

    fn node(&self, node_id: NodeId) -> Result<&DomNode> {
        self.get(node_id)
    }

    fn parent(&self, node_id: NodeId) -> Result<Option<NodeId>> {
        DomArena::parent(self, node_id)
    }

    fn children(&self, node_id: NodeId) -> Result<&[NodeId]> {
        DomArena::children(self, node_id)
    }

    fn attributes(&self, node_id: NodeId) -> Result<&[(String, String)]> {
        DomArena::attributes(self, node_id)
    }

    fn set_attribute(&mut self, node_id: NodeId, name: &str, value: &str) -> Result<()> {
        DomArena::set_attribute(self, node_id, name, value)
    }

    fn remove_attribute(&mut self, node_id: NodeId, name: &str) -> Result<Option<String>> {
        DomArena::remove_attribute(self, node_id, name)
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        DomArena::append_child(self, parent, child)
    }

    fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> Result<()> {
        DomArena::insert_before(self, parent, child, reference)
    }

    fn detach(&mut self, node_id: NodeId) -> Result<()> {
        DomArena::detach(self, node_id)
    }

    fn reorder_children(&mut self, parent: NodeId, order: &[NodeId]) -> Result<()> {
        DomArena::reorder_children(self, parent, order)
    }

    fn contains_in_subtree(&self, root: NodeId, node: NodeId) -> Result<bool> {
        DomArena::contains_in_subtree(self, root, node)
    }
}
