//! ElementHandle - one element node behind property-style accessors
//!
//! The live node is the only source of truth. The handle stores nothing
//! but the id of the node it owns: every read is a fresh query against
//! the host, and every write goes straight to the host.
//!
//! Change detection is structural. Assigning the tag the node already
//! has, the parent it already has, or a child list equal to its current
//! content (text by value, nodes by id) does nothing.
//!
//! Reassigning the tag or the child list rebuilds the element: a new node
//! with the same attributes takes the old node's place among its siblings
//! and the old node is discarded. Anything holding the old node's id (or
//! keyed on its uuid) keeps pointing at the discarded node.

use crate::content::{Child, Parent, Position};
use crate::error::{ElementError, Result};
use dom::utils::{validate_attribute_name, validate_tag_name};
use dom::{DocumentHost, DomNode, DomSerializer, NodeId, NodeType};
use std::collections::BTreeMap;

/// Tag used when construction does not name one
pub const DEFAULT_TAG: &str = "div";

/// Construction options, all optional
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementOptions {
    pub tag: Option<String>,
    pub attributes: Vec<(String, String)>,
    pub parent: Parent,
    pub children: Vec<Child>,
}

impl ElementOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    pub fn attributes<I, K, V>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.attributes
            .extend(attributes.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn parent(mut self, parent: impl Into<Parent>) -> Self {
        self.parent = parent.into();
        self
    }

    pub fn child(mut self, child: impl Into<Child>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn children<I, C>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Child>,
    {
        self.children.extend(children.into_iter().map(Into::into));
        self
    }
}

/// Wrapper owning one element node of a host document
///
/// After [`ElementHandle::remove`] the handle owns nothing; every accessor
/// then fails with [`ElementError::DetachedNodeAccess`] until a node is
/// adopted.
#[derive(Debug, PartialEq, Eq)]
pub struct ElementHandle {
    node: Option<NodeId>,
}

impl ElementHandle {
    /// Create a new element, attach it and fill it
    ///
    /// Input is validated up front: on error the tree is untouched.
    pub fn create<H: DocumentHost + ?Sized>(host: &mut H, options: ElementOptions) -> Result<Self> {
        let tag = options.tag.as_deref().unwrap_or(DEFAULT_TAG);
        check_tag(tag)?;
        for (name, _) in &options.attributes {
            check_attribute_name(name)?;
        }
        let parent = options.parent.resolve(&*host);
        check_container(&*host, parent)?;
        check_children(&*host, &options.children, parent)?;

        let node_id = host.create_element(tag)?;
        for (name, value) in &options.attributes {
            host.set_attribute(node_id, name, value)?;
        }
        host.append_child(parent, node_id)?;
        fill(host, node_id, &options.children)?;

        tracing::debug!("Created <{}> node {} under {}", tag, node_id, parent);
        Ok(Self {
            node: Some(node_id),
        })
    }

    /// Wrap an existing element without copying it
    pub fn wrap<H: DocumentHost + ?Sized>(host: &H, node_id: NodeId) -> Result<Self> {
        check_element(host, node_id)?;
        Ok(Self {
            node: Some(node_id),
        })
    }

    /// Owned node, `None` after removal
    pub fn node(&self) -> Option<NodeId> {
        self.node
    }

    pub fn is_removed(&self) -> bool {
        self.node.is_none()
    }

    fn live(&self) -> Result<NodeId> {
        self.node.ok_or(ElementError::DetachedNodeAccess)
    }

    /// Tag name
    pub fn tag<H: DocumentHost + ?Sized>(&self, host: &H) -> Result<String> {
        Ok(host.node(self.live()?)?.node_name.clone())
    }

    /// Change the tag name, rebuilding the element when it differs
    pub fn set_tag<H: DocumentHost + ?Sized>(&mut self, host: &mut H, tag: &str) -> Result<()> {
        check_tag(tag)?;
        let node_id = self.live()?;
        if host.node(node_id)?.node_name == tag {
            tracing::trace!("Node {} already is <{}>", node_id, tag);
            return Ok(());
        }
        self.rebuild(host, tag, None)
    }

    /// Snapshot of the attributes
    pub fn attributes<H: DocumentHost + ?Sized>(&self, host: &H) -> Result<BTreeMap<String, String>> {
        Ok(host.attributes(self.live()?)?.iter().cloned().collect())
    }

    /// Single attribute value
    pub fn attribute<H: DocumentHost + ?Sized>(&self, host: &H, name: &str) -> Result<Option<String>> {
        Ok(host.node(self.live()?)?.attr(name).map(str::to_string))
    }

    /// Write every given attribute. Additive: attributes not mentioned
    /// keep their values, use [`ElementHandle::remove_attribute`] to drop one.
    pub fn set_attributes<H, I, K, V>(&self, host: &mut H, attributes: I) -> Result<()>
    where
        H: DocumentHost + ?Sized,
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let node_id = self.live()?;
        let attributes: Vec<(K, V)> = attributes.into_iter().collect();
        for (name, _) in &attributes {
            check_attribute_name(name.as_ref())?;
        }
        for (name, value) in &attributes {
            host.set_attribute(node_id, name.as_ref(), value.as_ref())?;
        }
        Ok(())
    }

    pub fn set_attribute<H: DocumentHost + ?Sized>(&self, host: &mut H, name: &str, value: &str) -> Result<()> {
        self.set_attributes(host, [(name, value)])
    }

    /// Drop an attribute, returning its old value
    pub fn remove_attribute<H: DocumentHost + ?Sized>(&self, host: &mut H, name: &str) -> Result<Option<String>> {
        let node_id = self.live()?;
        Ok(host.remove_attribute(node_id, name)?)
    }

    /// Current parent, `None` when not in any tree
    pub fn parent<H: DocumentHost + ?Sized>(&self, host: &H) -> Result<Option<NodeId>> {
        Ok(host.parent(self.live()?)?)
    }

    /// Move the element to the end of another container
    ///
    /// A no-op when `parent` already is the current parent, so the element
    /// keeps its position.
    pub fn set_parent<H: DocumentHost + ?Sized>(&self, host: &mut H, parent: impl Into<Parent>) -> Result<()> {
        let node_id = self.live()?;
        let parent = parent.into().resolve(&*host);

        if parent == node_id {
            tracing::warn!("Rejected parenting node {} to itself", node_id);
            return Err(ElementError::SelfParentingAttempt);
        }
        check_container(&*host, parent)?;
        if host.contains_in_subtree(node_id, parent)? {
            return Err(ElementError::invalid(format!(
                "node {} is inside node {}; moving it there would create a cycle",
                parent, node_id
            )));
        }
        if host.parent(node_id)? == Some(parent) {
            tracing::trace!("Node {} already under {}", node_id, parent);
            return Ok(());
        }

        host.append_child(parent, node_id)?;
        Ok(())
    }

    /// Child node ids, in document order
    pub fn children<H: DocumentHost + ?Sized>(&self, host: &H) -> Result<Vec<NodeId>> {
        Ok(host.children(self.live()?)?.to_vec())
    }

    /// Child list as assignable content: text nodes by value, the rest by id
    pub fn contents<H: DocumentHost + ?Sized>(&self, host: &H) -> Result<Vec<Child>> {
        let mut contents = Vec::new();
        for &child_id in host.children(self.live()?)? {
            let child = host.node(child_id)?;
            contents.push(if child.is_text() {
                Child::Text(child.node_value.clone())
            } else {
                Child::Node(child_id)
            });
        }
        Ok(contents)
    }

    /// Replace the child list, rebuilding the element unless the new list
    /// equals the current content
    pub fn set_children<H: DocumentHost + ?Sized>(&mut self, host: &mut H, children: Vec<Child>) -> Result<()> {
        let node_id = self.live()?;
        check_children(&*host, &children, node_id)?;
        if self.contents(&*host)? == children {
            tracing::trace!("Children of node {} unchanged", node_id);
            return Ok(());
        }

        let tag = self.tag(&*host)?;
        self.rebuild(host, &tag, Some(children.as_slice()))
    }

    /// Other children of the parent, in document order
    pub fn relatives<H: DocumentHost + ?Sized>(&self, host: &H) -> Result<Vec<NodeId>> {
        let node_id = self.live()?;
        match host.parent(node_id)? {
            Some(parent) => Ok(host
                .children(parent)?
                .iter()
                .copied()
                .filter(|&id| id != node_id)
                .collect()),
            None => Ok(Vec::new()),
        }
    }

    /// Reorder the element among its siblings
    ///
    /// The parent's whole child list is detached and reattached in the new
    /// order in one batch.
    pub fn to_position<H: DocumentHost + ?Sized>(&self, host: &mut H, position: Position) -> Result<()> {
        let node_id = self.live()?;
        let parent = host
            .parent(node_id)?
            .ok_or_else(|| ElementError::invalid(format!("node {} has no parent to reorder within", node_id)))?;

        let mut order = self.relatives(&*host)?;
        let slot = position.slot(order.len());
        order.insert(slot, node_id);

        host.reorder_children(parent, &order)?;
        tracing::debug!("Moved node {} to slot {} of {}", node_id, slot, parent);
        Ok(())
    }

    /// Detach the node and release it
    ///
    /// Removing an already removed handle does nothing.
    pub fn remove<H: DocumentHost + ?Sized>(&mut self, host: &mut H) -> Result<()> {
        if let Some(node_id) = self.node {
            host.detach(node_id)?;
            self.node = None;
            tracing::debug!("Removed node {}", node_id);
        }
        Ok(())
    }

    /// Drop the current node (as [`ElementHandle::remove`] does) and wrap
    /// an existing element instead
    pub fn adopt<H: DocumentHost + ?Sized>(&mut self, host: &mut H, node_id: NodeId) -> Result<()> {
        check_element(&*host, node_id)?;
        if self.node == Some(node_id) {
            return Ok(());
        }
        self.remove(host)?;
        self.node = Some(node_id);
        tracing::debug!("Adopted node {}", node_id);
        Ok(())
    }

    /// Markup of the element and its subtree
    pub fn outer_html<H: DocumentHost + ?Sized>(&self, host: &H) -> Result<String> {
        Ok(DomSerializer::new().outer_html(host, self.live()?)?)
    }

    /// Replace the node with a fresh `tag` element carrying the same
    /// attributes, at the same place. Children are moved over from the old
    /// node unless a new list is given.
    fn rebuild<H: DocumentHost + ?Sized>(
        &mut self,
        host: &mut H,
        tag: &str,
        children: Option<&[Child]>,
    ) -> Result<()> {
        let old = self.live()?;
        let parent = host.parent(old)?;
        let attributes = host.attributes(old)?.to_vec();

        let new = host.create_element(tag)?;
        for (name, value) in &attributes {
            host.set_attribute(new, name, value)?;
        }
        if let Some(parent) = parent {
            host.insert_before(parent, new, Some(old))?;
        }

        match children {
            Some(children) => fill(host, new, children)?,
            None => {
                let moved = host.children(old)?.to_vec();
                for child_id in moved {
                    host.append_child(new, child_id)?;
                }
            }
        }

        host.detach(old)?;
        // The discarded node must not keep answering for the id
        host.remove_attribute(old, "id")?;
        self.node = Some(new);
        tracing::debug!("Rebuilt node {} as <{}> node {}", old, tag, new);
        Ok(())
    }
}

/// Append `children` to `node_id`, materializing text
fn fill<H: DocumentHost + ?Sized>(host: &mut H, node_id: NodeId, children: &[Child]) -> Result<()> {
    for child in children {
        let child_id = match child {
            Child::Text(text) => host.create_text(text),
            Child::Node(child_id) => *child_id,
        };
        host.append_child(node_id, child_id)?;
    }
    Ok(())
}

fn check_tag(tag: &str) -> Result<()> {
    validate_tag_name(tag).map_err(|_| ElementError::invalid(format!("{:?} is not a valid tag name", tag)))
}

fn check_attribute_name(name: &str) -> Result<()> {
    validate_attribute_name(name)
        .map_err(|_| ElementError::invalid(format!("{:?} is not a valid attribute name", name)))
}

fn existing<H: DocumentHost + ?Sized>(host: &H, node_id: NodeId) -> Result<&DomNode> {
    host.node(node_id)
        .map_err(|_| ElementError::invalid(format!("node {} does not exist", node_id)))
}

fn check_element<H: DocumentHost + ?Sized>(host: &H, node_id: NodeId) -> Result<()> {
    let node = existing(host, node_id)?;
    if !node.is_element() {
        return Err(ElementError::invalid(format!(
            "node {} is a {} node, not an element",
            node_id,
            node.node_type.name()
        )));
    }
    Ok(())
}

fn check_container<H: DocumentHost + ?Sized>(host: &H, node_id: NodeId) -> Result<()> {
    let node = existing(host, node_id)?;
    if !node.can_have_children() {
        return Err(ElementError::invalid(format!(
            "{} node {} cannot contain elements",
            node.node_type.name(),
            node_id
        )));
    }
    Ok(())
}

/// Node children must exist, appear once, and must not contain `anchor`,
/// the node whose place the filled element takes (or will sit under)
fn check_children<H: DocumentHost + ?Sized>(host: &H, children: &[Child], anchor: NodeId) -> Result<()> {
    let mut seen = Vec::new();
    for child in children {
        let Child::Node(child_id) = *child else {
            continue;
        };
        let node = existing(host, child_id)?;
        if node.node_type == NodeType::Document {
            return Err(ElementError::invalid("the document node cannot be a child"));
        }
        if seen.contains(&child_id) {
            return Err(ElementError::invalid(format!("node {} listed twice", child_id)));
        }
        if host.contains_in_subtree(child_id, anchor)? {
            return Err(ElementError::invalid(format!(
                "node {} encloses the element; listing it as a child would create a cycle",
                child_id
            )));
        }
        seen.push(child_id);
    }
    Ok(())
}
