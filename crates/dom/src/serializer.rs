//! DOM Serializer - render subtrees as markup
//!
//! This module handles:
//! - outerHTML / innerHTML / textContent rendering
//! - Optional pretty-printing for debugging
//! - XPath generation for element identification

use crate::error::Result;
use crate::host::DocumentHost;
use crate::types::*;
use crate::utils::{cap_text_length, escape_attribute, escape_comment, escape_text};
use serde::{Deserialize, Serialize};

/// Serializer configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerializerConfig {
    /// One node per line, indented by depth
    pub pretty: bool,
    /// Spaces per depth level in pretty mode
    pub indent: usize,
    /// Truncate long text nodes
    pub max_text_length: Option<usize>,
}

impl Default for SerializerConfig {
    fn default() -> Self {
        Self {
            pretty: false,
            indent: 2,
            max_text_length: None,
        }
    }
}

/// Pending work for the serializer stack
enum Frame {
    /// Open the node and queue its children
    Enter(NodeId, usize),
    /// Emit the end tag
    Exit(NodeId, usize),
}

/// Document tree serializer
pub struct DomSerializer {
    config: SerializerConfig,
}

impl DomSerializer {
    pub fn new() -> Self {
        Self::with_config(SerializerConfig::default())
    }

    pub fn with_config(config: SerializerConfig) -> Self {
        Self { config }
    }

    /// Markup for the node itself and everything below it
    pub fn outer_html<H: DocumentHost + ?Sized>(&self, host: &H, node_id: NodeId) -> Result<String> {
        let mut output = String::with_capacity(256);
        self.serialize_node(host, node_id, 0, &mut output)?;
        Ok(output)
    }

    /// Markup for the node's children only
    pub fn inner_html<H: DocumentHost + ?Sized>(&self, host: &H, node_id: NodeId) -> Result<String> {
        let mut output = String::with_capacity(256);
        for &child_id in host.children(node_id)? {
            self.serialize_node(host, child_id, 0, &mut output)?;
        }
        Ok(output)
    }

    /// Serialize a subtree with an explicit stack, so depth is bounded
    /// by memory rather than by the call stack
    fn serialize_node<H: DocumentHost + ?Sized>(
        &self,
        host: &H,
        node_id: NodeId,
        depth: usize,
        output: &mut String,
    ) -> Result<()> {
        let newline = if self.config.pretty { "\n" } else { "" };
        let mut stack = vec![Frame::Enter(node_id, depth)];

        while let Some(frame) = stack.pop() {
            match frame {
                Frame::Enter(id, depth) => {
                    let node = host.node(id)?;
                    let indent = self.indent(depth);

                    match node.node_type {
                        NodeType::Element => {
                            output.push_str(&indent);
                            output.push('<');
                            output.push_str(&node.node_name);
                            for (name, value) in &node.attributes {
                                output.push_str(&format!(" {}=\"{}\"", name, escape_attribute(value)));
                            }
                            output.push('>');
                            output.push_str(newline);

                            if VOID_ELEMENTS.contains(&node.node_name.to_ascii_lowercase().as_str()) {
                                continue;
                            }

                            stack.push(Frame::Exit(id, depth));
                            // Reverse order so children pop left-to-right
                            for &child_id in node.children_ids.iter().rev() {
                                stack.push(Frame::Enter(child_id, depth + 1));
                            }
                        }
                        NodeType::Text => {
                            let text = match self.config.max_text_length {
                                Some(max) => cap_text_length(&node.node_value, max),
                                None => node.node_value.clone(),
                            };
                            if self.config.pretty && text.trim().is_empty() {
                                continue;
                            }
                            output.push_str(&indent);
                            output.push_str(&escape_text(&text));
                            output.push_str(newline);
                        }
                        NodeType::Comment => {
                            output.push_str(&indent);
                            output.push_str("<!--");
                            output.push_str(&escape_comment(&node.node_value));
                            output.push_str("-->");
                            output.push_str(newline);
                        }
                        NodeType::Document => {
                            for &child_id in node.children_ids.iter().rev() {
                                stack.push(Frame::Enter(child_id, depth));
                            }
                        }
                    }
                }
                Frame::Exit(id, depth) => {
                    output.push_str(&self.indent(depth));
                    output.push_str("</");
                    output.push_str(&host.node(id)?.node_name);
                    output.push('>');
                    output.push_str(newline);
                }
            }
        }

        Ok(())
    }

    fn indent(&self, depth: usize) -> String {
        if self.config.pretty {
            " ".repeat(depth * self.config.indent)
        } else {
            String::new()
        }
    }

    /// Generate XPath for a node
    pub fn generate_xpath<H: DocumentHost + ?Sized>(&self, host: &H, node_id: NodeId) -> Result<String> {
        let mut path_parts = Vec::new();
        let mut current_id = Some(node_id);

        while let Some(id) = current_id {
            let node = host.node(id)?;

            if node.node_type == NodeType::Element {
                // Get position among siblings with same tag name
                let position = match node.parent_id {
                    Some(parent_id) => {
                        let mut position = 1;
                        for &sibling_id in host.children(parent_id)? {
                            if sibling_id == id {
                                break;
                            }
                            let sibling = host.node(sibling_id)?;
                            if sibling.is_element() && sibling.node_name == node.node_name {
                                position += 1;
                            }
                        }
                        position
                    }
                    None => 1,
                };

                path_parts.push(format!("{}[{}]", node.node_name.to_lowercase(), position));
            }

            current_id = node.parent_id;
        }

        path_parts.reverse();
        Ok(format!("/{}", path_parts.join("/")))
    }
}

impl Default for DomSerializer {
    fn default() -> Self {
        Self::new()
    }
}

/// Concatenated text of a node and its descendants, in document order
pub fn text_content<H: DocumentHost + ?Sized>(host: &H, node_id: NodeId) -> Result<String> {
    let mut text = String::new();
    let mut stack = vec![node_id];

    while let Some(id) = stack.pop() {
        let node = host.node(id)?;
        if node.is_text() {
            text.push_str(&node.node_value);
        }
        for &child_id in node.children_ids.iter().rev() {
            stack.push(child_id);
        }
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::DomArena;

    fn sample(arena: &mut DomArena) -> NodeId {
        let ul = arena.create_element("ul").unwrap();
        arena.set_attribute(ul, "id", "list1").unwrap();
        for label in ["a", "b & c"] {
            let li = arena.create_element("li").unwrap();
            let text = arena.create_text(label);
            arena.append_child(li, text).unwrap();
            arena.append_child(ul, li).unwrap();
        }
        arena.append_child(arena.root_container(), ul).unwrap();
        ul
    }

    #[test]
    fn test_outer_html() {
        let mut arena = DomArena::new();
        let ul = sample(&mut arena);

        let html = DomSerializer::new().outer_html(&arena, ul).unwrap();
        assert_eq!(html, "<ul id=\"list1\"><li>a</li><li>b &amp; c</li></ul>");
    }

    #[test]
    fn test_inner_html_and_text() {
        let mut arena = DomArena::new();
        let ul = sample(&mut arena);

        let inner = DomSerializer::new().inner_html(&arena, ul).unwrap();
        assert_eq!(inner, "<li>a</li><li>b &amp; c</li>");
        assert_eq!(text_content(&arena, ul).unwrap(), "ab & c");
    }

    #[test]
    fn test_void_and_pretty() {
        let mut arena = DomArena::new();
        let p = arena.create_element("p").unwrap();
        let br = arena.create_element("br").unwrap();
        let text = arena.create_text("hi");
        arena.append_child(p, text).unwrap();
        arena.append_child(p, br).unwrap();

        let compact = DomSerializer::new().outer_html(&arena, p).unwrap();
        assert_eq!(compact, "<p>hi<br></p>");

        let pretty = DomSerializer::with_config(SerializerConfig {
            pretty: true,
            ..Default::default()
        })
        .outer_html(&arena, p)
        .unwrap();
        assert_eq!(pretty, "<p>\n  hi\n  <br>\n</p>\n");
    }

    #[test]
    fn test_deep_chain_serializes() {
        let mut arena = DomArena::new();
        let mut tip = arena.root_container();
        for _ in 0..20_000 {
            let div = arena.create_element("div").unwrap();
            arena.append_child(tip, div).unwrap();
            tip = div;
        }

        let html = DomSerializer::new()
            .outer_html(&arena, arena.root_container())
            .unwrap();
        assert!(html.starts_with("<body><div><div>"));
        assert!(html.ends_with("</div></div></body>"));
        assert_eq!(html.matches("<div>").count(), 20_000);
        assert_eq!(html.matches("</div>").count(), 20_000);
    }

    #[test]
    fn test_comment_cannot_close_early() {
        let mut arena = DomArena::new();
        let p = arena.create_element("p").unwrap();
        let comment = arena.create_comment("a --> <b>");
        arena.append_child(p, comment).unwrap();

        let html = DomSerializer::new().outer_html(&arena, p).unwrap();
        assert_eq!(html, "<p><!--a --&gt; <b>--></p>");
        assert_eq!(html.matches("-->").count(), 1);
    }

    #[test]
    fn test_generate_xpath() {
        let mut arena = DomArena::new();
        let ul = sample(&mut arena);
        let second_li = arena.children(ul).unwrap()[1];

        let xpath = DomSerializer::new()
            .generate_xpath(&arena, second_li)
            .unwrap();
        assert_eq!(xpath, "/html[1]/body[1]/ul[1]/li[2]");
    }
}
