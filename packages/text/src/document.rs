//! # Plain-text document
//!
//! An arena tree standing in for a real word-processor document:
//!
//! ```text
//! Root (opaque)
//! ├── Paragraph (boundary)          one per line of source text
//! │   ├── Text "Dear "
//! │   ├── Placeholder "${Value *value:name}"
//! │   └── Span (text container)
//! │       └── Text ","
//! └── Frame (opaque)                never split, e.g. a text box
//!     └── Paragraph ...
//! ```
//!
//! Deleted nodes leave a hole in the arena, so a [`NodeId`] is never reused
//! within one document.

use crate::codec::{parse_placeholder, split_segments, write_placeholder, Segment};
use stencil_engine::{NodeId, NodeKind, PlaceholderProvider, SyntaxError, TreeAdapter};
use stencil_model::PlaceholderData;
use tracing::trace;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextNode {
    Root,
    Paragraph,
    Span,
    Frame { name: String },
    Text(String),
    Placeholder(String),
}

#[derive(Debug, Clone)]
struct Slot {
    node: TextNode,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub struct TextDocument {
    slots: Vec<Option<Slot>>,
    root: NodeId,
}

impl Default for TextDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl TextDocument {
    pub fn new() -> Self {
        let mut doc = Self {
            slots: Vec::new(),
            root: NodeId(0),
        };
        doc.root = doc.alloc(TextNode::Root);
        doc
    }

    /// One paragraph per line, each line split into text and placeholders
    pub fn parse(src: &str) -> Self {
        let mut doc = Self::new();
        for line in src.split('\n') {
            doc.push_line(line);
        }
        doc
    }

    /// Append a paragraph holding `line`
    pub fn push_line(&mut self, line: &str) -> NodeId {
        let paragraph = self.add_paragraph(self.root);
        self.fill(paragraph, line);
        paragraph
    }

    /// Append text and placeholders parsed from `line` under `parent`
    pub fn fill(&mut self, parent: NodeId, line: &str) {
        for segment in split_segments(line) {
            match segment {
                Segment::Text(text) => {
                    self.add_text(parent, text);
                }
                Segment::Placeholder(raw) => {
                    self.add_placeholder(parent, raw);
                }
            }
        }
    }

    pub fn add_paragraph(&mut self, parent: NodeId) -> NodeId {
        self.add(parent, TextNode::Paragraph)
    }

    pub fn add_span(&mut self, parent: NodeId) -> NodeId {
        self.add(parent, TextNode::Span)
    }

    pub fn add_frame(&mut self, parent: NodeId, name: &str) -> NodeId {
        self.add(
            parent,
            TextNode::Frame {
                name: name.to_string(),
            },
        )
    }

    pub fn add_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        self.add(parent, TextNode::Text(text.to_string()))
    }

    pub fn add_placeholder(&mut self, parent: NodeId, raw: &str) -> NodeId {
        self.add(parent, TextNode::Placeholder(raw.to_string()))
    }

    pub fn node(&self, id: NodeId) -> Option<&TextNode> {
        self.slot(id).map(|slot| &slot.node)
    }

    /// Number of live nodes, the root included
    pub fn node_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Placeholders still attached, in document order
    pub fn placeholders(&self) -> Vec<NodeId> {
        let mut found = Vec::new();
        self.collect(self.root, &mut |id, node| {
            if matches!(node, TextNode::Placeholder(_)) {
                found.push(id);
            }
        });
        found
    }

    /// Text of the document: block children of the root become lines,
    /// anything else continues the current line
    pub fn render(&self) -> String {
        let mut lines: Vec<String> = Vec::new();
        let mut open_line = false;
        for child in self.children(self.root) {
            let block = matches!(
                self.node(child),
                Some(TextNode::Paragraph) | Some(TextNode::Frame { .. })
            );
            let text = self.text(child);
            if !block && open_line {
                if let Some(last) = lines.last_mut() {
                    last.push_str(&text);
                }
            } else {
                lines.push(text);
            }
            open_line = !block;
        }
        lines.join("\n")
    }

    fn alloc(&mut self, node: TextNode) -> NodeId {
        let id = NodeId(self.slots.len());
        self.slots.push(Some(Slot {
            node,
            parent: None,
            children: Vec::new(),
        }));
        id
    }

    fn add(&mut self, parent: NodeId, node: TextNode) -> NodeId {
        let id = self.alloc(node);
        self.append_child(parent, id);
        id
    }

    fn slot(&self, id: NodeId) -> Option<&Slot> {
        self.slots.get(id.0).and_then(|slot| slot.as_ref())
    }

    fn slot_mut(&mut self, id: NodeId) -> Option<&mut Slot> {
        self.slots.get_mut(id.0).and_then(|slot| slot.as_mut())
    }

    fn collect(&self, id: NodeId, visit: &mut impl FnMut(NodeId, &TextNode)) {
        if let Some(slot) = self.slot(id) {
            visit(id, &slot.node);
            for &child in &slot.children {
                self.collect(child, visit);
            }
        }
    }

    fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.slot(id).and_then(|slot| slot.parent) else {
            return;
        };
        if let Some(parent_slot) = self.slot_mut(parent) {
            parent_slot.children.retain(|&child| child != id);
        }
        if let Some(slot) = self.slot_mut(id) {
            slot.parent = None;
        }
    }

    /// Attach `id` under `parent` at `index`. Refuses to create a cycle.
    fn attach(&mut self, parent: NodeId, index: Option<usize>, id: NodeId) {
        if self.slot(parent).is_none() || self.slot(id).is_none() {
            return;
        }
        if parent == id || self.is_ancestor(id, parent) {
            trace!(?id, ?parent, "refusing to attach a node under itself");
            return;
        }
        self.detach(id);
        if let Some(parent_slot) = self.slot_mut(parent) {
            let index = index.unwrap_or(parent_slot.children.len()).min(parent_slot.children.len());
            parent_slot.children.insert(index, id);
        }
        if let Some(slot) = self.slot_mut(id) {
            slot.parent = Some(parent);
        }
    }

    fn insert_relative(&mut self, anchor: NodeId, offset: usize, id: NodeId) {
        if anchor == id {
            return;
        }
        let Some(parent) = self.parent(anchor) else {
            return;
        };
        self.detach(id);
        let index = self.children(parent).iter().position(|&child| child == anchor);
        if let Some(index) = index {
            self.attach(parent, Some(index + offset), id);
        }
    }

    fn free(&mut self, id: NodeId) {
        if let Some(slot) = self.slots.get_mut(id.0).and_then(|slot| slot.take()) {
            for child in slot.children {
                self.free(child);
            }
        }
    }
}

impl TreeAdapter for TextDocument {
    fn root(&self) -> NodeId {
        self.root
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.slot(node).and_then(|slot| slot.parent)
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.slot(node).map(|slot| slot.children.clone()).unwrap_or_default()
    }

    fn kind(&self, node: NodeId) -> NodeKind {
        match self.node(node) {
            Some(TextNode::Paragraph) => NodeKind::Boundary,
            Some(TextNode::Span) => NodeKind::TextContainer,
            Some(TextNode::Text(_)) | Some(TextNode::Placeholder(_)) => NodeKind::TextLeaf,
            Some(TextNode::Root) | Some(TextNode::Frame { .. }) | None => NodeKind::Opaque,
        }
    }

    fn text(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.collect(node, &mut |_, n| match n {
            TextNode::Text(text) | TextNode::Placeholder(text) => out.push_str(text),
            _ => {}
        });
        out
    }

    fn is_blank(&self, node: NodeId) -> bool {
        let mut blank = true;
        self.collect(node, &mut |_, n| match n {
            TextNode::Placeholder(_) | TextNode::Frame { .. } => blank = false,
            TextNode::Text(text) if !text.trim().is_empty() => blank = false,
            _ => {}
        });
        blank
    }

    fn is_attached(&self, node: NodeId) -> bool {
        let mut current = node;
        loop {
            if current == self.root {
                return self.slot(current).is_some();
            }
            match self.parent(current) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    fn create_text(&mut self, text: &str) -> NodeId {
        self.alloc(TextNode::Text(text.to_string()))
    }

    fn set_text(&mut self, node: NodeId, text: &str) {
        if let Some(slot) = self.slot_mut(node) {
            if matches!(slot.node, TextNode::Text(_) | TextNode::Placeholder(_)) {
                slot.node = TextNode::Text(text.to_string());
            }
        }
    }

    fn clone_node(&mut self, node: NodeId, deep: bool) -> NodeId {
        let Some(slot) = self.slot(node) else {
            return self.alloc(TextNode::Text(String::new()));
        };
        let copy_node = slot.node.clone();
        let children = if deep { slot.children.clone() } else { Vec::new() };
        let copy = self.alloc(copy_node);
        for child in children {
            let child_copy = self.clone_node(child, true);
            self.attach(copy, None, child_copy);
        }
        copy
    }

    fn insert_before(&mut self, anchor: NodeId, node: NodeId) {
        self.insert_relative(anchor, 0, node);
    }

    fn insert_after(&mut self, anchor: NodeId, node: NodeId) {
        self.insert_relative(anchor, 1, node);
    }

    fn append_child(&mut self, parent: NodeId, node: NodeId) {
        self.attach(parent, None, node);
    }

    fn delete(&mut self, node: NodeId) {
        if node == self.root {
            return;
        }
        self.detach(node);
        self.free(node);
    }

    fn first_child(&self, node: NodeId) -> Option<NodeId> {
        self.slot(node).and_then(|slot| slot.children.first().copied())
    }

    fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        let siblings = &self.slot(self.parent(node)?)?.children;
        let index = siblings.iter().position(|&child| child == node)?;
        siblings.get(index + 1).copied()
    }
}

impl PlaceholderProvider for TextDocument {
    fn is_placeholder(&self, node: NodeId) -> bool {
        matches!(self.node(node), Some(TextNode::Placeholder(_)))
    }

    fn parse(&self, node: NodeId) -> Result<PlaceholderData, SyntaxError> {
        match self.node(node) {
            Some(TextNode::Placeholder(raw)) => Ok(parse_placeholder(raw)?),
            _ => Err(SyntaxError::new(format!("{:?} is not a placeholder", node))),
        }
    }

    fn write(&mut self, node: NodeId, data: &PlaceholderData) {
        if let Some(slot) = self.slot_mut(node) {
            slot.node = TextNode::Placeholder(write_placeholder(data));
        }
    }

    fn create(&mut self, data: &PlaceholderData) -> NodeId {
        self.alloc(TextNode::Placeholder(write_placeholder(data)))
    }
}
