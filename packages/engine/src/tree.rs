//! # Tree capabilities
//!
//! The engine never sees a concrete document format. A format adapter exposes
//! its content as an ordered node tree through [`TreeAdapter`] and tells the
//! engine which nodes are placeholders through [`PlaceholderProvider`].
//!
//! ## Node handles
//!
//! [`NodeId`]s are opaque handles that stay valid for as long as the node
//! exists. Operations on a deleted node are no-ops; [`TreeAdapter::is_attached`]
//! tells whether a handle is still reachable from the root, which is how the
//! engine validates resume positions after a mutation.
//!
//! ## Moving nodes
//!
//! `insert_before`, `insert_after` and `append_child` move the node when it is
//! already attached somewhere else.

use crate::error::SyntaxError;
use serde::{Deserialize, Serialize};
use stencil_model::PlaceholderData;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

/// Structural role of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    /// Carries text directly (runs, placeholders)
    TextLeaf,
    /// Inline container of text leaves (spans)
    TextContainer,
    /// Block-level container that may be split (paragraphs, rows)
    Boundary,
    /// Structural container that must never be split (frames, the root)
    Opaque,
}

pub trait TreeAdapter {
    fn root(&self) -> NodeId;

    fn parent(&self, node: NodeId) -> Option<NodeId>;

    fn children(&self, node: NodeId) -> Vec<NodeId>;

    fn kind(&self, node: NodeId) -> NodeKind;

    /// Document-order text content of the subtree
    fn text(&self, node: NodeId) -> String;

    /// Format-defined emptiness of a subtree
    fn is_blank(&self, node: NodeId) -> bool;

    /// Whether the node still exists and is reachable from the root
    fn is_attached(&self, node: NodeId) -> bool;

    /// Create a detached text leaf
    fn create_text(&mut self, text: &str) -> NodeId;

    fn set_text(&mut self, node: NodeId, text: &str);

    /// Detached copy of `node`; children are copied only when `deep`
    fn clone_node(&mut self, node: NodeId, deep: bool) -> NodeId;

    fn insert_before(&mut self, anchor: NodeId, node: NodeId);

    fn insert_after(&mut self, anchor: NodeId, node: NodeId);

    fn append_child(&mut self, parent: NodeId, node: NodeId);

    /// Remove the node and its whole subtree
    fn delete(&mut self, node: NodeId);

    fn first_child(&self, node: NodeId) -> Option<NodeId> {
        self.children(node).first().copied()
    }

    fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.parent(node)?;
        let siblings = self.children(parent);
        let index = siblings.iter().position(|&n| n == node)?;
        siblings.get(index + 1).copied()
    }

    fn previous_sibling(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.parent(node)?;
        let siblings = self.children(parent);
        let index = siblings.iter().position(|&n| n == node)?;
        index.checked_sub(1).and_then(|i| siblings.get(i).copied())
    }

    /// Strict ancestors, nearest first
    fn ancestors(&self, node: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut current = self.parent(node);
        while let Some(ancestor) = current {
            result.push(ancestor);
            current = self.parent(ancestor);
        }
        result
    }

    fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.ancestors(node).contains(&ancestor)
    }
}

pub trait PlaceholderProvider {
    fn is_placeholder(&self, node: NodeId) -> bool;

    fn parse(&self, node: NodeId) -> Result<PlaceholderData, SyntaxError>;

    /// Rewrite an existing placeholder node
    fn write(&mut self, node: NodeId, data: &PlaceholderData);

    /// Create a detached placeholder node
    fn create(&mut self, data: &PlaceholderData) -> NodeId;

    /// Command key of a placeholder, `None` if it does not parse
    fn key(&self, node: NodeId) -> Option<String> {
        self.parse(node).ok().map(|data| data.key().to_string())
    }
}

/// Everything the engine needs from a document
pub trait TemplateDocument: TreeAdapter + PlaceholderProvider {}

impl<T: TreeAdapter + PlaceholderProvider + ?Sized> TemplateDocument for T {}
