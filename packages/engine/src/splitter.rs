//! # Tree splitting
//!
//! Block commands may open in one paragraph and close in another, or sit in
//! the middle of a styled span. Before a region can be removed or repeated
//! its markers must become siblings. [`split`] cuts every container between
//! a node and a chosen ancestor in two around the node:
//!
//! ```text
//!   P[ "a" S[ "b" N "c" ] "d" ]        split(N, P's parent)
//!
//!   P[ "a" S[ "b" ] ]  P[ S[ N ] ]  P[ S[ "c" ] "d" ]
//!      left              middle        right
//! ```
//!
//! Content order is preserved; fragments left blank are dropped.

use crate::area::Area;
use crate::tree::{NodeId, NodeKind, TemplateDocument};
use thiserror::Error;
use tracing::trace;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SplitError {
    #[error("{ancestor:?} is not an ancestor of {node:?}")]
    NotAnAncestor { node: NodeId, ancestor: NodeId },

    #[error("cannot split through opaque container {container:?}")]
    Opaque { container: NodeId },

    #[error("{first:?} and {second:?} share no ancestor")]
    Disjoint { first: NodeId, second: NodeId },
}

/// Result of [`split`]. `middle` is the child of the ancestor that now holds
/// the split node and nothing beside the path down to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Split {
    pub left: Option<NodeId>,
    pub middle: NodeId,
    pub right: Option<NodeId>,
}

pub fn split<D: TemplateDocument + ?Sized>(
    doc: &mut D,
    node: NodeId,
    ancestor: NodeId,
) -> Result<Split, SplitError> {
    let path = path_below(doc, node, ancestor)?;

    let left_marker = doc.clone_node(node, false);
    doc.insert_before(node, left_marker);
    let right_marker = doc.clone_node(node, false);
    doc.insert_after(node, right_marker);

    let mut left_tree = left_marker;
    let mut right_tree = right_marker;
    let mut path_child = node;

    for container in path {
        let next_left = doc.clone_node(container, false);
        let next_right = doc.clone_node(container, false);

        let children = doc.children(container);
        let position = children
            .iter()
            .position(|&child| child == path_child)
            .unwrap_or(children.len());
        for &child in &children[..position] {
            doc.append_child(next_left, child);
        }
        for &child in children.iter().skip(position + 1) {
            doc.append_child(next_right, child);
        }
        doc.insert_before(container, next_left);
        doc.insert_after(container, next_right);

        left_tree = next_left;
        right_tree = next_right;
        path_child = container;
    }

    doc.delete(left_marker);
    doc.delete(right_marker);

    let left = keep_fragment(doc, left_tree, left_marker);
    let right = keep_fragment(doc, right_tree, right_marker);
    trace!(?node, ?left, middle = ?path_child, ?right, "split");

    Ok(Split {
        left,
        middle: path_child,
        right,
    })
}

/// Containers strictly between `node` and `ancestor`, nearest first
fn path_below<D: TemplateDocument + ?Sized>(
    doc: &D,
    node: NodeId,
    ancestor: NodeId,
) -> Result<Vec<NodeId>, SplitError> {
    let mut path = Vec::new();
    let mut current = doc.parent(node);
    loop {
        match current {
            Some(container) if container == ancestor => return Ok(path),
            Some(container) => {
                if doc.kind(container) == NodeKind::Opaque {
                    return Err(SplitError::Opaque { container });
                }
                path.push(container);
                current = doc.parent(container);
            }
            None => return Err(SplitError::NotAnAncestor { node, ancestor }),
        }
    }
}

fn keep_fragment<D: TemplateDocument + ?Sized>(doc: &mut D, tree: NodeId, marker: NodeId) -> Option<NodeId> {
    if tree == marker {
        return None;
    }
    if doc.is_blank(tree) {
        doc.delete(tree);
        return None;
    }
    Some(tree)
}

pub fn lowest_common_ancestor<D: TemplateDocument + ?Sized>(
    doc: &D,
    first: NodeId,
    second: NodeId,
) -> Option<NodeId> {
    let first_line = doc.ancestors(first);
    doc.ancestors(second)
        .into_iter()
        .find(|ancestor| first_line.contains(ancestor))
}

/// An area whose markers have been lifted to sibling level
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IsolatedArea {
    pub container: NodeId,
    pub begin: NodeId,
    pub separators: Vec<NodeId>,
    pub end: NodeId,
}

impl IsolatedArea {
    /// Markers in document order: begin, separators, end
    pub fn markers(&self) -> Vec<NodeId> {
        let mut markers = Vec::with_capacity(self.separators.len() + 2);
        markers.push(self.begin);
        markers.extend(self.separators.iter().copied());
        markers.push(self.end);
        markers
    }

    /// Siblings strictly between two markers of this area
    pub fn between<D: TemplateDocument + ?Sized>(&self, doc: &D, from: NodeId, to: NodeId) -> Vec<NodeId> {
        doc.children(self.container)
            .into_iter()
            .skip_while(|&child| child != from)
            .skip(1)
            .take_while(|&child| child != to)
            .collect()
    }

    /// Everything between begin and end, separators included
    pub fn body<D: TemplateDocument + ?Sized>(&self, doc: &D) -> Vec<NodeId> {
        self.between(doc, self.begin, self.end)
    }

    /// Siblings from `from` to `to`, both inclusive
    pub fn span<D: TemplateDocument + ?Sized>(&self, doc: &D, from: NodeId, to: NodeId) -> Vec<NodeId> {
        let mut nodes = vec![from];
        nodes.extend(self.between(doc, from, to));
        nodes.push(to);
        nodes
    }
}

/// Lift every marker of `area` to a direct child of the markers' lowest
/// common ancestor. Every marker path is checked before the first split, so
/// a failure leaves the document as it was.
pub fn isolate_area<D: TemplateDocument + ?Sized>(
    doc: &mut D,
    area: &Area,
) -> Result<IsolatedArea, SplitError> {
    let container = lowest_common_ancestor(doc, area.begin, area.end).ok_or(SplitError::Disjoint {
        first: area.begin,
        second: area.end,
    })?;

    let markers = std::iter::once(area.begin)
        .chain(area.separators.iter().copied())
        .chain(std::iter::once(area.end));
    for marker in markers {
        path_below(&*doc, marker, container)?;
    }

    let lift = |doc: &mut D, marker: NodeId| -> Result<NodeId, SplitError> {
        if doc.parent(marker) == Some(container) {
            Ok(marker)
        } else {
            Ok(split(doc, marker, container)?.middle)
        }
    };

    let begin = lift(doc, area.begin)?;
    let separators = area
        .separators
        .iter()
        .map(|&separator| lift(doc, separator))
        .collect::<Result<Vec<_>, _>>()?;
    let end = lift(doc, area.end)?;

    Ok(IsolatedArea {
        container,
        begin,
        separators,
        end,
    })
}
