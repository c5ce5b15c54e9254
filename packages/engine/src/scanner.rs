//! Document-order placeholder walk.
//!
//! The walk is a small state machine over two kinds of steps: entering a
//! node and leaving it. Placeholders are yielded when entered. Because the
//! state is a single step, a scanner is cheap to clone, and a clone is an
//! independent cursor over the same position (used for lookahead).

use crate::tree::{NodeId, TemplateDocument};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Enter(NodeId),
    Leave(NodeId),
}

#[derive(Debug, Clone)]
pub struct Scanner {
    root: NodeId,
    next: Option<Step>,
    stop: Option<NodeId>,
}

impl Scanner {
    /// Walk the whole subtree under `root`
    pub fn new(root: NodeId) -> Self {
        Self {
            root,
            next: Some(Step::Enter(root)),
            stop: None,
        }
    }

    /// Walk from `node` (inclusive) to the end of `root`'s subtree
    pub fn starting_at(root: NodeId, node: NodeId) -> Self {
        Self {
            root,
            next: Some(Step::Enter(node)),
            stop: None,
        }
    }

    /// Walk from just after `node`'s subtree
    pub fn resume_after(root: NodeId, node: NodeId) -> Self {
        Self {
            root,
            next: Some(Step::Leave(node)),
            stop: None,
        }
    }

    /// End the walk when `node` is about to be entered
    pub fn stop_at(mut self, node: NodeId) -> Self {
        self.stop = Some(node);
        self
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn is_exhausted(&self) -> bool {
        self.next.is_none()
    }

    /// The node the pending step refers to
    pub fn position(&self) -> Option<NodeId> {
        match self.next? {
            Step::Enter(node) | Step::Leave(node) => Some(node),
        }
    }

    /// Next placeholder in document order
    pub fn next<D: TemplateDocument + ?Sized>(&mut self, doc: &D) -> Option<NodeId> {
        while let Some(step) = self.next.take() {
            match step {
                Step::Enter(node) => {
                    if self.stop == Some(node) {
                        return None;
                    }
                    if doc.is_placeholder(node) {
                        self.next = Some(Step::Leave(node));
                        return Some(node);
                    }
                    self.next = Some(match doc.first_child(node) {
                        Some(child) => Step::Enter(child),
                        None => Step::Leave(node),
                    });
                }
                Step::Leave(node) => self.next = self.after(doc, node),
            }
        }
        None
    }

    /// Resolve a pending leave step so the cursor no longer depends on the
    /// node it just yielded. Handlers may then delete that node freely.
    pub fn settle<D: TemplateDocument + ?Sized>(&mut self, doc: &D) {
        if let Some(Step::Leave(node)) = self.next {
            self.next = self.after(doc, node);
        }
    }

    /// Whether the pending step still points into the live tree
    pub fn is_valid<D: TemplateDocument + ?Sized>(&self, doc: &D) -> bool {
        self.position().map_or(true, |node| doc.is_attached(node))
    }

    pub fn iter<'d, D: TemplateDocument + ?Sized>(self, doc: &'d D) -> ScanIter<'d, D> {
        ScanIter { scanner: self, doc }
    }

    fn after<D: TemplateDocument + ?Sized>(&self, doc: &D, node: NodeId) -> Option<Step> {
        if node == self.root {
            return None;
        }
        match doc.next_sibling(node) {
            Some(sibling) => Some(Step::Enter(sibling)),
            None => doc.parent(node).map(Step::Leave),
        }
    }
}

pub struct ScanIter<'d, D: ?Sized> {
    scanner: Scanner,
    doc: &'d D,
}

impl<'d, D: TemplateDocument + ?Sized> Iterator for ScanIter<'d, D> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        self.scanner.next(self.doc)
    }
}
