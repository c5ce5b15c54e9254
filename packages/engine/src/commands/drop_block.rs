use crate::error::{RenderError, RenderResult};
use crate::handler::{CommandHandler, EngineListener, ExecContext, Selection};
use crate::outcome::Outcome;
use crate::tree::{NodeId, NodeKind, TemplateDocument};
use crate::RenderContext;
use tracing::debug;

/// `${DropBlock}` removes its enclosing block once rendering is done.
///
/// Deletion waits for the end of the document so that placeholders inside
/// the block still run (and may, for example, pop bindings they pushed).
#[derive(Debug, Default)]
pub struct DropBlockCommand {
    marked: Vec<NodeId>,
}

impl<D: TemplateDocument + ?Sized> EngineListener<D> for DropBlockCommand {
    fn init(&mut self, _doc: &mut D, _ctx: &mut RenderContext) -> RenderResult<()> {
        self.marked.clear();
        Ok(())
    }

    fn eod_reached(&mut self, doc: &mut D, _ctx: &mut RenderContext) -> RenderResult<()> {
        for block in self.marked.drain(..) {
            if doc.is_attached(block) {
                debug!(?block, "dropping block");
                doc.delete(block);
            }
        }
        Ok(())
    }
}

impl<D: TemplateDocument + ?Sized> CommandHandler<D> for DropBlockCommand {
    fn name(&self) -> &str {
        "drop-block"
    }

    fn matches(&self, key: &str) -> bool {
        key == "DropBlock"
    }

    fn try_execute(&mut self, selection: &Selection, cx: &mut ExecContext<'_, D>) -> RenderResult<Outcome> {
        let block = cx
            .doc
            .ancestors(selection.node)
            .into_iter()
            .find(|&ancestor| cx.doc.kind(ancestor) == NodeKind::Boundary)
            .ok_or_else(|| {
                RenderError::structure(selection.key(), selection.node, "no enclosing block to drop")
            })?;
        if !self.marked.contains(&block) {
            self.marked.push(block);
        }
        cx.doc.delete(selection.node);
        Ok(Outcome::Proceed)
    }
}
