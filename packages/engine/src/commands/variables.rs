use crate::error::{RenderError, RenderResult};
use crate::handler::{CommandHandler, EngineListener, ExecContext, Selection};
use crate::outcome::Outcome;
use crate::tree::TemplateDocument;
use tracing::trace;

/// `${Push name:x value:...}` binds a variable
#[derive(Debug, Default)]
pub struct PushCommand;

impl<D: TemplateDocument + ?Sized> EngineListener<D> for PushCommand {}

impl<D: TemplateDocument + ?Sized> CommandHandler<D> for PushCommand {
    fn name(&self) -> &str {
        "push"
    }

    fn matches(&self, key: &str) -> bool {
        key == "Push"
    }

    fn try_execute(&mut self, selection: &Selection, cx: &mut ExecContext<'_, D>) -> RenderResult<Outcome> {
        let name = cx.require_literal(selection, "name")?;
        let value = cx.project(selection, "value")?;
        trace!(%name, "push");
        cx.ctx.variables_mut().push(name, value);
        cx.doc.delete(selection.node);
        Ok(Outcome::Proceed)
    }
}

/// `${Pop name:x}` drops the most recent binding of a variable
#[derive(Debug, Default)]
pub struct PopCommand;

impl<D: TemplateDocument + ?Sized> EngineListener<D> for PopCommand {}

impl<D: TemplateDocument + ?Sized> CommandHandler<D> for PopCommand {
    fn name(&self) -> &str {
        "pop"
    }

    fn matches(&self, key: &str) -> bool {
        key == "Pop"
    }

    fn try_execute(&mut self, selection: &Selection, cx: &mut ExecContext<'_, D>) -> RenderResult<Outcome> {
        let name = cx.require_literal(selection, "name")?;
        if cx.ctx.variables_mut().pop(&name).is_none() {
            return Err(RenderError::structure(
                selection.key(),
                selection.node,
                format!("unbalanced pop of '{}'", name),
            ));
        }
        cx.doc.delete(selection.node);
        Ok(Outcome::Proceed)
    }
}
