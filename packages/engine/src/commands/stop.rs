use crate::error::RenderResult;
use crate::handler::{CommandHandler, EngineListener, ExecContext, Selection};
use crate::outcome::Outcome;
use crate::tree::TemplateDocument;

/// `${Stop}` ends the scan; later placeholders are left as written
#[derive(Debug, Default)]
pub struct StopCommand;

impl<D: TemplateDocument + ?Sized> EngineListener<D> for StopCommand {}

impl<D: TemplateDocument + ?Sized> CommandHandler<D> for StopCommand {
    fn name(&self) -> &str {
        "stop"
    }

    fn matches(&self, key: &str) -> bool {
        key == "Stop"
    }

    fn try_execute(&mut self, selection: &Selection, cx: &mut ExecContext<'_, D>) -> RenderResult<Outcome> {
        cx.doc.delete(selection.node);
        Ok(Outcome::EndOfDoc)
    }
}
