use crate::error::{RenderError, RenderResult};
use crate::handler::{CommandHandler, EngineListener, ExecContext, Selection};
use crate::outcome::Outcome;
use crate::tree::TemplateDocument;

/// `${Value *value:name}` substitutes a scalar
#[derive(Debug, Default)]
pub struct ValueCommand;

impl<D: TemplateDocument + ?Sized> EngineListener<D> for ValueCommand {}

impl<D: TemplateDocument + ?Sized> CommandHandler<D> for ValueCommand {
    fn name(&self) -> &str {
        "value"
    }

    fn matches(&self, key: &str) -> bool {
        key == "Value"
    }

    fn try_execute(&mut self, selection: &Selection, cx: &mut ExecContext<'_, D>) -> RenderResult<Outcome> {
        let value = cx
            .resolve(selection, "value")?
            .ok_or_else(|| RenderError::missing(selection.key(), "value", selection.node))?;
        let text = value.render_text().ok_or_else(|| {
            RenderError::invalid(
                selection.key(),
                "value",
                selection.node,
                format!("expected a scalar, found a {:?}", value.kind()),
            )
        })?;
        cx.replace_with_text(selection.node, &text);
        Ok(Outcome::Proceed)
    }
}
