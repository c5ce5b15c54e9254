use crate::error::{RenderError, RenderResult};
use crate::handler::{CommandHandler, CustomEvent, EngineListener, ExecContext, Selection};
use crate::outcome::Outcome;
use crate::tree::TemplateDocument;
use crate::RenderContext;
use std::collections::HashMap;
use stencil_model::DataNode;
use tracing::debug;

pub const ALIAS_DEFINE_EVENT: &str = "alias.define";

/// `${Alias key:Sig text:"Kind regards"}` makes every later `${Sig}` render
/// as the text. Definitions travel as `alias.define` events, so any other
/// listener can pick them up too. Aliases never override keys claimed by
/// handlers registered earlier.
#[derive(Debug, Default)]
pub struct AliasCommand {
    aliases: HashMap<String, String>,
}

impl<D: TemplateDocument + ?Sized> EngineListener<D> for AliasCommand {
    fn init(&mut self, _doc: &mut D, _ctx: &mut RenderContext) -> RenderResult<()> {
        self.aliases.clear();
        Ok(())
    }

    fn on_custom_event(
        &mut self,
        event: &CustomEvent,
        _doc: &mut D,
        _ctx: &mut RenderContext,
    ) -> RenderResult<Outcome> {
        if event.name == ALIAS_DEFINE_EVENT {
            let field = |name: &str| event.payload.property(name).and_then(|v| v.render_text());
            if let (Some(key), Some(text)) = (field("key"), field("text")) {
                debug!(%key, "alias defined");
                self.aliases.insert(key, text);
            }
        }
        Ok(Outcome::Ignored)
    }
}

impl<D: TemplateDocument + ?Sized> CommandHandler<D> for AliasCommand {
    fn name(&self) -> &str {
        "alias"
    }

    fn matches(&self, key: &str) -> bool {
        key == "Alias" || self.aliases.contains_key(key)
    }

    fn try_execute(&mut self, selection: &Selection, cx: &mut ExecContext<'_, D>) -> RenderResult<Outcome> {
        if selection.key() != "Alias" {
            let Some(text) = self.aliases.get(selection.key()) else {
                return Ok(Outcome::Ignored);
            };
            cx.replace_with_text(selection.node, text);
            return Ok(Outcome::Proceed);
        }

        let key = cx.require_literal(selection, "key")?;
        if key == "Alias" {
            return Err(RenderError::invalid(
                selection.key(),
                "key",
                selection.node,
                "cannot alias the Alias command",
            ));
        }
        let text = cx
            .resolve(selection, "text")?
            .ok_or_else(|| RenderError::missing(selection.key(), "text", selection.node))?
            .render_text()
            .ok_or_else(|| RenderError::invalid(selection.key(), "text", selection.node, "expected a scalar"))?;

        cx.emit(CustomEvent::new(
            ALIAS_DEFINE_EVENT,
            DataNode::map_from([("key", DataNode::leaf(key)), ("text", DataNode::leaf(text))]),
        ));
        cx.doc.delete(selection.node);
        Ok(Outcome::Proceed)
    }
}
