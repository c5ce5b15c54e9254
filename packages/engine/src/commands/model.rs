use crate::error::{RenderError, RenderResult};
use crate::handler::{CommandHandler, EngineListener, ExecContext, Selection};
use crate::outcome::Outcome;
use crate::tree::TemplateDocument;
use stencil_model::{DataKind, PathExpr};
use tracing::trace;

/// `${Model path:"/customers[0]" prefix:c}` moves the model cursor.
///
/// `prefixes` (a map of prefix name to absolute base) re-establishes
/// prefixes before `prefix` aliases the new position; loop expansion uses it
/// to keep outer prefixes alive across absolute repositioning.
#[derive(Debug, Default)]
pub struct ModelCommand;

impl<D: TemplateDocument + ?Sized> EngineListener<D> for ModelCommand {}

impl<D: TemplateDocument + ?Sized> CommandHandler<D> for ModelCommand {
    fn name(&self) -> &str {
        "model"
    }

    fn matches(&self, key: &str) -> bool {
        key == "Model"
    }

    fn try_execute(&mut self, selection: &Selection, cx: &mut ExecContext<'_, D>) -> RenderResult<Outcome> {
        let key = selection.key();
        let node = selection.node;
        let parse = |attribute: &str, src: &str| {
            PathExpr::parse(src).map_err(|err| RenderError::from_model(err, key, attribute, node))
        };

        let path = parse("path", &cx.require_literal(selection, "path")?)?;
        let mut next = cx.ctx.model_path().reposition(&path);

        if let Some(attr) = selection.data.attribute("prefixes") {
            if attr.value.kind() != DataKind::Map {
                return Err(RenderError::invalid(key, "prefixes", node, "expected a map"));
            }
            for name in attr.value.keys() {
                let base = attr
                    .value
                    .property(&name)
                    .and_then(|base| base.render_text())
                    .ok_or_else(|| RenderError::invalid(key, "prefixes", node, "expected a path"))?;
                next = next.with_prefix_at(name, parse("prefixes", &base)?);
            }
        }

        if let Some(prefix) = cx.optional_literal(selection, "prefix")? {
            next = next.with_prefix(prefix);
        }

        trace!(cursor = %next, "model cursor moved");
        cx.ctx.set_model_path(next);
        cx.doc.delete(node);
        Ok(Outcome::Proceed)
    }
}
