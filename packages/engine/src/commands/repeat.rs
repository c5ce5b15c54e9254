use super::missing_policy;
use crate::area::find_area;
use crate::error::{RenderError, RenderResult};
use crate::handler::{CommandHandler, EngineListener, ExecContext, Selection};
use crate::outcome::Outcome;
use crate::region::{apply_missing_policy, restart_or_rescan};
use crate::splitter::isolate_area;
use crate::tree::TemplateDocument;
use crate::unroller::{unroll, LoopBinding};
use tracing::debug;

/// `${For value:... as:item}` body `${EndFor}`
#[derive(Debug, Default)]
pub struct ForCommand;

impl<D: TemplateDocument + ?Sized> EngineListener<D> for ForCommand {}

impl<D: TemplateDocument + ?Sized> CommandHandler<D> for ForCommand {
    fn name(&self) -> &str {
        "for"
    }

    fn matches(&self, key: &str) -> bool {
        key == "For"
    }

    fn try_execute(&mut self, selection: &Selection, cx: &mut ExecContext<'_, D>) -> RenderResult<Outcome> {
        let binding = LoopBinding::from_selection(selection, cx)?;
        let count = binding.len(selection, cx)?;
        let policy = missing_policy(selection, cx)?;
        let area = find_area(&*cx.doc, cx.lookahead(), selection, "EndFor", &[])?;

        let area = isolate_area(&mut *cx.doc, &area)
            .map_err(|err| RenderError::structure(selection.key(), selection.node, err.to_string()))?;

        if count == 0 {
            return Ok(apply_missing_policy(
                &mut *cx.doc,
                &area,
                policy,
                &cx.config.missing_marker,
            ));
        }

        debug!(count, index = %binding.index_name, "expanding loop");
        let cursor = cx.ctx.model_path().clone();
        let first = unroll(&mut *cx.doc, &area, &binding, count, &cursor);
        Ok(restart_or_rescan(first))
    }
}
