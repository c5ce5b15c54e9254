use super::missing_policy;
use crate::area::find_area;
use crate::error::{RenderError, RenderResult};
use crate::handler::{CommandHandler, EngineListener, ExecContext, Selection};
use crate::outcome::Outcome;
use crate::region::{apply_missing_policy, delete_all, restart_or_rescan, resume_after};
use crate::splitter::isolate_area;
use crate::tree::TemplateDocument;
use stencil_model::ModelError;
use tracing::debug;

/// `${If cond:...}` then `${Else}` otherwise `${EndIf}`
#[derive(Debug, Default)]
pub struct IfCommand;

impl<D: TemplateDocument + ?Sized> EngineListener<D> for IfCommand {}

impl<D: TemplateDocument + ?Sized> CommandHandler<D> for IfCommand {
    fn name(&self) -> &str {
        "if"
    }

    fn matches(&self, key: &str) -> bool {
        key == "If"
    }

    fn try_execute(&mut self, selection: &Selection, cx: &mut ExecContext<'_, D>) -> RenderResult<Outcome> {
        let key = selection.key();
        let node = selection.node;

        let area = find_area(&*cx.doc, cx.lookahead(), selection, "EndIf", &["Else"])?;
        if area.separators.len() > 1 {
            return Err(RenderError::structure(key, node, "more than one Else"));
        }

        let attr = selection
            .data
            .attribute("cond")
            .ok_or_else(|| RenderError::missing(key, "cond", node))?;
        let cond = match cx.ctx.resolve(attr) {
            Ok(value) => value,
            Err(ModelError::UnboundVariable { .. }) => None,
            Err(err) => return Err(RenderError::from_model(err, key, "cond", node)),
        };
        let policy = missing_policy(selection, cx)?;

        let area = isolate_area(&mut *cx.doc, &area)
            .map_err(|err| RenderError::structure(key, node, err.to_string()))?;

        let Some(cond) = cond else {
            return Ok(apply_missing_policy(
                &mut *cx.doc,
                &area,
                policy,
                &cx.config.missing_marker,
            ));
        };

        let truthy = cond.is_truthy();
        let else_marker = area.separators.first().copied();
        let kept = match (truthy, else_marker) {
            (true, Some(marker)) => area.between(&*cx.doc, area.begin, marker),
            (true, None) => area.body(&*cx.doc),
            (false, Some(marker)) => area.between(&*cx.doc, marker, area.end),
            (false, None) => Vec::new(),
        };
        debug!(truthy, kept = kept.len(), "condition evaluated");

        let following = resume_after(&*cx.doc, &area);
        let dropped: Vec<_> = area
            .span(&*cx.doc, area.begin, area.end)
            .into_iter()
            .filter(|n| !kept.contains(n))
            .collect();
        delete_all(&mut *cx.doc, &dropped);

        Ok(restart_or_rescan(kept.first().copied().or(following)))
    }
}
