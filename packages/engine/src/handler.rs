//! # Command handlers
//!
//! A handler claims placeholders by key and rewrites the document around
//! them. Listeners observe the session: they are initialised before the
//! first scan, told about rescans and custom events, and get a last say when
//! the end of the document is reached. Every handler is also a listener.
//!
//! Handlers never talk to each other directly. When one needs to inform the
//! others (an alias being defined, say), it emits a [`CustomEvent`]; the
//! engine delivers it to everyone once the emitting handler has returned.

use crate::config::RenderConfig;
use crate::context::RenderContext;
use crate::error::{RenderError, RenderResult};
use crate::outcome::Outcome;
use crate::scanner::Scanner;
use crate::tree::{NodeId, TemplateDocument};
use stencil_model::{AccessType, DataNode, PlaceholderData};

/// The placeholder being dispatched
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub node: NodeId,
    pub data: PlaceholderData,
}

impl Selection {
    pub fn new(node: NodeId, data: PlaceholderData) -> Self {
        Self { node, data }
    }

    pub fn key(&self) -> &str {
        self.data.key()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CustomEvent {
    pub name: String,
    pub payload: DataNode,
}

impl CustomEvent {
    pub fn new(name: impl Into<String>, payload: DataNode) -> Self {
        Self {
            name: name.into(),
            payload,
        }
    }
}

pub trait EngineListener<D: TemplateDocument + ?Sized> {
    fn init(&mut self, _doc: &mut D, _ctx: &mut RenderContext) -> RenderResult<()> {
        Ok(())
    }

    /// Called once scanning ends, handlers first
    fn eod_reached(&mut self, _doc: &mut D, _ctx: &mut RenderContext) -> RenderResult<()> {
        Ok(())
    }

    fn rescan(&mut self) {}

    /// A listener may restructure the document in response; the returned
    /// outcome is joined with the outcome of the dispatch that emitted it.
    fn on_custom_event(
        &mut self,
        _event: &CustomEvent,
        _doc: &mut D,
        _ctx: &mut RenderContext,
    ) -> RenderResult<Outcome> {
        Ok(Outcome::Ignored)
    }
}

pub trait CommandHandler<D: TemplateDocument + ?Sized>: EngineListener<D> {
    fn name(&self) -> &str;

    fn matches(&self, key: &str) -> bool;

    /// `Ok(Outcome::Ignored)` passes the placeholder on to the next handler
    fn try_execute(
        &mut self,
        selection: &Selection,
        cx: &mut ExecContext<'_, D>,
    ) -> RenderResult<Outcome>;
}

/// Everything a handler may touch during one dispatch
pub struct ExecContext<'a, D: TemplateDocument + ?Sized> {
    pub doc: &'a mut D,
    pub ctx: &'a mut RenderContext,
    pub config: &'a RenderConfig,
    cursor: &'a Scanner,
    events: &'a mut Vec<CustomEvent>,
}

impl<'a, D: TemplateDocument + ?Sized> ExecContext<'a, D> {
    pub(crate) fn new(
        doc: &'a mut D,
        ctx: &'a mut RenderContext,
        config: &'a RenderConfig,
        cursor: &'a Scanner,
        events: &'a mut Vec<CustomEvent>,
    ) -> Self {
        Self {
            doc,
            ctx,
            config,
            cursor,
            events,
        }
    }

    /// An independent cursor positioned right after the current placeholder
    pub fn lookahead(&self) -> Scanner {
        self.cursor.clone()
    }

    pub fn emit(&mut self, event: CustomEvent) {
        self.events.push(event);
    }

    /// Current value of an attribute; `None` when it is absent or unresolved
    pub fn resolve(&self, selection: &Selection, name: &str) -> RenderResult<Option<DataNode>> {
        match selection.data.attribute(name) {
            Some(attr) => self
                .ctx
                .resolve(attr)
                .map_err(|err| RenderError::from_model(err, selection.key(), name, selection.node)),
            None => Ok(None),
        }
    }

    pub fn project(&self, selection: &Selection, name: &str) -> RenderResult<DataNode> {
        let attr = selection
            .data
            .attribute(name)
            .ok_or_else(|| RenderError::missing(selection.key(), name, selection.node))?;
        self.ctx
            .project(attr)
            .map_err(|err| RenderError::from_model(err, selection.key(), name, selection.node))
    }

    /// A mandatory attribute that must be written without a sigil
    pub fn require_literal(&self, selection: &Selection, name: &str) -> RenderResult<String> {
        match selection.data.access(name) {
            AccessType::Literal => selection.data.literal_text(name).ok_or_else(|| {
                RenderError::invalid(selection.key(), name, selection.node, "expected a scalar")
            }),
            AccessType::MissingAccess => Err(RenderError::missing(selection.key(), name, selection.node)),
            access => Err(RenderError::access_mode(
                selection.key(),
                name,
                selection.node,
                access,
            )),
        }
    }

    /// Optional literal attribute
    pub fn optional_literal(&self, selection: &Selection, name: &str) -> RenderResult<Option<String>> {
        match selection.data.access(name) {
            AccessType::MissingAccess => Ok(None),
            _ => self.require_literal(selection, name).map(Some),
        }
    }

    /// Swap `node` for a plain text leaf
    pub fn replace_with_text(&mut self, node: NodeId, text: &str) -> NodeId {
        let replacement = self.doc.create_text(text);
        self.doc.insert_before(node, replacement);
        self.doc.delete(node);
        replacement
    }
}
