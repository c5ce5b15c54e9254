//! # Render loop
//!
//! ```text
//!   init handlers, listeners
//!        │
//!   ┌────▼─────┐  placeholder   ┌──────────┐  outcome
//!   │ Scanner  ├───────────────►│ dispatch ├──────────┐
//!   └────▲─────┘                └──────────┘          │
//!        │   Proceed / RestartAt / FullRescan         │
//!        └────────────────────────────────────────────┘
//!        │ exhausted or EndOfDoc
//!   eod_reached handlers, listeners
//! ```
//!
//! The scanner's successor position is computed before a handler runs, so a
//! handler that only touches its own placeholder can answer `Proceed`.
//! Anything that restructures the document answers `RestartAt` or
//! `FullRescan`. A resume position that no longer exists degrades to a full
//! rescan.

use crate::commands;
use crate::config::{RenderConfig, UnknownCommandPolicy};
use crate::context::RenderContext;
use crate::error::{RenderError, RenderResult};
use crate::handler::{CommandHandler, CustomEvent, EngineListener, ExecContext, Selection};
use crate::outcome::Outcome;
use crate::scanner::Scanner;
use crate::tree::{NodeId, TemplateDocument};
use stencil_model::DataNode;
use tracing::{debug, instrument, trace, warn};

/// Counters describing one render session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderReport {
    /// Placeholders a handler acted on
    pub commands: usize,
    /// Placeholders no handler accepted
    pub unknown: usize,
    pub restarts: usize,
    pub rescans: usize,
}

pub struct Engine<D: TemplateDocument + ?Sized> {
    handlers: Vec<Box<dyn CommandHandler<D>>>,
    listeners: Vec<Box<dyn EngineListener<D>>>,
    config: RenderConfig,
}

impl<D: TemplateDocument + ?Sized> Engine<D> {
    /// An engine without any handlers
    pub fn new(config: RenderConfig) -> Self {
        Self {
            handlers: Vec::new(),
            listeners: Vec::new(),
            config,
        }
    }

    /// An engine with the built-in command set registered
    pub fn with_core_commands(config: RenderConfig) -> Self {
        let mut engine = Self::new(config);
        commands::register_core(&mut engine);
        engine
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Handlers are consulted in registration order
    pub fn register(&mut self, handler: Box<dyn CommandHandler<D>>) -> &mut Self {
        self.handlers.push(handler);
        self
    }

    pub fn add_listener(&mut self, listener: Box<dyn EngineListener<D>>) -> &mut Self {
        self.listeners.push(listener);
        self
    }

    pub fn handler_names(&self) -> Vec<&str> {
        self.handlers.iter().map(|h| h.name()).collect()
    }

    pub fn render(&mut self, doc: &mut D, model: DataNode) -> RenderResult<RenderReport> {
        let mut ctx = RenderContext::new(model);
        self.render_with(doc, &mut ctx)
    }

    #[instrument(skip_all)]
    pub fn render_with(&mut self, doc: &mut D, ctx: &mut RenderContext) -> RenderResult<RenderReport> {
        for handler in self.handlers.iter_mut() {
            handler.init(doc, ctx)?;
        }
        for listener in self.listeners.iter_mut() {
            listener.init(doc, ctx)?;
        }

        let root = doc.root();
        let mut report = RenderReport::default();
        let mut scanner = Scanner::new(root);

        while let Some(node) = scanner.next(&*doc) {
            scanner.settle(&*doc);

            let data = doc
                .parse(node)
                .map_err(|source| RenderError::Syntax { node, source })?;
            let selection = Selection::new(node, data);
            trace!(key = selection.key(), ?node, "dispatch");

            let mut events = Vec::new();
            let mut outcome = self.dispatch(doc, ctx, &scanner, &selection, &mut events)?;
            if outcome.is_handled() {
                report.commands += 1;
            }
            for event in &events {
                outcome = outcome.combine(self.deliver(event, doc, ctx)?);
            }

            match outcome {
                Outcome::Ignored => {
                    report.unknown += 1;
                    match self.config.unknown_command {
                        UnknownCommandPolicy::Keep => {
                            debug!(key = selection.key(), "no handler, keeping placeholder")
                        }
                        UnknownCommandPolicy::Remove => doc.delete(node),
                        UnknownCommandPolicy::Error => {
                            return Err(RenderError::UnknownCommand {
                                key: selection.key().to_string(),
                                node,
                            })
                        }
                    }
                }
                Outcome::Proceed => {
                    if !scanner.is_valid(&*doc) {
                        warn!(key = selection.key(), "resume position vanished, rescanning");
                        scanner = self.full_rescan(root, &mut report)?;
                    }
                }
                Outcome::RestartAt(target) => {
                    if doc.is_attached(target) {
                        self.count_restart(&mut report)?;
                        scanner = Scanner::starting_at(root, target);
                    } else {
                        warn!(key = selection.key(), ?target, "restart target detached, rescanning");
                        scanner = self.full_rescan(root, &mut report)?;
                    }
                }
                Outcome::FullRescan => scanner = self.full_rescan(root, &mut report)?,
                Outcome::EndOfDoc => {
                    debug!(key = selection.key(), "end of document requested");
                    break;
                }
            }
        }

        for handler in self.handlers.iter_mut() {
            handler.eod_reached(doc, ctx)?;
        }
        for listener in self.listeners.iter_mut() {
            listener.eod_reached(doc, ctx)?;
        }

        debug!(
            commands = report.commands,
            restarts = report.restarts,
            rescans = report.rescans,
            "render finished"
        );
        Ok(report)
    }

    fn dispatch(
        &mut self,
        doc: &mut D,
        ctx: &mut RenderContext,
        scanner: &Scanner,
        selection: &Selection,
        events: &mut Vec<CustomEvent>,
    ) -> RenderResult<Outcome> {
        for handler in self.handlers.iter_mut() {
            if !handler.matches(selection.key()) {
                continue;
            }
            let mut cx = ExecContext::new(&mut *doc, &mut *ctx, &self.config, scanner, &mut *events);
            let outcome = handler.try_execute(selection, &mut cx)?;
            if outcome.is_handled() {
                trace!(handler = handler.name(), ?outcome, "handled");
                return Ok(outcome);
            }
        }
        Ok(Outcome::Ignored)
    }

    fn deliver(&mut self, event: &CustomEvent, doc: &mut D, ctx: &mut RenderContext) -> RenderResult<Outcome> {
        trace!(event = %event.name, "custom event");
        let mut outcome = Outcome::Ignored;
        for handler in self.handlers.iter_mut() {
            outcome = outcome.combine(handler.on_custom_event(event, doc, ctx)?);
        }
        for listener in self.listeners.iter_mut() {
            outcome = outcome.combine(listener.on_custom_event(event, doc, ctx)?);
        }
        Ok(outcome)
    }

    fn full_rescan(&mut self, root: NodeId, report: &mut RenderReport) -> RenderResult<Scanner> {
        report.rescans += 1;
        self.check_budget(report)?;
        for handler in self.handlers.iter_mut() {
            handler.rescan();
        }
        for listener in self.listeners.iter_mut() {
            listener.rescan();
        }
        Ok(Scanner::new(root))
    }

    fn count_restart(&self, report: &mut RenderReport) -> RenderResult<()> {
        report.restarts += 1;
        self.check_budget(report)
    }

    fn check_budget(&self, report: &RenderReport) -> RenderResult<()> {
        if report.restarts + report.rescans > self.config.max_rescans {
            return Err(RenderError::RescanLimit {
                limit: self.config.max_rescans,
            });
        }
        Ok(())
    }
}
