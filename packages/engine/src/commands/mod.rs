//! Built-in command set.
//!
//! | Key                     | Handler               |
//! |-------------------------|-----------------------|
//! | `Push` / `Pop`          | [`PushCommand`], [`PopCommand`] |
//! | `Model`                 | [`ModelCommand`]      |
//! | `Value`                 | [`ValueCommand`]      |
//! | `If` / `Else` / `EndIf` | [`IfCommand`]         |
//! | `For` / `EndFor`        | [`ForCommand`]        |
//! | `Alias`                 | [`AliasCommand`]      |
//! | `DropBlock`             | [`DropBlockCommand`]  |
//! | `Stop`                  | [`StopCommand`]       |
//!
//! Closing keys reached by the scanner on their own have lost their opener
//! and are reported by [`StrayCloserCommand`].

mod alias;
mod condition;
mod drop_block;
mod model;
mod repeat;
mod stop;
mod value;
mod variables;

pub use alias::{AliasCommand, ALIAS_DEFINE_EVENT};
pub use condition::IfCommand;
pub use drop_block::DropBlockCommand;
pub use model::ModelCommand;
pub use repeat::ForCommand;
pub use stop::StopCommand;
pub use value::ValueCommand;
pub use variables::{PopCommand, PushCommand};

use crate::config::MissingDataPolicy;
use crate::engine::Engine;
use crate::error::{RenderError, RenderResult};
use crate::handler::{CommandHandler, EngineListener, ExecContext, Selection};
use crate::outcome::Outcome;
use crate::tree::TemplateDocument;

pub fn register_core<D: TemplateDocument + ?Sized>(engine: &mut Engine<D>) {
    engine
        .register(Box::new(PushCommand))
        .register(Box::new(PopCommand))
        .register(Box::new(ModelCommand))
        .register(Box::new(ValueCommand))
        .register(Box::new(IfCommand))
        .register(Box::new(ForCommand))
        .register(Box::new(AliasCommand::default()))
        .register(Box::new(DropBlockCommand::default()))
        .register(Box::new(StopCommand))
        .register(Box::new(StrayCloserCommand));
}

/// Policy for a block whose data is missing: the `onMissing` attribute
/// wins over the session default
pub(crate) fn missing_policy<D: TemplateDocument + ?Sized>(
    selection: &Selection,
    cx: &ExecContext<'_, D>,
) -> RenderResult<MissingDataPolicy> {
    match cx.optional_literal(selection, "onMissing")? {
        None => Ok(cx.config.missing_data),
        Some(value) => MissingDataPolicy::parse(&value).ok_or_else(|| {
            RenderError::invalid(
                selection.key(),
                "onMissing",
                selection.node,
                format!("expected delete, keep or marker, found '{}'", value),
            )
        }),
    }
}

#[derive(Debug, Default)]
pub struct StrayCloserCommand;

impl<D: TemplateDocument + ?Sized> EngineListener<D> for StrayCloserCommand {}

impl<D: TemplateDocument + ?Sized> CommandHandler<D> for StrayCloserCommand {
    fn name(&self) -> &str {
        "stray-closer"
    }

    fn matches(&self, key: &str) -> bool {
        matches!(key, "Else" | "EndIf" | "EndFor")
    }

    fn try_execute(&mut self, selection: &Selection, _cx: &mut ExecContext<'_, D>) -> RenderResult<Outcome> {
        Err(RenderError::structure(
            selection.key(),
            selection.node,
            "no matching opening placeholder",
        ))
    }
}
