//! Engine lifecycle, handler registry and session policies

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::json;
use stencil_engine::commands::{register_core, ALIAS_DEFINE_EVENT};
use stencil_engine::{
    CommandHandler, CustomEvent, Engine, EngineListener, ErrorKind, ExecContext, Outcome,
    RenderConfig, RenderContext, RenderError, RenderResult, Selection, UnknownCommandPolicy,
};
use stencil_model::DataNode;
use stencil_text::TextDocument;

type Log = Rc<RefCell<Vec<String>>>;

struct Recorder {
    log: Log,
}

impl EngineListener<TextDocument> for Recorder {
    fn init(&mut self, _doc: &mut TextDocument, _ctx: &mut RenderContext) -> RenderResult<()> {
        self.log.borrow_mut().push("init".to_string());
        Ok(())
    }

    fn eod_reached(&mut self, doc: &mut TextDocument, _ctx: &mut RenderContext) -> RenderResult<()> {
        self.log.borrow_mut().push(format!("eod {}", doc.render()));
        Ok(())
    }

    fn rescan(&mut self) {
        self.log.borrow_mut().push("rescan".to_string());
    }

    fn on_custom_event(
        &mut self,
        event: &CustomEvent,
        _doc: &mut TextDocument,
        _ctx: &mut RenderContext,
    ) -> RenderResult<Outcome> {
        self.log.borrow_mut().push(format!("event {}", event.name));
        Ok(Outcome::Ignored)
    }
}

/// Claims `Value` only when it carries a `loud` attribute
struct Shout;

impl EngineListener<TextDocument> for Shout {}

impl CommandHandler<TextDocument> for Shout {
    fn name(&self) -> &str {
        "shout"
    }

    fn matches(&self, key: &str) -> bool {
        key == "Value"
    }

    fn try_execute(
        &mut self,
        selection: &Selection,
        cx: &mut ExecContext<'_, TextDocument>,
    ) -> RenderResult<Outcome> {
        if selection.data.attribute("loud").is_none() {
            return Ok(Outcome::Ignored);
        }
        let text = cx
            .resolve(selection, "value")?
            .and_then(|value| value.render_text())
            .unwrap_or_default();
        cx.replace_with_text(selection.node, &text.to_uppercase());
        Ok(Outcome::Proceed)
    }
}

/// Never makes progress
struct Again;

impl EngineListener<TextDocument> for Again {}

impl CommandHandler<TextDocument> for Again {
    fn name(&self) -> &str {
        "again"
    }

    fn matches(&self, key: &str) -> bool {
        key == "Again"
    }

    fn try_execute(
        &mut self,
        _selection: &Selection,
        _cx: &mut ExecContext<'_, TextDocument>,
    ) -> RenderResult<Outcome> {
        Ok(Outcome::FullRescan)
    }
}

fn core_engine(config: RenderConfig) -> Engine<TextDocument> {
    Engine::with_core_commands(config)
}

#[test]
fn test_core_handler_order() {
    let engine = core_engine(RenderConfig::default());
    assert_eq!(
        engine.handler_names(),
        vec![
            "push",
            "pop",
            "model",
            "value",
            "if",
            "for",
            "alias",
            "drop-block",
            "stop",
            "stray-closer"
        ]
    );
}

#[test]
fn test_listener_lifecycle() {
    let log = Log::default();
    let mut engine = core_engine(RenderConfig::default());
    engine.add_listener(Box::new(Recorder { log: log.clone() }));

    let mut doc = TextDocument::parse("${Alias key:Sig text:bye}x${If cond:false}y${EndIf}");
    let report = engine.render(&mut doc, DataNode::null()).unwrap();

    assert_eq!(
        *log.borrow(),
        vec![
            "init".to_string(),
            format!("event {}", ALIAS_DEFINE_EVENT),
            "rescan".to_string(),
            "eod x".to_string(),
        ]
    );
    assert_eq!(report.commands, 2);
    assert_eq!(report.rescans, 1);
}

#[test]
fn test_alias_defines_new_command() {
    let mut doc = TextDocument::parse("${Sig}\n${Alias key:Sig *text:sender}\nBye.\n${Sig}");
    let mut engine = core_engine(RenderConfig::default());
    let report = engine
        .render(&mut doc, DataNode::from_json(&json!({ "sender": "Ada" })))
        .unwrap();

    assert_eq!(doc.render(), "${Sig}\n\nBye.\nAda");
    assert_eq!(report.unknown, 1);
}

#[test]
fn test_alias_cannot_shadow_itself() {
    let mut doc = TextDocument::parse("${Alias key:Alias text:x}");
    let err = core_engine(RenderConfig::default())
        .render(&mut doc, DataNode::null())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidValue);
}

#[test]
fn test_drop_block_removes_paragraph_at_end() {
    let mut doc = TextDocument::parse("keep\ndrop ${Value value:me} ${DropBlock}\nalso");
    core_engine(RenderConfig::default())
        .render(&mut doc, DataNode::null())
        .unwrap();
    assert_eq!(doc.render(), "keep\nalso");
}

#[test]
fn test_stop_ends_the_scan() {
    let mut doc = TextDocument::parse("${Value value:a}${Stop}${Value value:b}");
    core_engine(RenderConfig::default())
        .render(&mut doc, DataNode::null())
        .unwrap();
    assert_eq!(doc.render(), "a${Value value:b}");
}

#[test]
fn test_unknown_command_policies() {
    let src = "x ${Mystery} y";

    let mut doc = TextDocument::parse(src);
    let report = core_engine(RenderConfig::default())
        .render(&mut doc, DataNode::null())
        .unwrap();
    assert_eq!(doc.render(), src);
    assert_eq!(report.unknown, 1);

    let mut doc = TextDocument::parse(src);
    let remove = RenderConfig {
        unknown_command: UnknownCommandPolicy::Remove,
        ..RenderConfig::default()
    };
    core_engine(remove).render(&mut doc, DataNode::null()).unwrap();
    assert_eq!(doc.render(), "x  y");

    let mut doc = TextDocument::parse(src);
    let strict = RenderConfig {
        unknown_command: UnknownCommandPolicy::Error,
        ..RenderConfig::default()
    };
    let err = core_engine(strict).render(&mut doc, DataNode::null()).unwrap_err();
    assert!(matches!(err, RenderError::UnknownCommand { ref key, .. } if key == "Mystery"));
}

#[test]
fn test_unparsable_placeholder_is_a_syntax_error() {
    let mut doc = TextDocument::parse("${Value value:}");
    let err = core_engine(RenderConfig::default())
        .render(&mut doc, DataNode::null())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Syntax);
    assert!(matches!(err, RenderError::Syntax { ref source, .. } if source.offset == Some(14)));
}

#[test]
fn test_ignored_outcome_falls_through_to_next_handler() {
    let mut engine: Engine<TextDocument> = Engine::new(RenderConfig::default());
    engine.register(Box::new(Shout));
    register_core(&mut engine);

    let mut doc = TextDocument::parse("${Value value:hi loud:true} ${Value value:there}");
    engine.render(&mut doc, DataNode::null()).unwrap();
    assert_eq!(doc.render(), "HI there");
}

#[test]
fn test_rescan_budget() {
    let mut engine = core_engine(RenderConfig {
        max_rescans: 3,
        ..RenderConfig::default()
    });
    engine.register(Box::new(Again));

    let mut doc = TextDocument::parse("${Again}");
    let err = engine.render(&mut doc, DataNode::null()).unwrap_err();
    assert_eq!(err, RenderError::RescanLimit { limit: 3 });
}

#[test]
fn test_render_with_existing_context() {
    let mut ctx = RenderContext::new(DataNode::null());
    ctx.variables_mut().push("who", DataNode::leaf("Ada"));

    let mut doc = TextDocument::parse("Hi ${Value $value:who}${Push name:tmp value:1}");
    core_engine(RenderConfig::default())
        .render_with(&mut doc, &mut ctx)
        .unwrap();

    assert_eq!(doc.render(), "Hi Ada");
    assert!(ctx.variables().is_bound("who"));
    assert!(ctx.variables().is_bound("tmp"));
}

#[test]
fn test_report_counts_expanded_commands() {
    let mut doc = TextDocument::parse("${For value:[1, 2] as:n}${Value $value:n}${EndFor}");
    let report = core_engine(RenderConfig::default())
        .render(&mut doc, DataNode::null())
        .unwrap();

    // For + 2 x (Push n, Push index, Value, Pop index, Pop n)
    assert_eq!(report.commands, 11);
    assert_eq!(report.restarts, 1);
    assert_eq!(doc.render(), "12");
}
