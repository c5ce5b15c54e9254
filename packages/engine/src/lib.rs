//! # Stencil Engine
//!
//! Renders a document template in place. The engine walks a format-neutral
//! node tree ([`TreeAdapter`]), hands every placeholder it meets to the first
//! [`CommandHandler`] that claims its key, and lets the handler rewrite the
//! tree around it.
//!
//! ## Pipeline
//!
//! ```text
//! template tree ──► Scanner ──► dispatch ──► handler
//!                     ▲                        │ Outcome
//!                     └── Proceed / RestartAt / FullRescan
//! ```
//!
//! Block commands (`If`, `For`) first resolve their [`Area`], lift the area
//! markers to sibling level with the [`splitter`], and then either delete
//! parts of the area or expand it. Loops are expanded into primitive
//! `Push`/`Pop`/`Model` placeholders that a later pass evaluates.
//!
//! ## Example
//!
//! ```ignore
//! let mut doc = TextDocument::parse("Hello ${Value *value:name}!");
//! let mut engine = Engine::with_core_commands(RenderConfig::default());
//! engine.render(&mut doc, DataNode::from_json(&json!({ "name": "Ada" })))?;
//! assert_eq!(doc.render(), "Hello Ada!");
//! ```

pub mod area;
pub mod commands;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod handler;
pub mod outcome;
pub mod region;
pub mod scanner;
pub mod splitter;
pub mod tree;
pub mod unroller;

pub use area::{find_area, Area};
pub use config::{ConfigError, MissingDataPolicy, RenderConfig, UnknownCommandPolicy, DEFAULT_CONFIG_NAME};
pub use context::RenderContext;
pub use engine::{Engine, RenderReport};
pub use error::{ErrorKind, RenderError, RenderResult, SyntaxError};
pub use handler::{CommandHandler, CustomEvent, EngineListener, ExecContext, Selection};
pub use outcome::Outcome;
pub use scanner::Scanner;
pub use splitter::{isolate_area, split, IsolatedArea, Split, SplitError};
pub use tree::{NodeId, NodeKind, PlaceholderProvider, TemplateDocument, TreeAdapter};
pub use unroller::{LoopBinding, LoopSource, LoopTarget};
