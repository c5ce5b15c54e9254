//! # Stencil Model
//!
//! Values and addressing contexts shared by the template engine and its
//! command handlers.
//!
//! ## Overview
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ DataNode: Leaf | List | Map                  │
//! │  - owned (built by handlers, from JSON)      │
//! │  - projected (host object, indirection)      │
//! └──────────────────────────────────────────────┘
//!          ↑ addressed by PathExpr
//! ┌──────────────────────┐  ┌────────────────────┐
//! │ VariableStack (LIFO) │  │ ModelPath (cursor) │
//! └──────────────────────┘  └────────────────────┘
//! ```
//!
//! Placeholder attributes ([`PlaceholderData`]) say which of the two contexts
//! a value comes from through the sigil on the attribute name.

pub mod error;
pub mod model_path;
pub mod node;
pub mod path;
pub mod placeholder;
pub mod resolver;
pub mod variables;

#[cfg(test)]
mod tests_data_node;

pub use error::{ModelError, ModelResult};
pub use model_path::ModelPath;
pub use node::{DataKind, DataNode, Scalar};
pub use path::{PathExpr, PathSegment};
pub use placeholder::{AccessType, Attribute, PlaceholderData};
pub use resolver::{JsonResolver, JsonView, PropertyResolver};
pub use variables::VariableStack;
