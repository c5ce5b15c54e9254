//! # Stencil Text
//!
//! Reference document format for the stencil engine: a plain-text tree of
//! paragraphs, spans and frames, with `${Key name:value}` placeholders.
//!
//! ```text
//! "Dear ${Value *value:name},"   ──parse──►  Paragraph[ Text, Placeholder, Text ]
//! ```
//!
//! Used by the CLI and by the engine's integration tests.

pub mod codec;
pub mod document;
pub mod error;
pub mod lexer;

#[cfg(test)]
mod tests_codec;

pub use codec::{parse_placeholder, split_segments, write_placeholder, Segment};
pub use document::{TextDocument, TextNode};
pub use error::{CodecError, CodecResult};
