//! Matching begin/end placeholder pairs.

use crate::error::{RenderError, RenderResult};
use crate::handler::Selection;
use crate::scanner::Scanner;
use crate::tree::{NodeId, TemplateDocument};

/// A begin placeholder, its matching end, and the separators found between
/// them at the same nesting level (e.g. `Else`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Area {
    pub begin: NodeId,
    pub end: NodeId,
    pub separators: Vec<NodeId>,
}

/// Find the end matching `begin` by scanning ahead from `lookahead`.
///
/// Nested occurrences of `begin`'s key open a new level; only an end key at
/// level zero closes the area. Placeholders that do not parse are skipped,
/// the dispatcher reports them when it gets there. Nothing is mutated, so a
/// failure leaves the document as it was.
pub fn find_area<D: TemplateDocument + ?Sized>(
    doc: &D,
    lookahead: Scanner,
    begin: &Selection,
    end_key: &str,
    separator_keys: &[&str],
) -> RenderResult<Area> {
    let begin_key = begin.key();
    let mut depth = 0usize;
    let mut separators = Vec::new();

    for node in lookahead.iter(doc) {
        let Some(key) = doc.key(node) else {
            continue;
        };
        if key == begin_key {
            depth += 1;
        } else if key == end_key {
            if depth == 0 {
                return Ok(Area {
                    begin: begin.node,
                    end: node,
                    separators,
                });
            }
            depth -= 1;
        } else if depth == 0 && separator_keys.contains(&key.as_str()) {
            separators.push(node);
        }
    }

    Err(RenderError::structure(
        begin_key,
        begin.node,
        format!("no matching {}", end_key),
    ))
}
