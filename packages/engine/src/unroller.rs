//! # Loop unrolling
//!
//! A loop is expanded in place: the body between `For` and `EndFor` is cloned
//! once per element, and every clone is wrapped in synthesized placeholders
//! that establish the iteration's bindings when the scanner reaches them.
//!
//! ```text
//!   ${For $value:items as:item}B${EndFor}
//!
//!   ${Push name:item $value:"items[0]"}${Push name:index value:0}B${Pop name:index}${Pop name:item}
//!   ${Push name:item $value:"items[1]"}${Push name:index value:1}B${Pop name:index}${Pop name:item}
//! ```
//!
//! Bindings stay lazy: element values are read when the `Push` runs, not when
//! the loop is expanded.
//!
//! | source                 | bound to a variable | bound to a model prefix |
//! |------------------------|---------------------|-------------------------|
//! | literal list           | yes                 | no                      |
//! | `$` variable reference | yes                 | no                      |
//! | `*` / `@` model path   | yes                 | yes                     |
//!
//! A model-prefix loop moves the model cursor instead of pushing a variable.
//! The last iteration is followed by a `Model` placeholder that puts the
//! cursor back where the loop found it.

use crate::error::{RenderError, RenderResult};
use crate::handler::{ExecContext, Selection};
use crate::splitter::IsolatedArea;
use crate::tree::{NodeId, TemplateDocument};
use stencil_model::{AccessType, DataKind, DataNode, ModelPath, PathExpr, PlaceholderData};
use tracing::debug;

/// Where loop elements come from
#[derive(Debug, Clone, PartialEq)]
pub enum LoopSource {
    Literal(DataNode),
    /// A variable path, first segment naming the variable
    Variable(PathExpr),
    /// An absolute model path
    Model(PathExpr),
}

/// What each element is bound to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopTarget {
    Variable(String),
    ModelPrefix(String),
    /// No `as` attribute: only the index is bound
    Unnamed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoopBinding {
    pub source: LoopSource,
    pub target: LoopTarget,
    pub index_name: String,
}

impl LoopBinding {
    /// Classify a loop placeholder's `value`, `as` and `index` attributes and
    /// reject illegal source/target combinations. Does not touch the document.
    pub fn from_selection<D: TemplateDocument + ?Sized>(
        selection: &Selection,
        cx: &ExecContext<'_, D>,
    ) -> RenderResult<Self> {
        let key = selection.key();
        let node = selection.node;

        let source = match selection.data.attribute("value") {
            None => return Err(RenderError::missing(key, "value", node)),
            Some(attr) => match attr.access {
                AccessType::Literal => LoopSource::Literal(attr.value.clone()),
                AccessType::VariableByName => LoopSource::Variable(attribute_path(selection, "value")?),
                AccessType::VariableNameIndirect => LoopSource::Variable(
                    cx.ctx
                        .indirect_path(attr)
                        .map_err(|err| RenderError::from_model(err, key, "value", node))?,
                ),
                AccessType::ModelByName { .. } => LoopSource::Model(
                    cx.ctx
                        .model_target(attr)
                        .map_err(|err| RenderError::from_model(err, key, "value", node))?,
                ),
                AccessType::MissingAccess => return Err(RenderError::missing(key, "value", node)),
            },
        };

        let target = match selection.data.attribute("as") {
            None => LoopTarget::Unnamed,
            Some(attr) => {
                let name = attr
                    .value
                    .render_text()
                    .filter(|name| !name.is_empty())
                    .ok_or_else(|| RenderError::invalid(key, "as", node, "expected a name"))?;
                match attr.access {
                    AccessType::Literal => LoopTarget::Variable(name),
                    AccessType::ModelByName { .. } => LoopTarget::ModelPrefix(name),
                    access => return Err(RenderError::access_mode(key, "as", node, access)),
                }
            }
        };

        if let LoopTarget::ModelPrefix(prefix) = &target {
            match &source {
                LoopSource::Model(_) => {}
                LoopSource::Literal(_) => {
                    return Err(RenderError::loop_condition(
                        key,
                        node,
                        format!("a literal list cannot be bound to model prefix '{}'", prefix),
                    ))
                }
                LoopSource::Variable(path) => {
                    return Err(RenderError::loop_condition(
                        key,
                        node,
                        format!("variable '{}' cannot be bound to model prefix '{}'", path, prefix),
                    ))
                }
            }
        }

        let index_name = cx
            .optional_literal(selection, "index")?
            .unwrap_or_else(|| cx.config.default_index_name.clone());

        Ok(Self {
            source,
            target,
            index_name,
        })
    }

    /// Number of iterations. A source that resolves to nothing or to null
    /// has no elements; anything else that is not a list is an error.
    pub fn len<D: TemplateDocument + ?Sized>(
        &self,
        selection: &Selection,
        cx: &ExecContext<'_, D>,
    ) -> RenderResult<usize> {
        let resolved = match &self.source {
            LoopSource::Literal(list) => Some(list.clone()),
            LoopSource::Variable(path) => cx
                .ctx
                .variables()
                .resolve(path)
                .map_err(|err| RenderError::from_model(err, selection.key(), "value", selection.node))?,
            LoopSource::Model(path) => path.resolve(cx.ctx.model()),
        };
        match resolved {
            None => Ok(0),
            Some(value) if value.is_null() => Ok(0),
            Some(value) if value.kind() == DataKind::List => Ok(value.size()),
            Some(value) => Err(RenderError::invalid(
                selection.key(),
                "value",
                selection.node,
                format!("expected a list, found a {:?}", value.kind()),
            )),
        }
    }

    /// Placeholders opening iteration `index`
    fn opening(&self, index: usize, cursor: &ModelPath) -> Vec<PlaceholderData> {
        let mut opening = Vec::new();
        match &self.target {
            LoopTarget::Variable(name) => {
                let push = PlaceholderData::new("Push").with_literal("name", name.as_str());
                opening.push(match &self.source {
                    LoopSource::Literal(list) => {
                        push.with_literal("value", list.element(index).unwrap_or_default().deep_copy())
                    }
                    LoopSource::Variable(path) => push.with_variable("value", path.index(index).to_string()),
                    LoopSource::Model(path) => push.with_model("value", path.index(index).to_string()),
                });
            }
            LoopTarget::ModelPrefix(prefix) => {
                if let LoopSource::Model(path) = &self.source {
                    opening.push(
                        model_command(path.index(index), cursor).with_literal("prefix", prefix.as_str()),
                    );
                }
            }
            LoopTarget::Unnamed => {}
        }
        opening.push(
            PlaceholderData::new("Push")
                .with_literal("name", self.index_name.as_str())
                .with_literal("value", index),
        );
        opening
    }

    fn closing(&self) -> Vec<PlaceholderData> {
        let mut closing = vec![PlaceholderData::new("Pop").with_literal("name", self.index_name.as_str())];
        if let LoopTarget::Variable(name) = &self.target {
            closing.push(PlaceholderData::new("Pop").with_literal("name", name.as_str()));
        }
        closing
    }
}

/// A `Model` placeholder moving the cursor to `path` while keeping the
/// prefixes active in `cursor`
pub fn model_command(path: PathExpr, cursor: &ModelPath) -> PlaceholderData {
    let prefixes = DataNode::map_from(
        cursor
            .active_prefixes()
            .into_iter()
            .map(|(name, base)| (name, DataNode::leaf(base.to_string()))),
    );
    let data = PlaceholderData::new("Model").with_literal("path", path.into_absolute().to_string());
    if prefixes.size() > 0 {
        data.with_literal("prefixes", prefixes)
    } else {
        data
    }
}

/// Replace the loop area with `count` bracketed copies of its body and
/// return the first synthesized node. `count` must be at least one.
pub fn unroll<D: TemplateDocument + ?Sized>(
    doc: &mut D,
    area: &IsolatedArea,
    binding: &LoopBinding,
    count: usize,
    cursor: &ModelPath,
) -> Option<NodeId> {
    let body = area.body(doc);
    let anchor = area.end;
    let mut first = None;

    let mut place = |doc: &mut D, node: NodeId| {
        doc.insert_before(anchor, node);
        first.get_or_insert(node);
    };

    for index in 0..count {
        for data in binding.opening(index, cursor) {
            let node = doc.create(&data);
            place(doc, node);
        }
        for &original in &body {
            let copy = doc.clone_node(original, true);
            place(doc, copy);
        }
        for data in binding.closing() {
            let node = doc.create(&data);
            place(doc, node);
        }
    }

    if matches!(binding.target, LoopTarget::ModelPrefix(_)) && count > 0 {
        let flat = cursor.flatten();
        let restore = model_command(flat.resolve(), &flat);
        let node = doc.create(&restore);
        place(doc, node);
    }

    debug!(count, body = body.len(), "loop unrolled");
    for node in body {
        doc.delete(node);
    }
    doc.delete(area.begin);
    doc.delete(area.end);
    first
}

fn attribute_path(selection: &Selection, name: &str) -> RenderResult<PathExpr> {
    let text = selection
        .data
        .text(name)
        .ok_or_else(|| RenderError::invalid(selection.key(), name, selection.node, "expected a path"))?;
    PathExpr::parse(&text)
        .map_err(|err| RenderError::from_model(err, selection.key(), name, selection.node))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(src: &str) -> PathExpr {
        PathExpr::parse(src).unwrap()
    }

    #[test]
    fn test_model_command_carries_active_prefixes() {
        let cursor = ModelPath::absolute(path("/customers[0]")).with_prefix("c");
        let data = model_command(path("/customers[0].orders[1]"), &cursor);

        assert_eq!(data.text("path").as_deref(), Some("/customers[0].orders[1]"));
        let prefixes = &data.attribute("prefixes").unwrap().value;
        assert_eq!(prefixes.keys(), vec!["c"]);
        assert_eq!(
            prefixes.property("c").unwrap().render_text().as_deref(),
            Some("/customers[0]")
        );
    }

    #[test]
    fn test_model_command_without_prefixes() {
        let data = model_command(path("items[2]"), &ModelPath::absolute(PathExpr::root()));
        assert_eq!(data.text("path").as_deref(), Some("/items[2]"));
        assert!(data.attribute("prefixes").is_none());
    }
}
