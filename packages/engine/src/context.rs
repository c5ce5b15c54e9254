//! Data contexts of one render session: the variable stack and the model
//! cursor, plus the rules that turn an attribute into a value.

use stencil_model::{
    AccessType, Attribute, DataNode, ModelError, ModelPath, ModelResult, PathExpr, VariableStack,
};

#[derive(Debug, Clone, Default)]
pub struct RenderContext {
    variables: VariableStack,
    model_path: ModelPath,
    model: DataNode,
}

impl RenderContext {
    pub fn new(model: DataNode) -> Self {
        Self {
            variables: VariableStack::new(),
            model_path: ModelPath::default(),
            model,
        }
    }

    pub fn model(&self) -> &DataNode {
        &self.model
    }

    pub fn model_path(&self) -> &ModelPath {
        &self.model_path
    }

    pub fn set_model_path(&mut self, path: ModelPath) {
        self.model_path = path;
    }

    pub fn variables(&self) -> &VariableStack {
        &self.variables
    }

    pub fn variables_mut(&mut self) -> &mut VariableStack {
        &mut self.variables
    }

    /// Absolute model path addressed by a `*` or `@` attribute
    pub fn model_target(&self, attr: &Attribute) -> ModelResult<PathExpr> {
        let expr = attribute_path(attr)?;
        match attr.access {
            AccessType::ModelByName { prefixed: false } => Ok(self.model_path.interpret(&expr)),
            AccessType::ModelByName { prefixed: true } => self.model_path.interpret_prefixed(&expr),
            _ => Err(ModelError::invalid_path(
                expr.to_string(),
                "not a model reference",
            )),
        }
    }

    /// The variable path a `&` attribute points at. The attribute names a
    /// variable whose value is itself a variable path.
    pub fn indirect_path(&self, attr: &Attribute) -> ModelResult<PathExpr> {
        let holder_name = attribute_text(attr)?;
        let holder = self
            .variables
            .lookup(&holder_name)
            .ok_or_else(|| ModelError::unbound_variable(holder_name.as_str()))?;
        let target = holder.render_text().ok_or_else(|| {
            ModelError::invalid_path(holder_name.as_str(), "variable does not hold a path")
        })?;
        PathExpr::parse(&target)
    }

    /// Current value of an attribute. `Ok(None)` when the reference leads
    /// nowhere or the attribute is absent.
    pub fn resolve(&self, attr: &Attribute) -> ModelResult<Option<DataNode>> {
        let value = match attr.access {
            AccessType::Literal => Some(attr.value.clone()),
            AccessType::VariableByName => self.variables.resolve(&attribute_path(attr)?)?,
            AccessType::ModelByName { .. } => self.model_target(attr)?.resolve(&self.model),
            AccessType::VariableNameIndirect => self.variables.resolve(&self.indirect_path(attr)?)?,
            AccessType::MissingAccess => None,
        };
        Ok(value.filter(|node| !node.is_dangling()))
    }

    /// A lazy view of an attribute's value, suitable for binding to a
    /// variable. Variable references capture the binding current right now
    /// and read through it later; model references read the model on access.
    pub fn project(&self, attr: &Attribute) -> ModelResult<DataNode> {
        match attr.access {
            AccessType::Literal => Ok(attr.value.deep_copy()),
            AccessType::VariableByName => {
                let expr = attribute_path(attr)?;
                let name = expr.first_name().ok_or_else(|| {
                    ModelError::invalid_path(expr.to_string(), "expected a variable name")
                })?;
                let binding = self
                    .variables
                    .lookup(name)
                    .ok_or_else(|| ModelError::unbound_variable(name))?;
                Ok(DataNode::indirect(binding, expr.tail()))
            }
            AccessType::ModelByName { .. } => {
                Ok(DataNode::indirect(self.model.clone(), self.model_target(attr)?))
            }
            AccessType::VariableNameIndirect => Ok(self.resolve(attr)?.unwrap_or_default()),
            AccessType::MissingAccess => Ok(DataNode::null()),
        }
    }
}

fn attribute_text(attr: &Attribute) -> ModelResult<String> {
    attr.value
        .render_text()
        .ok_or_else(|| ModelError::invalid_path(format!("{:?}", attr.value), "expected a path"))
}

fn attribute_path(attr: &Attribute) -> ModelResult<PathExpr> {
    PathExpr::parse(&attribute_text(attr)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn attr(raw: &str, value: &str) -> Attribute {
        let (access, _) = AccessType::from_raw_name(raw);
        Attribute {
            access,
            value: DataNode::leaf(value),
        }
    }

    fn context() -> RenderContext {
        RenderContext::new(DataNode::from_json(&json!({
            "customers": [{ "name": "Ada" }, { "name": "Grace" }],
            "title": "Report"
        })))
    }

    #[test]
    fn test_model_access_is_cursor_relative() {
        let mut ctx = context();
        assert_eq!(
            ctx.resolve(&attr("*value", "title")).unwrap(),
            Some(DataNode::leaf("Report"))
        );

        let cursor = ctx
            .model_path()
            .reposition(&PathExpr::parse("customers[1]").unwrap());
        ctx.set_model_path(cursor);
        assert_eq!(
            ctx.resolve(&attr("*value", "name")).unwrap(),
            Some(DataNode::leaf("Grace"))
        );
        assert_eq!(
            ctx.resolve(&attr("*value", "/title")).unwrap(),
            Some(DataNode::leaf("Report"))
        );
    }

    #[test]
    fn test_indirect_variable_access() {
        let mut ctx = context();
        ctx.variables_mut().push("target", DataNode::leaf("name"));
        ctx.variables_mut().push("holder", DataNode::leaf("target"));
        ctx.variables_mut().push("name", DataNode::leaf("Linus"));

        assert_eq!(
            ctx.resolve(&attr("&value", "holder")).unwrap(),
            Some(DataNode::leaf("name"))
        );
        assert_eq!(
            ctx.resolve(&attr("&value", "target")).unwrap(),
            Some(DataNode::leaf("Linus"))
        );
    }

    #[test]
    fn test_projection_follows_later_changes() {
        let mut ctx = context();
        let list = DataNode::list_from(vec![DataNode::leaf("a")]);
        ctx.variables_mut().push("items", list.clone());

        let view = ctx.project(&attr("$value", "items[0]")).unwrap();
        list.element(0).unwrap().set_scalar("b").unwrap();
        assert_eq!(view.render_text().as_deref(), Some("b"));

        let model_view = ctx.project(&attr("*value", "customers[0].name")).unwrap();
        assert_eq!(model_view.render_text().as_deref(), Some("Ada"));
    }

    #[test]
    fn test_unbound_and_unknown_prefix() {
        let ctx = context();
        assert_eq!(
            ctx.resolve(&attr("$value", "nope")).unwrap_err(),
            ModelError::unbound_variable("nope")
        );
        assert_eq!(
            ctx.resolve(&attr("@value", "c.name")).unwrap_err(),
            ModelError::unknown_prefix("c")
        );
        assert_eq!(ctx.resolve(&attr("*value", "missing")).unwrap(), None);
    }
}
