use crate::error::{ModelError, ModelResult};
use crate::node::DataNode;
use crate::path::PathExpr;
use std::collections::HashMap;

/// Named LIFO bindings for one render session
///
/// Every name owns its own stack. `pop` is not checked against the value
/// that was pushed; keeping pushes and pops balanced is up to the caller.
#[derive(Debug, Default, Clone)]
pub struct VariableStack {
    bindings: HashMap<String, Vec<DataNode>>,
}

impl VariableStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, value: DataNode) {
        self.bindings.entry(name.into()).or_default().push(value);
    }

    /// Remove the top binding for `name`. `None` if nothing is bound.
    pub fn pop(&mut self, name: &str) -> Option<DataNode> {
        let stack = self.bindings.get_mut(name)?;
        let value = stack.pop();
        if stack.is_empty() {
            self.bindings.remove(name);
        }
        value
    }

    pub fn lookup(&self, name: &str) -> Option<DataNode> {
        self.bindings.get(name).and_then(|stack| stack.last()).cloned()
    }

    pub fn is_bound(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    /// Number of bindings currently stacked for `name`
    pub fn depth(&self, name: &str) -> usize {
        self.bindings.get(name).map_or(0, |stack| stack.len())
    }

    /// Resolve `expr` whose first segment names a variable
    pub fn resolve(&self, expr: &PathExpr) -> ModelResult<Option<DataNode>> {
        let name = expr
            .first_name()
            .ok_or_else(|| ModelError::invalid_path(expr.to_string(), "expected a variable name"))?;
        let value = self
            .lookup(name)
            .ok_or_else(|| ModelError::unbound_variable(name))?;
        Ok(expr.tail().resolve(&value).filter(|node| !node.is_dangling()))
    }

    pub fn resolve_str(&self, expr: &str) -> ModelResult<Option<DataNode>> {
        self.resolve(&PathExpr::parse(expr)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_pop_restores_previous_binding() {
        let mut vars = VariableStack::new();
        vars.push("x", DataNode::leaf(1i64));
        vars.push("x", DataNode::leaf(2i64));
        assert_eq!(vars.depth("x"), 2);

        vars.pop("x");
        assert_eq!(vars.lookup("x"), Some(DataNode::leaf(1i64)));

        vars.pop("x");
        assert_eq!(vars.lookup("x"), None);
        assert!(!vars.is_bound("x"));
    }

    #[test]
    fn test_pop_unbound_is_none() {
        let mut vars = VariableStack::new();
        assert!(vars.pop("missing").is_none());
    }

    #[test]
    fn test_names_are_independent() {
        let mut vars = VariableStack::new();
        vars.push("a", DataNode::leaf("first"));
        vars.push("b", DataNode::leaf("second"));
        vars.pop("b");
        assert_eq!(vars.lookup("a"), Some(DataNode::leaf("first")));
    }

    #[test]
    fn test_resolve_navigates_into_binding() {
        let mut vars = VariableStack::new();
        let items = DataNode::from_json(&serde_json::json!([{ "name": "one" }, { "name": "two" }]));
        vars.push("items", items);

        let name = vars.resolve_str("items[1].name").unwrap().unwrap();
        assert_eq!(name.render_text().as_deref(), Some("two"));

        assert!(vars.resolve_str("items[5]").unwrap().is_none());
        assert_eq!(
            vars.resolve_str("other").unwrap_err(),
            ModelError::unbound_variable("other")
        );
    }

    #[test]
    fn test_binding_to_absent_target_resolves_to_none() {
        let model = DataNode::new_map();
        let mut vars = VariableStack::new();
        vars.push("x", DataNode::indirect(model.clone(), PathExpr::parse("absent").unwrap()));
        assert!(vars.resolve_str("x").unwrap().is_none());

        model.insert("absent", DataNode::leaf("here")).unwrap();
        let value = vars.resolve_str("x").unwrap().unwrap();
        assert_eq!(value.render_text().as_deref(), Some("here"));
    }
}
