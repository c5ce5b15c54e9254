//! Host-object projection.
//!
//! A [`PropertyResolver`] lets a caller expose its own values to templates
//! without converting them up front. The projected [`DataNode`] keeps the
//! host object and asks the resolver on every read.

use crate::node::{DataKind, DataNode, Scalar};
use std::any::Any;
use std::rc::Rc;

/// Capability for looking up properties on opaque host values
pub trait PropertyResolver {
    /// Property by name. `None` when the value has no such property.
    fn property(&self, value: &dyn Any, name: &str) -> Option<DataNode>;

    fn kind(&self, _value: &dyn Any) -> DataKind {
        DataKind::Map
    }

    fn len(&self, _value: &dyn Any) -> usize {
        0
    }

    fn element(&self, _value: &dyn Any, _index: usize) -> Option<DataNode> {
        None
    }

    fn scalar(&self, _value: &dyn Any) -> Option<Scalar> {
        None
    }

    fn names(&self, _value: &dyn Any) -> Vec<String> {
        Vec::new()
    }
}

/// A position inside a shared JSON document, addressed by JSON pointer
#[derive(Debug, Clone)]
pub struct JsonView {
    root: Rc<serde_json::Value>,
    pointer: String,
}

impl JsonView {
    fn get(&self) -> Option<&serde_json::Value> {
        self.root.pointer(&self.pointer)
    }

    fn child(&self, token: &str) -> JsonView {
        let escaped = token.replace('~', "~0").replace('/', "~1");
        JsonView {
            root: Rc::clone(&self.root),
            pointer: format!("{}/{}", self.pointer, escaped),
        }
    }
}

/// Projects `serde_json::Value` documents lazily
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonResolver;

impl JsonResolver {
    /// Wrap a JSON document as a projected data node
    pub fn project(value: serde_json::Value) -> DataNode {
        Self::project_view(JsonView {
            root: Rc::new(value),
            pointer: String::new(),
        })
    }

    fn project_view(view: JsonView) -> DataNode {
        DataNode::project(Rc::new(view), Rc::new(JsonResolver))
    }

    fn view(value: &dyn Any) -> Option<&JsonView> {
        value.downcast_ref::<JsonView>()
    }
}

impl PropertyResolver for JsonResolver {
    fn property(&self, value: &dyn Any, name: &str) -> Option<DataNode> {
        let view = Self::view(value)?;
        let object = view.get()?.as_object()?;
        if object.contains_key(name) {
            Some(Self::project_view(view.child(name)))
        } else {
            None
        }
    }

    fn kind(&self, value: &dyn Any) -> DataKind {
        match Self::view(value).and_then(|v| v.get()) {
            Some(serde_json::Value::Object(_)) => DataKind::Map,
            Some(serde_json::Value::Array(_)) => DataKind::List,
            _ => DataKind::Leaf,
        }
    }

    fn len(&self, value: &dyn Any) -> usize {
        match Self::view(value).and_then(|v| v.get()) {
            Some(serde_json::Value::Object(object)) => object.len(),
            Some(serde_json::Value::Array(items)) => items.len(),
            _ => 0,
        }
    }

    fn element(&self, value: &dyn Any, index: usize) -> Option<DataNode> {
        let view = Self::view(value)?;
        match view.get()? {
            serde_json::Value::Array(items) if index < items.len() => {
                Some(Self::project_view(view.child(&index.to_string())))
            }
            serde_json::Value::Object(object) => {
                let (key, _) = object.iter().nth(index)?;
                Some(Self::project_view(view.child(key)))
            }
            _ => None,
        }
    }

    fn scalar(&self, value: &dyn Any) -> Option<Scalar> {
        match Self::view(value)?.get()? {
            serde_json::Value::Null => Some(Scalar::Null),
            serde_json::Value::Bool(b) => Some(Scalar::Bool(*b)),
            serde_json::Value::Number(n) => Some(match n.as_i64() {
                Some(i) => Scalar::Int(i),
                None => Scalar::Float(n.as_f64().unwrap_or(f64::NAN)),
            }),
            serde_json::Value::String(s) => Some(Scalar::Str(s.clone())),
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => None,
        }
    }

    fn names(&self, value: &dyn Any) -> Vec<String> {
        match Self::view(value).and_then(|v| v.get()) {
            Some(serde_json::Value::Object(object)) => object.keys().cloned().collect(),
            _ => Vec::new(),
        }
    }
}
