//! Parsed placeholder data: a command key plus sigil-typed attributes.

use crate::node::DataNode;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How an attribute value is to be read, selected by the attribute name's sigil
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccessType {
    /// No sigil: the value is used as written
    Literal,
    /// `$name`: the value is a variable path
    VariableByName,
    /// `*name` (cursor-relative) or `@name` (active-prefix-relative): the value is a model path
    ModelByName { prefixed: bool },
    /// `&name`: the value names a variable that holds another variable's path
    VariableNameIndirect,
    /// The attribute is not present
    MissingAccess,
}

impl AccessType {
    /// Split a raw attribute name into its access type and canonical name
    pub fn from_raw_name(raw: &str) -> (AccessType, &str) {
        let mut chars = raw.chars();
        match chars.next() {
            Some('$') => (AccessType::VariableByName, chars.as_str()),
            Some('*') => (AccessType::ModelByName { prefixed: false }, chars.as_str()),
            Some('@') => (AccessType::ModelByName { prefixed: true }, chars.as_str()),
            Some('&') => (AccessType::VariableNameIndirect, chars.as_str()),
            _ => (AccessType::Literal, raw),
        }
    }

    pub fn sigil(&self) -> &'static str {
        match self {
            AccessType::Literal | AccessType::MissingAccess => "",
            AccessType::VariableByName => "$",
            AccessType::ModelByName { prefixed: false } => "*",
            AccessType::ModelByName { prefixed: true } => "@",
            AccessType::VariableNameIndirect => "&",
        }
    }

    pub fn is_model(&self) -> bool {
        matches!(self, AccessType::ModelByName { .. })
    }
}

impl fmt::Display for AccessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AccessType::Literal => "literal",
            AccessType::VariableByName => "variable",
            AccessType::ModelByName { prefixed: false } => "model",
            AccessType::ModelByName { prefixed: true } => "prefixed model",
            AccessType::VariableNameIndirect => "indirect variable",
            AccessType::MissingAccess => "missing",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub access: AccessType,
    pub value: DataNode,
}

/// A placeholder's key and attributes, keyed by canonical (sigil-less) name
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlaceholderData {
    key: String,
    attributes: IndexMap<String, Attribute>,
}

impl PlaceholderData {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            attributes: IndexMap::new(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn set_key(&mut self, key: impl Into<String>) {
        self.key = key.into();
    }

    /// Insert an attribute by its raw (possibly sigil-prefixed) name
    pub fn insert_raw(&mut self, raw_name: &str, value: DataNode) {
        let (access, name) = AccessType::from_raw_name(raw_name);
        self.insert(name, access, value);
    }

    pub fn insert(&mut self, name: impl Into<String>, access: AccessType, value: DataNode) {
        self.attributes
            .insert(name.into(), Attribute { access, value });
    }

    pub fn with_literal(mut self, name: &str, value: impl Into<DataNode>) -> Self {
        self.insert(name, AccessType::Literal, value.into());
        self
    }

    pub fn with_variable(mut self, name: &str, path: impl Into<String>) -> Self {
        self.insert(name, AccessType::VariableByName, DataNode::leaf(path.into()));
        self
    }

    pub fn with_model(mut self, name: &str, path: impl Into<String>) -> Self {
        self.insert(
            name,
            AccessType::ModelByName { prefixed: false },
            DataNode::leaf(path.into()),
        );
        self
    }

    pub fn with_prefixed_model(mut self, name: &str, path: impl Into<String>) -> Self {
        self.insert(
            name,
            AccessType::ModelByName { prefixed: true },
            DataNode::leaf(path.into()),
        );
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    pub fn access(&self, name: &str) -> AccessType {
        self.attributes
            .get(name)
            .map_or(AccessType::MissingAccess, |attr| attr.access)
    }

    /// A literal attribute's text, e.g. a variable name in `as:"item"`
    pub fn literal_text(&self, name: &str) -> Option<String> {
        self.attributes
            .get(name)
            .filter(|attr| attr.access == AccessType::Literal)
            .and_then(|attr| attr.value.render_text())
    }

    /// Raw attribute text regardless of access type
    pub fn text(&self, name: &str) -> Option<String> {
        self.attributes
            .get(name)
            .and_then(|attr| attr.value.render_text())
    }

    pub fn remove(&mut self, name: &str) -> Option<Attribute> {
        self.attributes.shift_remove(name)
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &Attribute)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// The sigil-prefixed form of a stored attribute's name
    pub fn rename(&self, name: &str) -> Option<String> {
        self.attributes
            .get(name)
            .map(|attr| format!("{}{}", attr.access.sigil(), name))
    }
}
