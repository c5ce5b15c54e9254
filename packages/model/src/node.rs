//! # Data nodes
//!
//! The value tree handed to templates. A [`DataNode`] is a cheap handle
//! (reference counted) onto either
//!
//! - an **owned** node: a leaf scalar, a list or an insertion-ordered map,
//!   built by handlers or converted from JSON, or
//! - a **projected** node: a live view over a host object (through a
//!   [`PropertyResolver`]) or over a path inside another node. Projected nodes
//!   forward every read to their source when called and never cache.
//!
//! ## Ownership
//!
//! An owned node has at most one parent. Attaching it somewhere else detaches
//! it from the previous parent first, and attaching a node underneath itself
//! is rejected with [`ModelError::CycleDetected`]. The parent link is weak
//! and only used for lookup.

use crate::error::{ModelError, ModelResult};
use crate::path::PathExpr;
use crate::resolver::PropertyResolver;
use indexmap::IndexMap;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Serialize, Serializer};
use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataKind {
    Leaf,
    List,
    Map,
}

/// Scalar payload of a leaf node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Scalar {
    pub fn is_null(&self) -> bool {
        matches!(self, Scalar::Null)
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Scalar::Null => false,
            Scalar::Bool(b) => *b,
            Scalar::Int(n) => *n != 0,
            Scalar::Float(n) => *n != 0.0,
            Scalar::Str(s) => !s.is_empty(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Scalar::Int(n) => Some(*n),
            _ => None,
        }
    }

    fn to_json(&self) -> serde_json::Value {
        match self {
            Scalar::Null => serde_json::Value::Null,
            Scalar::Bool(b) => serde_json::Value::Bool(*b),
            Scalar::Int(n) => serde_json::Value::from(*n),
            Scalar::Float(n) => serde_json::Number::from_f64(*n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Scalar::Str(s) => serde_json::Value::String(s.clone()),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => Ok(()),
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Int(n) => write!(f, "{}", n),
            Scalar::Float(n) => write!(f, "{}", n),
            Scalar::Str(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::Str(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::Str(s)
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Scalar::Bool(b)
    }
}

impl From<i64> for Scalar {
    fn from(n: i64) -> Self {
        Scalar::Int(n)
    }
}

impl From<usize> for Scalar {
    fn from(n: usize) -> Self {
        Scalar::Int(n as i64)
    }
}

impl From<f64> for Scalar {
    fn from(n: f64) -> Self {
        Scalar::Float(n)
    }
}

/// Handle onto an owned or projected value
#[derive(Clone)]
pub struct DataNode {
    inner: Rc<NodeInner>,
}

enum NodeInner {
    Owned(RefCell<OwnedNode>),
    Projected(Projection),
}

struct OwnedNode {
    content: Content,
    parent: Weak<NodeInner>,
}

enum Content {
    Leaf(Scalar),
    List(Vec<DataNode>),
    Map(IndexMap<String, DataNode>),
}

enum Projection {
    Host {
        object: Rc<dyn Any>,
        resolver: Rc<dyn PropertyResolver>,
    },
    Indirect {
        source: DataNode,
        path: PathExpr,
    },
}

impl DataNode {
    fn owned(content: Content) -> Self {
        Self {
            inner: Rc::new(NodeInner::Owned(RefCell::new(OwnedNode {
                content,
                parent: Weak::new(),
            }))),
        }
    }

    fn projected(projection: Projection) -> Self {
        Self {
            inner: Rc::new(NodeInner::Projected(projection)),
        }
    }

    pub fn null() -> Self {
        Self::owned(Content::Leaf(Scalar::Null))
    }

    pub fn leaf(value: impl Into<Scalar>) -> Self {
        Self::owned(Content::Leaf(value.into()))
    }

    pub fn new_list() -> Self {
        Self::owned(Content::List(Vec::new()))
    }

    pub fn new_map() -> Self {
        Self::owned(Content::Map(IndexMap::new()))
    }

    /// Build an owned list, taking ownership of every item
    pub fn list_from(items: impl IntoIterator<Item = DataNode>) -> Self {
        let list = Self::new_list();
        for item in items {
            list.claim(&item);
            if let NodeInner::Owned(cell) = &*list.inner {
                if let Content::List(entries) = &mut cell.borrow_mut().content {
                    entries.push(item);
                }
            }
        }
        list
    }

    /// Build an owned map, taking ownership of every value
    pub fn map_from<K: Into<String>>(entries: impl IntoIterator<Item = (K, DataNode)>) -> Self {
        let map = Self::new_map();
        for (key, value) in entries {
            map.claim(&value);
            if let NodeInner::Owned(cell) = &*map.inner {
                if let Content::Map(items) = &mut cell.borrow_mut().content {
                    items.insert(key.into(), value);
                }
            }
        }
        map
    }

    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::null(),
            serde_json::Value::Bool(b) => Self::leaf(*b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Self::leaf(i),
                None => Self::leaf(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Self::leaf(s.as_str()),
            serde_json::Value::Array(items) => Self::list_from(items.iter().map(Self::from_json)),
            serde_json::Value::Object(entries) => Self::map_from(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), Self::from_json(v))),
            ),
        }
    }

    /// Project a host object through `resolver`
    pub fn project(object: Rc<dyn Any>, resolver: Rc<dyn PropertyResolver>) -> Self {
        Self::projected(Projection::Host { object, resolver })
    }

    /// A live view of whatever `path` addresses inside `source`
    pub fn indirect(source: DataNode, path: PathExpr) -> Self {
        Self::projected(Projection::Indirect { source, path })
    }

    pub fn is_projected(&self) -> bool {
        matches!(&*self.inner, NodeInner::Projected(_))
    }

    pub fn ptr_eq(&self, other: &DataNode) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    fn indirect_target(source: &DataNode, path: &PathExpr) -> Option<DataNode> {
        path.resolve(source)
    }

    /// A live view whose target no longer exists
    pub fn is_dangling(&self) -> bool {
        match &*self.inner {
            NodeInner::Projected(Projection::Indirect { source, path }) => {
                Self::indirect_target(source, path).map_or(true, |target| target.is_dangling())
            }
            _ => false,
        }
    }

    pub fn kind(&self) -> DataKind {
        match &*self.inner {
            NodeInner::Owned(cell) => match &cell.borrow().content {
                Content::Leaf(_) => DataKind::Leaf,
                Content::List(_) => DataKind::List,
                Content::Map(_) => DataKind::Map,
            },
            NodeInner::Projected(Projection::Host { object, resolver }) => {
                resolver.kind(object.as_ref())
            }
            NodeInner::Projected(Projection::Indirect { source, path }) => {
                Self::indirect_target(source, path)
                    .map(|target| target.kind())
                    .unwrap_or(DataKind::Leaf)
            }
        }
    }

    pub fn is_null(&self) -> bool {
        self.kind() == DataKind::Leaf && self.scalar().map_or(true, |s| s.is_null())
    }

    /// Number of elements of a list or entries of a map; zero for leaves
    pub fn size(&self) -> usize {
        match &*self.inner {
            NodeInner::Owned(cell) => match &cell.borrow().content {
                Content::Leaf(_) => 0,
                Content::List(items) => items.len(),
                Content::Map(entries) => entries.len(),
            },
            NodeInner::Projected(Projection::Host { object, resolver }) => {
                resolver.len(object.as_ref())
            }
            NodeInner::Projected(Projection::Indirect { source, path }) => {
                Self::indirect_target(source, path).map_or(0, |target| target.size())
            }
        }
    }

    /// Property-by-name lookup on maps
    pub fn property(&self, name: &str) -> Option<DataNode> {
        match &*self.inner {
            NodeInner::Owned(cell) => match &cell.borrow().content {
                Content::Map(entries) => entries.get(name).cloned(),
                _ => None,
            },
            NodeInner::Projected(Projection::Host { object, resolver }) => {
                resolver.property(object.as_ref(), name)
            }
            NodeInner::Projected(Projection::Indirect { source, path }) => {
                Self::indirect_target(source, path)?.property(name)
            }
        }
    }

    /// Property-by-index lookup: list elements, or map values in insertion order
    pub fn element(&self, index: usize) -> Option<DataNode> {
        match &*self.inner {
            NodeInner::Owned(cell) => match &cell.borrow().content {
                Content::Leaf(_) => None,
                Content::List(items) => items.get(index).cloned(),
                Content::Map(entries) => entries.get_index(index).map(|(_, v)| v.clone()),
            },
            NodeInner::Projected(Projection::Host { object, resolver }) => {
                resolver.element(object.as_ref(), index)
            }
            NodeInner::Projected(Projection::Indirect { source, path }) => {
                Self::indirect_target(source, path)?.element(index)
            }
        }
    }

    pub fn scalar(&self) -> Option<Scalar> {
        match &*self.inner {
            NodeInner::Owned(cell) => match &cell.borrow().content {
                Content::Leaf(scalar) => Some(scalar.clone()),
                _ => None,
            },
            NodeInner::Projected(Projection::Host { object, resolver }) => {
                resolver.scalar(object.as_ref())
            }
            NodeInner::Projected(Projection::Indirect { source, path }) => {
                Self::indirect_target(source, path)?.scalar()
            }
        }
    }

    pub fn keys(&self) -> Vec<String> {
        match &*self.inner {
            NodeInner::Owned(cell) => match &cell.borrow().content {
                Content::Map(entries) => entries.keys().cloned().collect(),
                _ => Vec::new(),
            },
            NodeInner::Projected(Projection::Host { object, resolver }) => {
                resolver.names(object.as_ref())
            }
            NodeInner::Projected(Projection::Indirect { source, path }) => {
                Self::indirect_target(source, path).map_or_else(Vec::new, |t| t.keys())
            }
        }
    }

    /// List elements or map values, in order
    pub fn elements(&self) -> Vec<DataNode> {
        (0..self.size()).filter_map(|i| self.element(i)).collect()
    }

    pub fn parent(&self) -> Option<DataNode> {
        match &*self.inner {
            NodeInner::Owned(cell) => cell
                .borrow()
                .parent
                .upgrade()
                .map(|inner| DataNode { inner }),
            NodeInner::Projected(_) => None,
        }
    }

    /// Text form of a leaf. `None` for lists and maps.
    pub fn render_text(&self) -> Option<String> {
        match self.kind() {
            DataKind::Leaf => Some(self.scalar().unwrap_or(Scalar::Null).to_string()),
            DataKind::List | DataKind::Map => None,
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self.kind() {
            DataKind::Leaf => self.scalar().map_or(false, |s| s.is_truthy()),
            DataKind::List | DataKind::Map => self.size() > 0,
        }
    }

    /// Append `child` to an owned list, detaching it from its previous parent
    pub fn push(&self, child: DataNode) -> ModelResult<()> {
        self.check_cycle(&child)?;
        let NodeInner::Owned(cell) = &*self.inner else {
            return Err(ModelError::not_a_list("<projected>"));
        };
        if !matches!(cell.borrow().content, Content::List(_)) {
            return Err(ModelError::not_a_list("<node>"));
        }
        self.claim(&child);
        if let Content::List(items) = &mut cell.borrow_mut().content {
            items.push(child);
        }
        Ok(())
    }

    /// Insert `child` into an owned map, returning the value it replaced
    pub fn insert(&self, name: impl Into<String>, child: DataNode) -> ModelResult<Option<DataNode>> {
        self.check_cycle(&child)?;
        let NodeInner::Owned(cell) = &*self.inner else {
            return Err(ModelError::not_a_map("<projected>"));
        };
        if !matches!(cell.borrow().content, Content::Map(_)) {
            return Err(ModelError::not_a_map("<node>"));
        }
        self.claim(&child);
        let replaced = match &mut cell.borrow_mut().content {
            Content::Map(entries) => entries.insert(name.into(), child),
            _ => None,
        };
        if let Some(old) = &replaced {
            old.clear_parent();
        }
        Ok(replaced)
    }

    /// Remove a map entry, releasing the removed node
    pub fn remove(&self, name: &str) -> Option<DataNode> {
        let NodeInner::Owned(cell) = &*self.inner else {
            return None;
        };
        let removed = match &mut cell.borrow_mut().content {
            Content::Map(entries) => entries.shift_remove(name),
            _ => None,
        };
        if let Some(node) = &removed {
            node.clear_parent();
        }
        removed
    }

    /// Replace the scalar of an owned leaf
    pub fn set_scalar(&self, value: impl Into<Scalar>) -> ModelResult<()> {
        let NodeInner::Owned(cell) = &*self.inner else {
            return Err(ModelError::invalid_path("<projected>", "projected nodes are read-only"));
        };
        match &mut cell.borrow_mut().content {
            Content::Leaf(scalar) => {
                *scalar = value.into();
                Ok(())
            }
            _ => Err(ModelError::invalid_path("<node>", "not a leaf")),
        }
    }

    /// Detach this node from its parent, if any
    pub fn detach(&self) {
        let NodeInner::Owned(cell) = &*self.inner else {
            return;
        };
        let parent = cell.borrow().parent.upgrade();
        if let Some(parent) = parent {
            if let NodeInner::Owned(parent_cell) = &*parent {
                match &mut parent_cell.borrow_mut().content {
                    Content::List(items) => {
                        items.retain(|item| !Rc::ptr_eq(&item.inner, &self.inner))
                    }
                    Content::Map(entries) => {
                        entries.retain(|_, item| !Rc::ptr_eq(&item.inner, &self.inner))
                    }
                    Content::Leaf(_) => {}
                }
            }
        }
        self.clear_parent();
    }

    /// Materialize this node (projected or owned) into a fresh owned tree
    pub fn deep_copy(&self) -> DataNode {
        match self.kind() {
            DataKind::Leaf => DataNode::leaf(self.scalar().unwrap_or(Scalar::Null)),
            DataKind::List => DataNode::list_from(self.elements().iter().map(|e| e.deep_copy())),
            DataKind::Map => DataNode::map_from(
                self.keys()
                    .into_iter()
                    .filter_map(|k| self.property(&k).map(|v| (k, v.deep_copy()))),
            ),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self.kind() {
            DataKind::Leaf => self.scalar().unwrap_or(Scalar::Null).to_json(),
            DataKind::List => {
                serde_json::Value::Array(self.elements().iter().map(|e| e.to_json()).collect())
            }
            DataKind::Map => {
                let mut object = serde_json::Map::new();
                for key in self.keys() {
                    if let Some(value) = self.property(&key) {
                        object.insert(key, value.to_json());
                    }
                }
                serde_json::Value::Object(object)
            }
        }
    }

    fn clear_parent(&self) {
        if let NodeInner::Owned(cell) = &*self.inner {
            cell.borrow_mut().parent = Weak::new();
        }
    }

    fn claim(&self, child: &DataNode) {
        child.detach();
        if let NodeInner::Owned(cell) = &*child.inner {
            cell.borrow_mut().parent = Rc::downgrade(&self.inner);
        }
    }

    fn check_cycle(&self, child: &DataNode) -> ModelResult<()> {
        let mut current = Some(self.clone());
        while let Some(node) = current {
            if node.ptr_eq(child) {
                return Err(ModelError::CycleDetected);
            }
            current = node.parent();
        }
        Ok(())
    }
}

impl Default for DataNode {
    fn default() -> Self {
        Self::null()
    }
}

impl PartialEq for DataNode {
    fn eq(&self, other: &Self) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        if self.kind() != other.kind() {
            return false;
        }
        match self.kind() {
            DataKind::Leaf => self.scalar() == other.scalar(),
            DataKind::List => self.elements() == other.elements(),
            DataKind::Map => {
                let keys = self.keys();
                keys == other.keys()
                    && keys
                        .iter()
                        .all(|k| self.property(k) == other.property(k))
            }
        }
    }
}

impl fmt::Debug for DataNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_projected() {
            write!(f, "DataNode::Projected({})", self.to_json())
        } else {
            write!(f, "DataNode({})", self.to_json())
        }
    }
}

impl Serialize for DataNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.kind() {
            DataKind::Leaf => self.scalar().unwrap_or(Scalar::Null).serialize(serializer),
            DataKind::List => {
                let elements = self.elements();
                let mut seq = serializer.serialize_seq(Some(elements.len()))?;
                for element in &elements {
                    seq.serialize_element(element)?;
                }
                seq.end()
            }
            DataKind::Map => {
                let keys = self.keys();
                let mut map = serializer.serialize_map(Some(keys.len()))?;
                for key in &keys {
                    if let Some(value) = self.property(key) {
                        map.serialize_entry(key, &value)?;
                    }
                }
                map.end()
            }
        }
    }
}

macro_rules! leaf_from {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for DataNode {
                fn from(value: $ty) -> Self {
                    DataNode::leaf(value)
                }
            }
        )*
    };
}

leaf_from!(&str, String, bool, i64, usize, f64, Scalar);
