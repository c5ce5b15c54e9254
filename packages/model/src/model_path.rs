//! # Model path
//!
//! The cursor into the external data model. It is one of
//!
//! - `Absolute`: a plain absolute path,
//! - `Delta`: a relative path interpreted against a base cursor,
//! - `Prefixed`: a wrapper holding an **active prefix**. A lookup whose first
//!   segment equals the prefix resolves against the stored base path instead
//!   of the ambient cursor, which is how `@item.name` works inside loops.
//!
//! Prefix wrappers nest; the outermost one is consulted first. The cursor is
//! only stack-like by convention: nothing restores it automatically.

use crate::error::{ModelError, ModelResult};
use crate::node::DataNode;
use crate::path::PathExpr;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum ModelPath {
    Absolute(PathExpr),
    Delta {
        base: Box<ModelPath>,
        delta: PathExpr,
    },
    Prefixed {
        inner: Box<ModelPath>,
        prefix: String,
        base: PathExpr,
    },
}

impl Default for ModelPath {
    fn default() -> Self {
        ModelPath::Absolute(PathExpr::root())
    }
}

impl ModelPath {
    pub fn absolute(path: PathExpr) -> Self {
        ModelPath::Absolute(path.into_absolute())
    }

    /// The absolute cursor position
    pub fn resolve(&self) -> PathExpr {
        match self {
            ModelPath::Absolute(path) => path.clone().into_absolute(),
            ModelPath::Delta { base, delta } => base.resolve().join(delta),
            ModelPath::Prefixed { inner, .. } => inner.resolve(),
        }
    }

    /// `*` access: absolute paths stand alone, relative ones extend the cursor
    pub fn interpret(&self, expr: &PathExpr) -> PathExpr {
        if expr.is_absolute() {
            expr.clone()
        } else {
            self.resolve().join(expr)
        }
    }

    /// `@` access: the first segment must name an active prefix
    pub fn interpret_prefixed(&self, expr: &PathExpr) -> ModelResult<PathExpr> {
        let name = expr.first_name().ok_or_else(|| {
            ModelError::invalid_path(expr.to_string(), "expected a prefix name")
        })?;
        let base = self
            .prefix_base(name)
            .ok_or_else(|| ModelError::unknown_prefix(name))?;
        Ok(base.join(&expr.tail()))
    }

    pub fn prefix_base(&self, name: &str) -> Option<PathExpr> {
        match self {
            ModelPath::Absolute(_) => None,
            ModelPath::Delta { base, .. } => base.prefix_base(name),
            ModelPath::Prefixed {
                inner,
                prefix,
                base,
            } => {
                if prefix == name {
                    Some(base.clone())
                } else {
                    inner.prefix_base(name)
                }
            }
        }
    }

    /// Active prefixes, oldest first (the last entry shadows the others)
    pub fn active_prefixes(&self) -> Vec<(String, PathExpr)> {
        let mut prefixes = Vec::new();
        let mut current = self;
        loop {
            match current {
                ModelPath::Absolute(_) => break,
                ModelPath::Delta { base, .. } => current = base.as_ref(),
                ModelPath::Prefixed {
                    inner,
                    prefix,
                    base,
                } => {
                    prefixes.push((prefix.clone(), base.clone()));
                    current = inner.as_ref();
                }
            }
        }
        prefixes.reverse();
        prefixes
    }

    /// Move the cursor. Relative paths keep the current prefixes; absolute
    /// paths start over without any.
    pub fn reposition(&self, expr: &PathExpr) -> ModelPath {
        if expr.is_absolute() {
            ModelPath::Absolute(expr.clone())
        } else {
            ModelPath::Delta {
                base: Box::new(self.clone()),
                delta: expr.clone(),
            }
        }
    }

    /// Alias the current cursor position as `prefix`
    pub fn with_prefix(self, prefix: impl Into<String>) -> ModelPath {
        let base = self.resolve();
        self.with_prefix_at(prefix, base)
    }

    pub fn with_prefix_at(self, prefix: impl Into<String>, base: PathExpr) -> ModelPath {
        ModelPath::Prefixed {
            inner: Box::new(self),
            prefix: prefix.into(),
            base: base.into_absolute(),
        }
    }

    /// Equivalent path with deltas collapsed into an absolute cursor
    pub fn flatten(&self) -> ModelPath {
        self.active_prefixes()
            .into_iter()
            .fold(ModelPath::Absolute(self.resolve()), |path, (prefix, base)| {
                path.with_prefix_at(prefix, base)
            })
    }

    /// The data node under the cursor, if any
    pub fn current_node(&self, root: &DataNode) -> Option<DataNode> {
        self.resolve().resolve(root)
    }
}

impl fmt::Display for ModelPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.resolve())?;
        for (prefix, base) in self.active_prefixes() {
            write!(f, " @{}={}", prefix, base)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(src: &str) -> PathExpr {
        PathExpr::parse(src).unwrap()
    }

    #[test]
    fn test_default_is_root() {
        assert_eq!(ModelPath::default().resolve(), PathExpr::root());
    }

    #[test]
    fn test_delta_resolves_against_base() {
        let cursor = ModelPath::default()
            .reposition(&path("customers[2]"))
            .reposition(&path("orders"));
        assert_eq!(cursor.resolve().to_string(), "/customers[2].orders");
        assert_eq!(
            cursor.interpret(&path("total")).to_string(),
            "/customers[2].orders.total"
        );
        assert_eq!(cursor.interpret(&path("/meta")).to_string(), "/meta");
    }

    #[test]
    fn test_prefix_lookup_uses_stored_base() {
        let cursor = ModelPath::default()
            .reposition(&path("customers[0]"))
            .with_prefix("c")
            .reposition(&path("orders[1]"));

        assert_eq!(cursor.resolve().to_string(), "/customers[0].orders[1]");
        assert_eq!(
            cursor.interpret_prefixed(&path("c.name")).unwrap().to_string(),
            "/customers[0].name"
        );
        assert_eq!(
            cursor.interpret_prefixed(&path("x.name")).unwrap_err(),
            ModelError::unknown_prefix("x")
        );
    }

    #[test]
    fn test_nested_prefixes_shadow_outer() {
        let cursor = ModelPath::default()
            .with_prefix_at("p", path("/a"))
            .with_prefix_at("p", path("/b"))
            .with_prefix_at("q", path("/c"));
        assert_eq!(cursor.prefix_base("p"), Some(path("/b")));
        assert_eq!(
            cursor.active_prefixes(),
            vec![
                ("p".to_string(), path("/a")),
                ("p".to_string(), path("/b")),
                ("q".to_string(), path("/c")),
            ]
        );
    }

    #[test]
    fn test_absolute_reposition_drops_prefixes() {
        let cursor = ModelPath::default()
            .with_prefix_at("c", path("/customers[0]"))
            .reposition(&path("/other"));
        assert!(cursor.active_prefixes().is_empty());
    }

    #[test]
    fn test_flatten_preserves_meaning() {
        let cursor = ModelPath::default()
            .reposition(&path("a"))
            .with_prefix("x")
            .reposition(&path("b[1]"));
        let flat = cursor.flatten();
        assert_eq!(flat.resolve(), cursor.resolve());
        assert_eq!(flat.active_prefixes(), cursor.active_prefixes());
    }
}
