//! Dotted/indexed path expressions.
//!
//! Paths address values inside a [`DataNode`] tree: `customers[0].orders[2].total`.
//! A leading `/` marks a path as absolute; model cursors only ever hold
//! absolute paths, while attribute values usually carry relative ones.

use crate::error::{ModelError, ModelResult};
use crate::node::DataNode;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PathSegment {
    Name(String),
    Index(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct PathExpr {
    absolute: bool,
    segments: Vec<PathSegment>,
}

impl PathExpr {
    /// The absolute root path (`/`)
    pub fn root() -> Self {
        Self {
            absolute: true,
            segments: Vec::new(),
        }
    }

    /// An empty relative path, i.e. "right here"
    pub fn current() -> Self {
        Self::default()
    }

    pub fn from_segments(absolute: bool, segments: Vec<PathSegment>) -> Self {
        Self { absolute, segments }
    }

    pub fn parse(src: &str) -> ModelResult<Self> {
        let trimmed = src.trim();
        let (absolute, body) = match trimmed.strip_prefix('/') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };

        let mut segments = Vec::new();
        let chars: Vec<char> = body.chars().collect();
        let mut pos = 0;
        let mut expect_name = true;

        while pos < chars.len() {
            match chars[pos] {
                '[' => {
                    let start = pos + 1;
                    let mut end = start;
                    while end < chars.len() && chars[end].is_ascii_digit() {
                        end += 1;
                    }
                    if end == start || end >= chars.len() || chars[end] != ']' {
                        return Err(ModelError::invalid_path(src, "expected '[<digits>]'"));
                    }
                    let digits: String = chars[start..end].iter().collect();
                    let index = digits
                        .parse::<usize>()
                        .map_err(|_| ModelError::invalid_path(src, "index too large"))?;
                    segments.push(PathSegment::Index(index));
                    pos = end + 1;
                    expect_name = false;
                }
                '.' => {
                    if segments.is_empty() || expect_name {
                        return Err(ModelError::invalid_path(src, "unexpected '.'"));
                    }
                    pos += 1;
                    expect_name = true;
                }
                c if is_name_char(c) => {
                    if !expect_name {
                        return Err(ModelError::invalid_path(src, "expected '.' or '['"));
                    }
                    let start = pos;
                    while pos < chars.len() && is_name_char(chars[pos]) {
                        pos += 1;
                    }
                    segments.push(PathSegment::Name(chars[start..pos].iter().collect()));
                    expect_name = false;
                }
                other => {
                    return Err(ModelError::invalid_path(
                        src,
                        format!("unexpected character '{}'", other),
                    ));
                }
            }
        }

        if expect_name && !segments.is_empty() {
            return Err(ModelError::invalid_path(src, "path ends with '.'"));
        }

        Ok(Self { absolute, segments })
    }

    pub fn is_absolute(&self) -> bool {
        self.absolute
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Name of the first segment, if it is a name
    pub fn first_name(&self) -> Option<&str> {
        match self.segments.first() {
            Some(PathSegment::Name(name)) => Some(name),
            _ => None,
        }
    }

    /// Everything after the first segment, as a relative path
    pub fn tail(&self) -> PathExpr {
        Self {
            absolute: false,
            segments: self.segments.iter().skip(1).cloned().collect(),
        }
    }

    /// Append `other` to this path. An absolute `other` replaces this path.
    pub fn join(&self, other: &PathExpr) -> PathExpr {
        if other.absolute {
            return other.clone();
        }
        let mut segments = self.segments.clone();
        segments.extend(other.segments.iter().cloned());
        Self {
            absolute: self.absolute,
            segments,
        }
    }

    pub fn child(&self, name: impl Into<String>) -> PathExpr {
        let mut next = self.clone();
        next.segments.push(PathSegment::Name(name.into()));
        next
    }

    pub fn index(&self, index: usize) -> PathExpr {
        let mut next = self.clone();
        next.segments.push(PathSegment::Index(index));
        next
    }

    pub fn into_absolute(mut self) -> PathExpr {
        self.absolute = true;
        self
    }

    /// Walk `node` along this path. The absolute flag is ignored: segments
    /// are always resolved from `node`.
    pub fn resolve(&self, node: &DataNode) -> Option<DataNode> {
        let mut current = node.clone();
        for segment in &self.segments {
            current = match segment {
                PathSegment::Name(name) => current.property(name)?,
                PathSegment::Index(index) => current.element(*index)?,
            };
        }
        Some(current)
    }
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-'
}

impl fmt::Display for PathExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.absolute {
            write!(f, "/")?;
        }
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Name(name) => {
                    if i > 0 {
                        write!(f, ".")?;
                    }
                    write!(f, "{}", name)?;
                }
                PathSegment::Index(index) => write!(f, "[{}]", index)?,
            }
        }
        Ok(())
    }
}

impl FromStr for PathExpr {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dotted_and_indexed() {
        let path = PathExpr::parse("customers[0].orders[12].total").unwrap();
        assert!(!path.is_absolute());
        assert_eq!(
            path.segments(),
            &[
                PathSegment::Name("customers".to_string()),
                PathSegment::Index(0),
                PathSegment::Name("orders".to_string()),
                PathSegment::Index(12),
                PathSegment::Name("total".to_string()),
            ]
        );
        assert_eq!(path.to_string(), "customers[0].orders[12].total");
    }

    #[test]
    fn test_parse_absolute_root() {
        let root = PathExpr::parse("/").unwrap();
        assert!(root.is_absolute());
        assert!(root.is_empty());
        assert_eq!(root.to_string(), "/");
        assert_eq!(PathExpr::parse("/a[1]").unwrap().to_string(), "/a[1]");
    }

    #[test]
    fn test_parse_leading_index() {
        let path = PathExpr::parse("[3].name").unwrap();
        assert_eq!(path.to_string(), "[3].name");
        assert_eq!(path.first_name(), None);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(PathExpr::parse("a..b").is_err());
        assert!(PathExpr::parse("a[").is_err());
        assert!(PathExpr::parse("a[x]").is_err());
        assert!(PathExpr::parse("a.").is_err());
        assert!(PathExpr::parse(".a").is_err());
        assert!(PathExpr::parse("a b").is_err());
    }

    #[test]
    fn test_join_relative_and_absolute() {
        let base = PathExpr::parse("/customers[1]").unwrap();
        let rel = PathExpr::parse("name").unwrap();
        assert_eq!(base.join(&rel).to_string(), "/customers[1].name");

        let abs = PathExpr::parse("/other").unwrap();
        assert_eq!(base.join(&abs).to_string(), "/other");
    }

    #[test]
    fn test_tail_drops_first_segment() {
        let path = PathExpr::parse("c.address.city").unwrap();
        assert_eq!(path.tail().to_string(), "address.city");
        assert_eq!(PathExpr::parse("c").unwrap().tail(), PathExpr::current());
    }
}
