//! # Placeholder codec
//!
//! ```text
//! ${Key name:value name:value ...}
//! ```
//!
//! Attribute names may carry an access sigil (`$`, `*`, `@`, `&`). Values
//! are JSON-like: strings, integers, floats, `true`, `false`, `null`, lists
//! and maps. A bare identifier is read as a string, so `as:item` and
//! `as:"item"` mean the same thing; anything with dots or brackets must be
//! quoted (`$value:"order.lines"`). Commas between attributes are optional.

use crate::error::{CodecError, CodecResult};
use crate::lexer::{lex, SpannedToken, Token};
use stencil_model::{AccessType, DataKind, DataNode, PlaceholderData, Scalar};

pub fn parse_placeholder(src: &str) -> CodecResult<PlaceholderData> {
    let tokens = lex(src).map_err(CodecError::lexer_error)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        eof: src.len(),
    };

    parser.expect(&Token::Open, "'${'")?;
    let (offset, key) = parser.name()?;
    if key.starts_with(['$', '*', '@', '&']) {
        return Err(CodecError::invalid_syntax(offset, "command key cannot carry a sigil"));
    }
    let mut data = PlaceholderData::new(key);

    loop {
        match parser.peek() {
            Some(Token::RBrace) => {
                parser.advance();
                break;
            }
            Some(Token::Name(_)) => {
                let (offset, name) = parser.name()?;
                let (_, canonical) = AccessType::from_raw_name(name);
                if data.attribute(canonical).is_some() {
                    return Err(CodecError::invalid_syntax(
                        offset,
                        format!("attribute '{}' given twice", canonical),
                    ));
                }
                parser.expect(&Token::Colon, "':'")?;
                let value = parser.value()?;
                data.insert_raw(name, value);
                if parser.peek() == Some(&Token::Comma) {
                    parser.advance();
                }
            }
            Some(_) => return Err(parser.unexpected("attribute name or '}'")),
            None => return Err(CodecError::unexpected_eof(parser.eof)),
        }
    }

    if parser.pos < parser.tokens.len() {
        return Err(parser.unexpected("end of placeholder"));
    }
    Ok(data)
}

struct Parser<'src> {
    tokens: Vec<SpannedToken<'src>>,
    pos: usize,
    eof: usize,
}

impl<'src> Parser<'src> {
    fn peek(&self) -> Option<&Token<'src>> {
        self.tokens.get(self.pos).map(|t| &t.token)
    }

    fn advance(&mut self) -> Option<SpannedToken<'src>> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn offset(&self) -> usize {
        self.tokens.get(self.pos).map_or(self.eof, |t| t.start)
    }

    fn unexpected(&self, expected: &str) -> CodecError {
        match self.tokens.get(self.pos) {
            Some(t) => CodecError::unexpected_token(t.start, expected, t.token.describe()),
            None => CodecError::unexpected_eof(self.eof),
        }
    }

    fn expect(&mut self, expected: &Token<'src>, description: &str) -> CodecResult<()> {
        if self.peek() == Some(expected) {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(description))
        }
    }

    fn name(&mut self) -> CodecResult<(usize, &'src str)> {
        match self.peek() {
            Some(Token::Name(name)) => {
                let name = *name;
                let offset = self.offset();
                self.advance();
                Ok((offset, name))
            }
            _ => Err(self.unexpected("a name")),
        }
    }

    fn value(&mut self) -> CodecResult<DataNode> {
        let offset = self.offset();
        let Some(token) = self.advance() else {
            return Err(CodecError::unexpected_eof(self.eof));
        };
        match token.token {
            Token::String(raw) => Ok(DataNode::leaf(unescape(raw))),
            Token::Int(raw) => raw
                .parse::<i64>()
                .map(|n| DataNode::leaf(n))
                .map_err(|_| CodecError::invalid_syntax(offset, format!("integer out of range: {}", raw))),
            Token::Float(raw) => raw
                .parse::<f64>()
                .map(|n| DataNode::leaf(n))
                .map_err(|_| CodecError::invalid_syntax(offset, format!("invalid number: {}", raw))),
            Token::True => Ok(DataNode::leaf(true)),
            Token::False => Ok(DataNode::leaf(false)),
            Token::Null => Ok(DataNode::null()),
            Token::Name(raw) if !raw.starts_with(['$', '*', '@', '&']) => Ok(DataNode::leaf(raw)),
            Token::LBracket => self.list(),
            Token::LBrace => self.map(),
            other => Err(CodecError::unexpected_token(offset, "a value", other.describe())),
        }
    }

    fn list(&mut self) -> CodecResult<DataNode> {
        let list = DataNode::new_list();
        loop {
            if self.peek() == Some(&Token::RBracket) {
                self.advance();
                return Ok(list);
            }
            let offset = self.offset();
            let item = self.value()?;
            list.push(item)
                .map_err(|err| CodecError::invalid_syntax(offset, err.to_string()))?;
            match self.peek() {
                Some(Token::Comma) => {
                    self.advance();
                }
                Some(Token::RBracket) => {}
                _ => return Err(self.unexpected("',' or ']'")),
            }
        }
    }

    fn map(&mut self) -> CodecResult<DataNode> {
        let map = DataNode::new_map();
        loop {
            let offset = self.offset();
            let key = match self.peek() {
                Some(Token::RBrace) => {
                    self.advance();
                    return Ok(map);
                }
                Some(Token::Name(name)) => name.to_string(),
                Some(Token::String(raw)) => unescape(raw),
                _ => return Err(self.unexpected("a map key or '}'")),
            };
            self.advance();
            self.expect(&Token::Colon, "':'")?;
            let value = self.value()?;
            map.insert(key, value)
                .map_err(|err| CodecError::invalid_syntax(offset, err.to_string()))?;
            match self.peek() {
                Some(Token::Comma) => {
                    self.advance();
                }
                Some(Token::RBrace) => {}
                _ => return Err(self.unexpected("',' or '}'")),
            }
        }
    }
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

pub fn write_placeholder(data: &PlaceholderData) -> String {
    let mut out = format!("${{{}", data.key());
    for (name, attr) in data.attributes() {
        out.push(' ');
        out.push_str(&data.rename(name).unwrap_or_else(|| name.to_string()));
        out.push(':');
        write_value(&attr.value, &mut out);
    }
    out.push('}');
    out
}

pub fn write_value(value: &DataNode, out: &mut String) {
    match value.kind() {
        DataKind::Leaf => match value.scalar().unwrap_or(Scalar::Null) {
            Scalar::Null => out.push_str("null"),
            Scalar::Bool(b) => out.push_str(if b { "true" } else { "false" }),
            Scalar::Int(n) => out.push_str(&n.to_string()),
            Scalar::Float(n) if !n.is_finite() => out.push_str("null"),
            Scalar::Float(n) if n.fract() == 0.0 => out.push_str(&format!("{:.1}", n)),
            Scalar::Float(n) => out.push_str(&n.to_string()),
            Scalar::Str(s) => write_string(&s, out),
        },
        DataKind::List => {
            out.push('[');
            for (i, item) in value.elements().iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_value(item, out);
            }
            out.push(']');
        }
        DataKind::Map => {
            out.push('{');
            for (i, key) in value.keys().iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                if is_bare_name(key) {
                    out.push_str(key);
                } else {
                    write_string(key, out);
                }
                out.push_str(": ");
                write_value(&value.property(key).unwrap_or_default(), out);
            }
            out.push('}');
        }
    }
}

fn write_string(s: &str, out: &mut String) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out.push('"');
}

fn is_bare_name(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        && !matches!(s, "true" | "false" | "null")
}

/// A piece of a line: literal text or a complete placeholder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Text(&'a str),
    Placeholder(&'a str),
}

/// Split a line into text and placeholders. A placeholder runs from `${`
/// to the `}` that balances it, ignoring braces inside quoted strings. An
/// unterminated `${` is kept as text.
pub fn split_segments(line: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut rest = line;
    while let Some(start) = rest.find("${") {
        let Some(len) = placeholder_len(&rest[start..]) else {
            break;
        };
        if start > 0 {
            segments.push(Segment::Text(&rest[..start]));
        }
        segments.push(Segment::Placeholder(&rest[start..start + len]));
        rest = &rest[start + len..];
    }
    if !rest.is_empty() {
        segments.push(Segment::Text(rest));
    }
    segments
}

fn placeholder_len(src: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (i, c) in src.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
    }
    None
}
