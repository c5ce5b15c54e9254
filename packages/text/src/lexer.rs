//! Lexer for placeholder text using logos

use logos::Logos;

#[derive(Logos, Debug, Clone, PartialEq, Eq, Hash)]
#[logos(skip r"[ \t\r\n]+")]
pub enum Token<'src> {
    #[token("${")]
    Open,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(":")]
    Colon,
    #[token(",")]
    Comma,

    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("null")]
    Null,

    /// Command keys, attribute names (with their sigil) and bare strings
    #[regex(r"[$*@&]?[a-zA-Z_][a-zA-Z0-9_\-]*", |lex| lex.slice())]
    Name(&'src str),

    #[regex(r#""([^"\\]|\\.)*""#, |lex| {
        let s = lex.slice();
        &s[1..s.len() - 1]
    })]
    String(&'src str),

    #[regex(r"-?[0-9]+", |lex| lex.slice())]
    Int(&'src str),

    #[regex(r"-?[0-9]+\.[0-9]+", |lex| lex.slice())]
    Float(&'src str),
}

impl<'src> Token<'src> {
    pub fn describe(&self) -> String {
        match self {
            Token::Open => "'${'".to_string(),
            Token::LBrace => "'{'".to_string(),
            Token::RBrace => "'}'".to_string(),
            Token::LBracket => "'['".to_string(),
            Token::RBracket => "']'".to_string(),
            Token::Colon => "':'".to_string(),
            Token::Comma => "','".to_string(),
            Token::True => "true".to_string(),
            Token::False => "false".to_string(),
            Token::Null => "null".to_string(),
            Token::Name(name) => format!("name '{}'", name),
            Token::String(s) => format!("string \"{}\"", s),
            Token::Int(n) | Token::Float(n) => format!("number {}", n),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken<'src> {
    pub token: Token<'src>,
    pub start: usize,
    pub end: usize,
}

/// Lex a placeholder into tokens with byte offsets. Fails at the first
/// character no token accepts.
pub fn lex(source: &str) -> Result<Vec<SpannedToken<'_>>, usize> {
    Token::lexer(source)
        .spanned()
        .map(|(result, span)| match result {
            Ok(token) => Ok(SpannedToken {
                token,
                start: span.start,
                end: span.end,
            }),
            Err(_) => Err(span.start),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(source: &str) -> Vec<Token<'_>> {
        lex(source).unwrap().into_iter().map(|t| t.token).collect()
    }

    #[test]
    fn test_lex_placeholder() {
        assert_eq!(
            tokens("${For $value:items as:item}"),
            vec![
                Token::Open,
                Token::Name("For"),
                Token::Name("$value"),
                Token::Colon,
                Token::Name("items"),
                Token::Name("as"),
                Token::Colon,
                Token::Name("item"),
                Token::RBrace,
            ]
        );
    }

    #[test]
    fn test_lex_literals() {
        assert_eq!(
            tokens(r#"[1, -2.5, "a \"b\"", true, null]"#),
            vec![
                Token::LBracket,
                Token::Int("1"),
                Token::Comma,
                Token::Float("-2.5"),
                Token::Comma,
                Token::String(r#"a \"b\""#),
                Token::Comma,
                Token::True,
                Token::Comma,
                Token::Null,
                Token::RBracket,
            ]
        );
    }

    #[test]
    fn test_keywords_do_not_swallow_names() {
        assert_eq!(tokens("trueish"), vec![Token::Name("trueish")]);
    }

    #[test]
    fn test_lex_error_reports_offset() {
        assert_eq!(lex("${Value %x}").unwrap_err(), 8);
    }
}
