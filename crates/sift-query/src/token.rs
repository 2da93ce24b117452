//! Token types per [§ 3.7 Lexical Structure](https://www.w3.org/TR/1999/REC-xpath-19991116/#exprlex).

use core::fmt;

/// [§ 3.7](https://www.w3.org/TR/1999/REC-xpath-19991116/#exprlex)
///
/// "When tokenizing, the longest possible token is always returned."
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// `/`
    Slash,
    /// `//`
    DoubleSlash,
    /// `[`
    LeftBracket,
    /// `]`
    RightBracket,
    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// `,`
    Comma,
    /// `@`
    At,
    /// `*`
    Star,
    /// `.`
    Dot,
    /// `=`
    Equals,
    /// `!=`
    NotEquals,
    /// "NCName": element, attribute, function and operator names.
    Name(String),
    /// "Literal": a single- or double-quoted string.
    Literal(String),
    /// "Number": digits with an optional fraction.
    Number(f64),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Slash => write!(f, "'/'"),
            Self::DoubleSlash => write!(f, "'//'"),
            Self::LeftBracket => write!(f, "'['"),
            Self::RightBracket => write!(f, "']'"),
            Self::LeftParen => write!(f, "'('"),
            Self::RightParen => write!(f, "')'"),
            Self::Comma => write!(f, "','"),
            Self::At => write!(f, "'@'"),
            Self::Star => write!(f, "'*'"),
            Self::Dot => write!(f, "'.'"),
            Self::Equals => write!(f, "'='"),
            Self::NotEquals => write!(f, "'!='"),
            Self::Name(name) => write!(f, "name {name:?}"),
            Self::Literal(text) => write!(f, "literal {text:?}"),
            Self::Number(n) => write!(f, "number {n}"),
        }
    }
}

/// A token together with the byte offset it started at.
#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken {
    /// The token.
    pub token: Token,
    /// Byte offset into the source.
    pub offset: usize,
}
