use std::fmt;

use crate::span::Span;

#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    /// Lowercase identifier: tag selectors and property names.
    LowerIdent(String),
    /// Capitalized identifier: variable names.
    CapIdent(String),
    /// `.name`, stored without the dot.
    ClassIdent(String),
    /// `#name`, stored without the hash. Either an id selector or a color,
    /// depending on where the parser meets it.
    Hash(String),
    Pixel(i64),
    Percentage(i64),
    Scalar(i64),
    Bool(bool),
    Keyword(Keyword),
    Punct(Punct),
    Eof,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Keyword {
    If,
    Else,
}

impl Keyword {
    pub fn from_ident(text: &str) -> Option<Self> {
        match text {
            "if" => Some(Keyword::If),
            "else" => Some(Keyword::Else),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Keyword::If => "if",
            Keyword::Else => "else",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Punct {
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Colon,
    Semicolon,
    Assign,
    Plus,
    Minus,
    Star,
}

impl Punct {
    pub fn as_str(self) -> &'static str {
        match self {
            Punct::LBrace => "{",
            Punct::RBrace => "}",
            Punct::LBracket => "[",
            Punct::RBracket => "]",
            Punct::Colon => ":",
            Punct::Semicolon => ";",
            Punct::Assign => ":=",
            Punct::Plus => "+",
            Punct::Minus => "-",
            Punct::Star => "*",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::LowerIdent(name) | TokenKind::CapIdent(name) => write!(f, "`{name}`"),
            TokenKind::ClassIdent(name) => write!(f, "`.{name}`"),
            TokenKind::Hash(name) => write!(f, "`#{name}`"),
            TokenKind::Pixel(value) => write!(f, "`{value}px`"),
            TokenKind::Percentage(value) => write!(f, "`{value}%`"),
            TokenKind::Scalar(value) => write!(f, "`{value}`"),
            TokenKind::Bool(true) => write!(f, "`TRUE`"),
            TokenKind::Bool(false) => write!(f, "`FALSE`"),
            TokenKind::Keyword(kw) => write!(f, "`{}`", kw.as_str()),
            TokenKind::Punct(p) => write!(f, "`{}`", p.as_str()),
            TokenKind::Eof => write!(f, "end of input"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_round_trip_through_their_text() {
        for kw in [Keyword::If, Keyword::Else] {
            assert_eq!(Keyword::from_ident(kw.as_str()), Some(kw));
        }
        assert_eq!(Keyword::from_ident("elif"), None);
        assert_eq!(Keyword::from_ident("If"), None);
    }
}
