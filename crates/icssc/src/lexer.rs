use crate::diag::Diagnostics;
use crate::span::Span;
use crate::token::{Keyword, Punct, Token, TokenKind};

pub fn lex(src: &str, diags: &mut Diagnostics) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut i = 0usize;

    while i < src.len() {
        let ch = match src[i..].chars().next() {
            Some(ch) => ch,
            None => break,
        };
        if ch.is_whitespace() {
            i += ch.len_utf8();
            continue;
        }
        let start = i;

        if src[i..].starts_with("/*") {
            match src[i + 2..].find("*/") {
                Some(rel) => i += 2 + rel + 2,
                None => {
                    diags.error(Span::new(start, src.len()), "unterminated comment");
                    i = src.len();
                }
            }
            continue;
        }

        if ch.is_ascii_lowercase() {
            let j = scan_while(src, i, is_lower_ident_continue);
            let text = &src[i..j];
            let kind = match Keyword::from_ident(text) {
                Some(kw) => TokenKind::Keyword(kw),
                None => TokenKind::LowerIdent(text.to_string()),
            };
            tokens.push(Token {
                kind,
                span: Span::new(start, j),
            });
            i = j;
            continue;
        }

        if ch.is_ascii_uppercase() {
            let j = scan_while(src, i, is_cap_ident_continue);
            let text = &src[i..j];
            let kind = match text {
                "TRUE" => TokenKind::Bool(true),
                "FALSE" => TokenKind::Bool(false),
                _ => TokenKind::CapIdent(text.to_string()),
            };
            tokens.push(Token {
                kind,
                span: Span::new(start, j),
            });
            i = j;
            continue;
        }

        if ch.is_ascii_digit() {
            let digits_end = scan_while(src, i, |c| c.is_ascii_digit());
            let (j, unit) = if src[digits_end..].starts_with("px") {
                (digits_end + 2, Unit::Pixel)
            } else if src[digits_end..].starts_with('%') {
                (digits_end + 1, Unit::Percentage)
            } else {
                (digits_end, Unit::Scalar)
            };
            let value = match src[i..digits_end].parse::<i64>() {
                Ok(value) => value,
                Err(_) => {
                    diags.error(Span::new(start, j), "integer literal out of range");
                    0
                }
            };
            let kind = match unit {
                Unit::Pixel => TokenKind::Pixel(value),
                Unit::Percentage => TokenKind::Percentage(value),
                Unit::Scalar => TokenKind::Scalar(value),
            };
            tokens.push(Token {
                kind,
                span: Span::new(start, j),
            });
            i = j;
            continue;
        }

        if ch == '.' || ch == '#' {
            let name_start = i + 1;
            let j = scan_while(src, name_start, is_lower_ident_continue_or_upper);
            if j == name_start {
                diags.error(
                    Span::new(start, name_start),
                    format!("expected a name after '{ch}'"),
                );
                i = name_start;
                continue;
            }
            let name = src[name_start..j].to_string();
            let kind = if ch == '.' {
                TokenKind::ClassIdent(name)
            } else {
                TokenKind::Hash(name)
            };
            tokens.push(Token {
                kind,
                span: Span::new(start, j),
            });
            i = j;
            continue;
        }

        if let Some((punct, width)) = match_punct(&src[i..]) {
            tokens.push(Token {
                kind: TokenKind::Punct(punct),
                span: Span::new(start, start + width),
            });
            i += width;
            continue;
        }

        diags.error(
            Span::new(start, start + ch.len_utf8()),
            "unexpected character",
        );
        i += ch.len_utf8();
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        span: Span::new(src.len(), src.len()),
    });

    tokens
}

enum Unit {
    Pixel,
    Percentage,
    Scalar,
}

fn scan_while(src: &str, from: usize, pred: impl Fn(char) -> bool) -> usize {
    let mut j = from;
    while j < src.len() {
        match src[j..].chars().next() {
            Some(c) if pred(c) => j += c.len_utf8(),
            _ => break,
        }
    }
    j
}

fn is_lower_ident_continue(ch: char) -> bool {
    ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-' || ch == '_'
}

fn is_lower_ident_continue_or_upper(ch: char) -> bool {
    is_lower_ident_continue(ch) || ch.is_ascii_uppercase()
}

fn is_cap_ident_continue(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

fn match_punct(s: &str) -> Option<(Punct, usize)> {
    if s.starts_with(":=") {
        return Some((Punct::Assign, 2));
    }
    let ch = s.chars().next()?;
    let punct = match ch {
        '{' => Punct::LBrace,
        '}' => Punct::RBrace,
        '[' => Punct::LBracket,
        ']' => Punct::RBracket,
        ':' => Punct::Colon,
        ';' => Punct::Semicolon,
        '+' => Punct::Plus,
        '-' => Punct::Minus,
        '*' => Punct::Star,
        _ => return None,
    };
    Some((punct, ch.len_utf8()))
}
