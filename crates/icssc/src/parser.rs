use std::sync::OnceLock;

use regex::Regex;

use crate::ast::*;
use crate::diag::Diagnostics;
use crate::span::Span;
use crate::token::{Keyword, Punct, Token, TokenKind};

fn color_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[0-9a-fA-F]{6}$").expect("valid color pattern"))
}

pub struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    diags: &'a mut Diagnostics,
    ids: NodeIds,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token], diags: &'a mut Diagnostics) -> Self {
        Self {
            tokens,
            pos: 0,
            diags,
            ids: NodeIds::default(),
        }
    }

    pub fn parse_stylesheet(&mut self) -> Stylesheet {
        let mut items = Vec::new();
        while !self.at_eof() {
            match self.parse_top_level() {
                Some(item) => items.push(item),
                None => self.sync_to_next_item(),
            }
        }
        if items.is_empty() && self.diags.is_empty() {
            self.error_here("expected at least one style rule");
        }
        Stylesheet { items }
    }

    fn parse_top_level(&mut self) -> Option<TopLevel> {
        match self.peek_kind() {
            TokenKind::CapIdent(_) => Some(TopLevel::Assignment(self.parse_assignment())),
            TokenKind::LowerIdent(_) | TokenKind::ClassIdent(_) | TokenKind::Hash(_) => {
                Some(TopLevel::Rule(self.parse_stylerule()))
            }
            _ => {
                self.error_here(&format!(
                    "expected a style rule or variable assignment, found {}",
                    self.peek_kind()
                ));
                None
            }
        }
    }

    fn parse_stylerule(&mut self) -> Stylerule {
        let start = self.peek_span();
        let selector = self.parse_selector();
        let body = self.parse_block();
        Stylerule {
            selector,
            body,
            span: start.merge(self.prev_span()),
        }
    }

    fn parse_selector(&mut self) -> Selector {
        match self.bump().kind {
            TokenKind::LowerIdent(name) => Selector::Tag(name),
            TokenKind::ClassIdent(name) => Selector::Class(name),
            TokenKind::Hash(name) => Selector::Id(name),
            _ => {
                self.error_prev("expected a selector");
                Selector::Tag("_".to_string())
            }
        }
    }

    /// `{ statement+ }`
    fn parse_block(&mut self) -> Vec<Statement> {
        let open = self.peek_span();
        self.expect_punct(Punct::LBrace);
        let mut body = Vec::new();
        while !self.at_punct(Punct::RBrace) && !self.at_eof() {
            match self.parse_statement() {
                Some(stmt) => body.push(stmt),
                None => self.sync_to_next_statement(),
            }
        }
        self.expect_punct(Punct::RBrace);
        if body.is_empty() {
            self.diags
                .error(open.merge(self.prev_span()), "expected at least one statement in block");
        }
        body
    }

    fn parse_statement(&mut self) -> Option<Statement> {
        match self.peek_kind() {
            TokenKind::LowerIdent(_) => Some(Statement::Declaration(self.parse_declaration())),
            TokenKind::CapIdent(_) => Some(Statement::Assignment(self.parse_assignment())),
            TokenKind::Keyword(Keyword::If) => Some(Statement::If(self.parse_if_clause())),
            _ => {
                self.error_here(&format!(
                    "expected a declaration, if-clause or variable assignment, found {}",
                    self.peek_kind()
                ));
                None
            }
        }
    }

    fn parse_declaration(&mut self) -> Declaration {
        let start = self.peek_span();
        let property = self.expect_lower_ident();
        self.expect_punct(Punct::Colon);
        let expression = self.parse_expr();
        self.expect_punct(Punct::Semicolon);
        Declaration {
            property,
            expression,
            span: start.merge(self.prev_span()),
        }
    }

    fn parse_assignment(&mut self) -> VariableAssignment {
        let start = self.peek_span();
        let name = self.expect_cap_ident();
        self.expect_punct(Punct::Assign);
        let expression = self.parse_expr();
        self.expect_punct(Punct::Semicolon);
        VariableAssignment {
            name,
            expression,
            span: start.merge(self.prev_span()),
        }
    }

    /// `if [ condition ] { ... } (else { ... })?`
    fn parse_if_clause(&mut self) -> IfClause {
        let start = self.peek_span();
        self.expect_keyword(Keyword::If);
        let id = self.ids.fresh();
        self.expect_punct(Punct::LBracket);
        let condition = self.parse_primary();
        self.expect_punct(Punct::RBracket);
        let body = self.parse_block();
        let else_clause = if self.at_keyword(Keyword::Else) {
            let else_start = self.bump().span;
            let body = self.parse_block();
            Some(ElseClause {
                body,
                span: else_start.merge(self.prev_span()),
            })
        } else {
            None
        };
        IfClause {
            id,
            condition,
            body,
            else_clause,
            span: start.merge(self.prev_span()),
        }
    }

    pub fn parse_expr(&mut self) -> Expr {
        self.parse_add()
    }

    fn parse_add(&mut self) -> Expr {
        let mut expr = self.parse_mul();
        loop {
            let op = if self.eat_punct(Punct::Plus).is_some() {
                Some(Operator::Add)
            } else if self.eat_punct(Punct::Minus).is_some() {
                Some(Operator::Subtract)
            } else {
                None
            };
            if let Some(op) = op {
                let rhs = self.parse_mul();
                expr = self.operation(op, expr, rhs);
            } else {
                break;
            }
        }
        expr
    }

    fn parse_mul(&mut self) -> Expr {
        let mut expr = self.parse_primary();
        while self.eat_punct(Punct::Star).is_some() {
            let rhs = self.parse_primary();
            expr = self.operation(Operator::Multiply, expr, rhs);
        }
        expr
    }

    fn operation(&mut self, op: Operator, lhs: Expr, rhs: Expr) -> Expr {
        let span = lhs.span.merge(rhs.span);
        Expr {
            id: self.ids.fresh(),
            kind: ExprKind::Operation {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            },
            span,
        }
    }

    fn parse_primary(&mut self) -> Expr {
        if matches!(self.peek_kind(), TokenKind::Punct(_) | TokenKind::Eof) {
            self.error_here(&format!("expected a value, found {}", self.peek_kind()));
            return Expr {
                id: self.ids.fresh(),
                kind: ExprKind::Literal(Literal::Scalar(0)),
                span: self.peek_span(),
            };
        }
        let tok = self.bump();
        let kind = match tok.kind {
            TokenKind::Pixel(value) => ExprKind::Literal(Literal::Pixel(value)),
            TokenKind::Percentage(value) => ExprKind::Literal(Literal::Percentage(value)),
            TokenKind::Scalar(value) => ExprKind::Literal(Literal::Scalar(value)),
            TokenKind::Bool(value) => ExprKind::Literal(Literal::Bool(value)),
            TokenKind::CapIdent(name) => ExprKind::VariableReference(name),
            TokenKind::Hash(digits) => {
                if !color_pattern().is_match(&digits) {
                    self.error_prev(&format!(
                        "invalid color literal `#{digits}`: expected six hex digits"
                    ));
                }
                ExprKind::Literal(Literal::Color(format!("#{digits}")))
            }
            other => {
                self.error_prev(&format!("expected a value, found {other}"));
                ExprKind::Literal(Literal::Scalar(0))
            }
        };
        Expr {
            id: self.ids.fresh(),
            kind,
            span: tok.span,
        }
    }

    fn sync_to_next_statement(&mut self) {
        while !self.at_eof() && !self.at_punct(Punct::RBrace) {
            if self.at_punct(Punct::LBrace) {
                self.skip_braced();
                continue;
            }
            if self.bump().kind == TokenKind::Punct(Punct::Semicolon) {
                return;
            }
        }
    }

    fn sync_to_next_item(&mut self) {
        while !self.at_eof() {
            if self.at_punct(Punct::LBrace) {
                self.skip_braced();
                return;
            }
            match self.bump().kind {
                TokenKind::Punct(Punct::Semicolon) | TokenKind::Punct(Punct::RBrace) => return,
                _ => {}
            }
        }
    }

    fn skip_braced(&mut self) {
        let mut depth = 0usize;
        while !self.at_eof() {
            match self.bump().kind {
                TokenKind::Punct(Punct::LBrace) => depth += 1,
                TokenKind::Punct(Punct::RBrace) => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return;
                    }
                }
                _ => {}
            }
        }
    }

    fn expect_lower_ident(&mut self) -> Ident {
        match self.bump().kind {
            TokenKind::LowerIdent(name) => Ident {
                name,
                span: self.prev_span(),
            },
            _ => {
                self.error_prev("expected a property name");
                Ident {
                    name: "_".to_string(),
                    span: self.prev_span(),
                }
            }
        }
    }

    fn expect_cap_ident(&mut self) -> Ident {
        match self.bump().kind {
            TokenKind::CapIdent(name) => Ident {
                name,
                span: self.prev_span(),
            },
            _ => {
                self.error_prev("expected a variable name");
                Ident {
                    name: "_".to_string(),
                    span: self.prev_span(),
                }
            }
        }
    }

    fn expect_keyword(&mut self, kw: Keyword) {
        if !self.at_keyword(kw) {
            self.error_here(&format!("expected `{}`", kw.as_str()));
            return;
        }
        self.bump();
    }

    fn expect_punct(&mut self, punct: Punct) -> Span {
        if self.eat_punct(punct).is_some() {
            return self.prev_span();
        }
        self.error_here(&format!(
            "expected `{}`, found {}",
            punct.as_str(),
            self.peek_kind()
        ));
        self.peek_span()
    }

    fn eat_punct(&mut self, punct: Punct) -> Option<Token> {
        if self.at_punct(punct) {
            Some(self.bump())
        } else {
            None
        }
    }

    fn at_punct(&self, punct: Punct) -> bool {
        matches!(self.peek_kind(), TokenKind::Punct(p) if *p == punct)
    }

    fn at_keyword(&self, kw: Keyword) -> bool {
        matches!(self.peek_kind(), TokenKind::Keyword(k) if *k == kw)
    }

    fn at_eof(&self) -> bool {
        matches!(self.peek_kind(), TokenKind::Eof)
    }

    fn error_here(&mut self, message: &str) {
        let span = self.peek_span();
        self.diags.error(span, message);
    }

    fn error_prev(&mut self, message: &str) {
        let span = self.prev_span();
        self.diags.error(span, message);
    }

    fn peek(&self) -> &Token {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .unwrap_or(&EOF)
    }

    fn peek_kind(&self) -> &TokenKind {
        &self.peek().kind
    }

    fn bump(&mut self) -> Token {
        let tok = self.peek().clone();
        if !self.at_eof() {
            self.pos += 1;
        }
        tok
    }

    fn peek_span(&self) -> Span {
        self.peek().span
    }

    fn prev_span(&self) -> Span {
        if self.pos == 0 {
            self.peek().span
        } else {
            self.tokens[self.pos - 1].span
        }
    }
}

static EOF: Token = Token {
    kind: TokenKind::Eof,
    span: Span::new(0, 0),
};
