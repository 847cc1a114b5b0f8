use std::fmt;

use crate::span::Span;

/// Identity of an expression or if-clause node. Diagnostics refer to nodes
/// through it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    pub const DUMMY: NodeId = NodeId(u32::MAX);
}

#[derive(Debug, Default)]
pub struct NodeIds {
    next: u32,
}

impl NodeIds {
    pub fn fresh(&mut self) -> NodeId {
        let id = NodeId(self.next);
        self.next += 1;
        id
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Stylesheet {
    pub items: Vec<TopLevel>,
}

impl Stylesheet {
    pub fn rules(&self) -> impl Iterator<Item = &Stylerule> {
        self.items.iter().filter_map(|item| match item {
            TopLevel::Rule(rule) => Some(rule),
            TopLevel::Assignment(_) => None,
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum TopLevel {
    Assignment(VariableAssignment),
    Rule(Stylerule),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Stylerule {
    pub selector: Selector,
    pub body: Vec<Statement>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Selector {
    Tag(String),
    Class(String),
    Id(String),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Statement {
    Declaration(Declaration),
    If(IfClause),
    Assignment(VariableAssignment),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Declaration {
    pub property: Ident,
    pub expression: Expr,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct VariableAssignment {
    pub name: Ident,
    pub expression: Expr,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct IfClause {
    pub id: NodeId,
    pub condition: Expr,
    pub body: Vec<Statement>,
    pub else_clause: Option<ElseClause>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ElseClause {
    pub body: Vec<Statement>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Expr {
    pub id: NodeId,
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn literal(value: Literal) -> Self {
        Self {
            id: NodeId::DUMMY,
            kind: ExprKind::Literal(value),
            span: Span::default(),
        }
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match &self.kind {
            ExprKind::Literal(lit) => Some(lit),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ExprKind {
    Literal(Literal),
    VariableReference(String),
    Operation {
        op: Operator,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Literal {
    Bool(bool),
    /// Includes the leading `#`.
    Color(String),
    Pixel(i64),
    Percentage(i64),
    Scalar(i64),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Tag(name) => write!(f, "{name}"),
            Selector::Class(name) => write!(f, ".{name}"),
            Selector::Id(name) => write!(f, "#{name}"),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Bool(value) => write!(f, "{value}"),
            Literal::Color(value) => write!(f, "{value}"),
            Literal::Pixel(value) => write!(f, "{value}px"),
            Literal::Percentage(value) => write!(f, "{value}%"),
            Literal::Scalar(value) => write!(f, "{value}"),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Operator::Add => "+",
            Operator::Subtract => "-",
            Operator::Multiply => "*",
        };
        write!(f, "{text}")
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExprKind::Literal(lit) => write!(f, "{lit}"),
            ExprKind::VariableReference(name) => write!(f, "{name}"),
            ExprKind::Operation { op, lhs, rhs } => write!(f, "{lhs} {op} {rhs}"),
        }
    }
}
