use std::collections::HashSet;

use crate::ast::{
    Declaration, Expr, ExprKind, IfClause, NodeId, Statement, Stylesheet, TopLevel,
    VariableAssignment,
};
use crate::diag::Diagnostics;
use crate::span::Span;

use super::scope::ScopeStack;
use super::types::{Ty, operation_result, property_constraint};

pub struct Checker<'a> {
    diags: &'a mut Diagnostics,
    env: ScopeStack<Ty>,
    annotated: HashSet<NodeId>,
}

impl<'a> Checker<'a> {
    pub fn new(diags: &'a mut Diagnostics) -> Self {
        Self {
            diags,
            env: ScopeStack::new(),
            annotated: HashSet::new(),
        }
    }

    /// The stylesheet owns the root scope. Its assignments are all bound
    /// before any rule is checked, so rules may refer to variables assigned
    /// further down the file.
    pub fn check_stylesheet(&mut self, sheet: &Stylesheet) {
        for item in &sheet.items {
            if let TopLevel::Assignment(assign) = item {
                self.bind_assignment(assign);
            }
        }
        for item in &sheet.items {
            if let TopLevel::Rule(rule) = item {
                self.check_block(&rule.body);
            }
        }
    }

    fn check_block(&mut self, body: &[Statement]) {
        self.env.push_scope();
        for stmt in body {
            if let Statement::Assignment(assign) = stmt {
                self.bind_assignment(assign);
            }
        }
        for stmt in body {
            match stmt {
                Statement::Declaration(decl) => self.check_declaration(decl),
                Statement::If(clause) => self.check_if_clause(clause),
                Statement::Assignment(_) => {}
            }
        }
        self.env.pop_scope();
    }

    fn bind_assignment(&mut self, assign: &VariableAssignment) {
        let ty = match &assign.expression.kind {
            ExprKind::Literal(_) | ExprKind::Operation { .. } => {
                self.check_expr(&assign.expression)
            }
            ExprKind::VariableReference(_) => {
                if self.check_expr(&assign.expression).is_unknown() {
                    Ty::Unknown
                } else {
                    Ty::Undefined
                }
            }
        };
        self.env.declare(assign.name.name.clone(), ty);
    }

    fn check_declaration(&mut self, decl: &Declaration) {
        let ty = self.check_expr(&decl.expression);
        if ty.is_unknown() {
            return;
        }
        let Some(allowed) = property_constraint(&decl.property.name) else {
            return;
        };
        if !allowed.contains(&ty) {
            self.annotate(
                decl.expression.id,
                decl.expression.span,
                format!("Property '{}' has invalid type", decl.property.name),
            );
        }
    }

    fn check_if_clause(&mut self, clause: &IfClause) {
        let ty = self.check_expr(&clause.condition);
        if !ty.is_unknown() && ty != Ty::Bool {
            self.annotate(
                clause.id,
                clause.condition.span,
                "conditionalExpression of the ifClause has invalid type",
            );
        }
        self.check_block(&clause.body);
        if let Some(else_clause) = &clause.else_clause {
            self.check_block(&else_clause.body);
        }
    }

    fn check_expr(&mut self, expr: &Expr) -> Ty {
        match &expr.kind {
            ExprKind::Literal(lit) => Ty::of_literal(lit),
            ExprKind::VariableReference(name) => match self.env.resolve(name) {
                Some(ty) => *ty,
                None => {
                    self.annotate(
                        expr.id,
                        expr.span,
                        format!("Variable '{name}' is not defined"),
                    );
                    Ty::Unknown
                }
            },
            ExprKind::Operation { op, lhs, rhs } => {
                let lhs_ty = self.check_expr(lhs);
                let rhs_ty = self.check_expr(rhs);
                if lhs_ty.is_unknown() || rhs_ty.is_unknown() {
                    return Ty::Unknown;
                }
                match operation_result(*op, lhs_ty, rhs_ty) {
                    Some(ty) => ty,
                    None => {
                        self.annotate(
                            expr.id,
                            expr.span,
                            "One property of the operation has invalid type",
                        );
                        Ty::Unknown
                    }
                }
            }
        }
    }

    /// Attaches `message` to `node` unless the node already carries one.
    /// Hand-built nodes without an identity are always reported.
    fn annotate<S: Into<String>>(&mut self, node: NodeId, span: Span, message: S) {
        if node == NodeId::DUMMY || self.annotated.insert(node) {
            self.diags.error_at(node, span, message);
        }
    }
}
