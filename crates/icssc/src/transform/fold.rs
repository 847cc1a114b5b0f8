use crate::ast::{
    Expr, ExprKind, IfClause, Literal, NodeId, Operator, Statement, Stylesheet, TopLevel,
};
use crate::sema::scope::ScopeStack;
use crate::sema::types::Ty;
use crate::span::Span;

/// Folding failures. `Overflow` depends on literal values the checker does not
/// look at and is reported to the user; the other variants mean the folder met
/// something the checker should have rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FoldError {
    #[error("cannot fold `{lhs} {op} {rhs}` at {}..{}", .span.start, .span.end)]
    Operands {
        op: Operator,
        lhs: Ty,
        rhs: Ty,
        span: Span,
    },
    #[error("variable '{name}' reached the folder unresolved at {}..{}", .span.start, .span.end)]
    Unresolved { name: String, span: Span },
    #[error("arithmetic overflow in `{op}` at {}..{}", .span.start, .span.end)]
    Overflow {
        op: Operator,
        node: NodeId,
        span: Span,
    },
    #[error("if-clause condition was not folded to a boolean at {}..{}", .span.start, .span.end)]
    UnfoldedCondition { span: Span },
}

/// Replaces every variable reference and operation with the literal it
/// evaluates to and removes all variable assignments. Expects a stylesheet
/// that passed [`crate::sema::analyze`] without diagnostics.
pub fn fold(sheet: &mut Stylesheet) -> Result<(), FoldError> {
    let mut folder = Folder::default();
    folder.fold_stylesheet(sheet)?;
    tracing::debug!(bindings = folder.bound, "constant folding finished");
    Ok(())
}

#[derive(Default)]
struct Folder {
    env: ScopeStack<Literal>,
    bound: usize,
}

impl Folder {
    fn fold_stylesheet(&mut self, sheet: &mut Stylesheet) -> Result<(), FoldError> {
        for item in &sheet.items {
            if let TopLevel::Assignment(assign) = item {
                let value = self.eval(&assign.expression)?;
                self.bind(&assign.name.name, value);
            }
        }
        for item in &mut sheet.items {
            if let TopLevel::Rule(rule) = item {
                self.fold_block(&mut rule.body)?;
            }
        }
        sheet
            .items
            .retain(|item| !matches!(item, TopLevel::Assignment(_)));
        Ok(())
    }

    /// Pushes the block's scope, folds it and pops again, also when folding
    /// fails halfway.
    fn fold_block(&mut self, body: &mut Vec<Statement>) -> Result<(), FoldError> {
        self.env.push_scope();
        let result = self.fold_block_in_scope(body);
        self.env.pop_scope();
        result
    }

    fn fold_block_in_scope(&mut self, body: &mut Vec<Statement>) -> Result<(), FoldError> {
        for stmt in body.iter() {
            if let Statement::Assignment(assign) = stmt {
                let value = self.eval(&assign.expression)?;
                self.bind(&assign.name.name, value);
            }
        }
        for stmt in body.iter_mut() {
            match stmt {
                Statement::Declaration(decl) => self.fold_expr(&mut decl.expression)?,
                Statement::If(clause) => self.fold_if_clause(clause)?,
                Statement::Assignment(_) => {}
            }
        }
        body.retain(|stmt| !matches!(stmt, Statement::Assignment(_)));
        Ok(())
    }

    fn fold_if_clause(&mut self, clause: &mut IfClause) -> Result<(), FoldError> {
        self.fold_expr(&mut clause.condition)?;
        self.fold_block(&mut clause.body)?;
        if let Some(else_clause) = &mut clause.else_clause {
            self.fold_block(&mut else_clause.body)?;
        }
        Ok(())
    }

    /// Rewrites `expr` into a literal in place. The node keeps its id and span.
    fn fold_expr(&mut self, expr: &mut Expr) -> Result<(), FoldError> {
        if matches!(expr.kind, ExprKind::Literal(_)) {
            return Ok(());
        }
        let value = self.eval(expr)?;
        expr.kind = ExprKind::Literal(value);
        Ok(())
    }

    fn bind(&mut self, name: &str, value: Literal) {
        self.env.declare(name, value);
        self.bound += 1;
    }

    fn eval(&self, expr: &Expr) -> Result<Literal, FoldError> {
        match &expr.kind {
            ExprKind::Literal(lit) => Ok(lit.clone()),
            ExprKind::VariableReference(name) => {
                self.env
                    .resolve(name)
                    .cloned()
                    .ok_or_else(|| FoldError::Unresolved {
                        name: name.clone(),
                        span: expr.span,
                    })
            }
            ExprKind::Operation { op, lhs, rhs } => {
                let lhs = self.eval(lhs)?;
                let rhs = self.eval(rhs)?;
                apply(*op, lhs, rhs, expr.id, expr.span)
            }
        }
    }
}

fn apply(
    op: Operator,
    lhs: Literal,
    rhs: Literal,
    node: NodeId,
    span: Span,
) -> Result<Literal, FoldError> {
    let overflow = || FoldError::Overflow { op, node, span };
    match (op, lhs, rhs) {
        (Operator::Add, Literal::Pixel(a), Literal::Pixel(b)) => {
            a.checked_add(b).map(Literal::Pixel).ok_or_else(overflow)
        }
        (Operator::Add, Literal::Percentage(a), Literal::Percentage(b)) => {
            a.checked_add(b).map(Literal::Percentage).ok_or_else(overflow)
        }
        (Operator::Subtract, Literal::Pixel(a), Literal::Pixel(b)) => {
            a.checked_sub(b).map(Literal::Pixel).ok_or_else(overflow)
        }
        (Operator::Subtract, Literal::Percentage(a), Literal::Percentage(b)) => {
            a.checked_sub(b).map(Literal::Percentage).ok_or_else(overflow)
        }
        (Operator::Multiply, Literal::Scalar(a), Literal::Pixel(b))
        | (Operator::Multiply, Literal::Pixel(b), Literal::Scalar(a)) => {
            a.checked_mul(b).map(Literal::Pixel).ok_or_else(overflow)
        }
        (Operator::Multiply, Literal::Scalar(a), Literal::Percentage(b))
        | (Operator::Multiply, Literal::Percentage(b), Literal::Scalar(a)) => {
            a.checked_mul(b).map(Literal::Percentage).ok_or_else(overflow)
        }
        (op, lhs, rhs) => Err(FoldError::Operands {
            op,
            lhs: Ty::of_literal(&lhs),
            rhs: Ty::of_literal(&rhs),
            span,
        }),
    }
}
