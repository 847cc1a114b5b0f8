use crate::ast::{ExprKind, IfClause, Literal, Statement, Stylesheet, TopLevel};

use super::fold::FoldError;

/// Replaces every if-clause with the statements of the branch its folded
/// condition selects. Runs after [`super::fold`]; a condition that is not a
/// boolean literal by then is an internal error.
pub fn select_branches(sheet: &mut Stylesheet) -> Result<(), FoldError> {
    for item in &mut sheet.items {
        if let TopLevel::Rule(rule) = item {
            let body = std::mem::take(&mut rule.body);
            rule.body = select_in_body(body)?;
        }
    }
    Ok(())
}

fn select_in_body(body: Vec<Statement>) -> Result<Vec<Statement>, FoldError> {
    let mut out = Vec::with_capacity(body.len());
    for stmt in body {
        match stmt {
            Statement::If(clause) => {
                let taken = taken_branch(clause)?;
                out.extend(select_in_body(taken)?);
            }
            other => out.push(other),
        }
    }
    Ok(out)
}

fn taken_branch(clause: IfClause) -> Result<Vec<Statement>, FoldError> {
    match clause.condition.kind {
        ExprKind::Literal(Literal::Bool(true)) => Ok(clause.body),
        ExprKind::Literal(Literal::Bool(false)) => Ok(clause
            .else_clause
            .map(|else_clause| else_clause.body)
            .unwrap_or_default()),
        _ => Err(FoldError::UnfoldedCondition {
            span: clause.condition.span,
        }),
    }
}
