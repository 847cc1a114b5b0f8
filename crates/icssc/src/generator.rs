use std::fmt::Write as _;

use crate::ast::{Statement, Stylesheet};

/// Serializes a checked and folded stylesheet. Top-level assignments produce
/// no output; if/else bodies are emitted one tab deeper than their parent.
pub fn generate(sheet: &Stylesheet) -> String {
    let mut out = String::new();
    for rule in sheet.rules() {
        let _ = writeln!(out, "{} {{", rule.selector);
        emit_body(&mut out, &rule.body, 1);
        let _ = writeln!(out, "}}");
    }
    out
}

fn emit_body(out: &mut String, body: &[Statement], depth: usize) {
    for stmt in body {
        match stmt {
            Statement::Declaration(decl) => {
                let indent = "\t".repeat(depth);
                let _ = writeln!(out, "{indent}{}: {};", decl.property.name, decl.expression);
            }
            Statement::If(clause) => {
                emit_body(out, &clause.body, depth + 1);
                if let Some(else_clause) = &clause.else_clause {
                    emit_body(out, &else_clause.body, depth + 1);
                }
            }
            Statement::Assignment(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::*;
    use crate::span::Span;

    fn decl(property: &str, value: Literal) -> Statement {
        Statement::Declaration(Declaration {
            property: Ident {
                name: property.to_string(),
                span: Span::default(),
            },
            expression: Expr::literal(value),
            span: Span::default(),
        })
    }

    fn rule(selector: Selector, body: Vec<Statement>) -> TopLevel {
        TopLevel::Rule(Stylerule {
            selector,
            body,
            span: Span::default(),
        })
    }

    #[test]
    fn formats_every_literal_kind() {
        let sheet = Stylesheet {
            items: vec![rule(
                Selector::Class("box".to_string()),
                vec![
                    decl("width", Literal::Pixel(15)),
                    decl("height", Literal::Percentage(50)),
                    decl("color", Literal::Color("#00ff00".to_string())),
                    decl("visible", Literal::Bool(false)),
                    decl("z-index", Literal::Scalar(3)),
                ],
            )],
        };
        assert_eq!(
            generate(&sheet),
            ".box {\n\twidth: 15px;\n\theight: 50%;\n\tcolor: #00ff00;\n\tvisible: false;\n\tz-index: 3;\n}\n"
        );
    }

    #[test]
    fn nested_branches_indent_one_level_each() {
        let inner = Statement::If(IfClause {
            id: NodeId::DUMMY,
            condition: Expr::literal(Literal::Bool(true)),
            body: vec![decl("height", Literal::Pixel(2))],
            else_clause: None,
            span: Span::default(),
        });
        let outer = Statement::If(IfClause {
            id: NodeId::DUMMY,
            condition: Expr::literal(Literal::Bool(false)),
            body: vec![decl("width", Literal::Pixel(1)), inner],
            else_clause: Some(ElseClause {
                body: vec![decl("width", Literal::Pixel(3))],
                span: Span::default(),
            }),
            span: Span::default(),
        });
        let sheet = Stylesheet {
            items: vec![rule(Selector::Id("main".to_string()), vec![outer])],
        };
        assert_eq!(
            generate(&sheet),
            "#main {\n\t\twidth: 1px;\n\t\t\theight: 2px;\n\t\twidth: 3px;\n}\n"
        );
    }

    #[test]
    fn top_level_assignments_are_skipped() {
        let sheet = Stylesheet {
            items: vec![
                TopLevel::Assignment(VariableAssignment {
                    name: Ident {
                        name: "Size".to_string(),
                        span: Span::default(),
                    },
                    expression: Expr::literal(Literal::Pixel(1)),
                    span: Span::default(),
                }),
                rule(Selector::Tag("a".to_string()), vec![decl("width", Literal::Pixel(1))]),
                rule(Selector::Tag("p".to_string()), vec![decl("height", Literal::Pixel(2))]),
            ],
        };
        assert_eq!(
            generate(&sheet),
            "a {\n\twidth: 1px;\n}\np {\n\theight: 2px;\n}\n"
        );
    }
}
