use icssc::ast::{ExprKind, Literal, Operator, Selector, Statement, TopLevel};
use icssc::parse_source;

fn assert_parse_ok(src: &str) -> icssc::ast::Stylesheet {
    let (sheet, diags) = parse_source(src);
    if !diags.is_empty() {
        let mut out = String::new();
        for diag in diags {
            out.push_str(&format!(
                "{} ({}..{})\n",
                diag.message, diag.span.start, diag.span.end
            ));
        }
        panic!("expected parse success, got diagnostics:\n{out}");
    }
    sheet
}

fn parse_errors(src: &str) -> Vec<String> {
    let (_sheet, diags) = parse_source(src);
    diags.into_iter().map(|d| d.message).collect()
}

fn first_declaration_expr(sheet: &icssc::ast::Stylesheet) -> &icssc::ast::Expr {
    let rule = sheet.rules().next().expect("a rule");
    match &rule.body[0] {
        Statement::Declaration(decl) => &decl.expression,
        other => panic!("expected declaration, got {other:?}"),
    }
}

#[test]
fn parses_selectors_and_top_level_assignments() {
    let src = r#"
/* palette */
Accent := #ff8800;
a { color: Accent; }
.card { width: 50%; }
#main { height: 10px; }
"#;
    let sheet = assert_parse_ok(src);
    assert_eq!(sheet.items.len(), 4);
    assert!(matches!(&sheet.items[0], TopLevel::Assignment(a) if a.name.name == "Accent"));
    let selectors: Vec<String> = sheet.rules().map(|r| r.selector.to_string()).collect();
    assert_eq!(selectors, vec!["a", ".card", "#main"]);
    assert_eq!(
        sheet.rules().nth(1).map(|r| &r.selector),
        Some(&Selector::Class("card".to_string()))
    );
}

#[test]
fn multiplication_binds_tighter_than_addition() {
    let sheet = assert_parse_ok("a { width: 1px + 2 * 3px; }");
    let expr = first_declaration_expr(&sheet);
    let ExprKind::Operation { op, lhs, rhs } = &expr.kind else {
        panic!("expected operation, got {expr:?}");
    };
    assert_eq!(*op, Operator::Add);
    assert_eq!(lhs.as_literal(), Some(&Literal::Pixel(1)));
    assert!(matches!(
        &rhs.kind,
        ExprKind::Operation {
            op: Operator::Multiply,
            ..
        }
    ));
}

#[test]
fn operators_of_equal_precedence_associate_left() {
    let sheet = assert_parse_ok("a { width: 10px - 3px - 2px; }");
    let expr = first_declaration_expr(&sheet);
    assert_eq!(expr.to_string(), "10px - 3px - 2px");
    let ExprKind::Operation { op, lhs, rhs } = &expr.kind else {
        panic!("expected operation, got {expr:?}");
    };
    assert_eq!(*op, Operator::Subtract);
    assert_eq!(rhs.as_literal(), Some(&Literal::Pixel(2)));
    assert_eq!(lhs.to_string(), "10px - 3px");
}

#[test]
fn parses_nested_if_else_and_block_assignments() {
    let src = r#"
Wide := TRUE;
nav {
  Pad := 4px;
  if [Wide] {
    width: 100%;
    if [FALSE] { height: Pad; }
  } else {
    width: 50%;
  }
}
"#;
    let sheet = assert_parse_ok(src);
    let rule = sheet.rules().next().expect("nav rule");
    assert_eq!(rule.body.len(), 2);
    assert!(matches!(&rule.body[0], Statement::Assignment(_)));
    let Statement::If(clause) = &rule.body[1] else {
        panic!("expected if-clause");
    };
    assert!(matches!(&clause.condition.kind, ExprKind::VariableReference(name) if name == "Wide"));
    assert_eq!(clause.body.len(), 2);
    assert!(matches!(&clause.body[1], Statement::If(inner) if inner.else_clause.is_none()));
    assert_eq!(clause.else_clause.as_ref().map(|e| e.body.len()), Some(1));
}

#[test]
fn expression_and_clause_ids_are_unique() {
    let src = "a { width: 1px + 2px; if [TRUE] { height: 3px; } }";
    let sheet = assert_parse_ok(src);
    let rule = sheet.rules().next().expect("rule");
    let mut ids = Vec::new();
    for stmt in &rule.body {
        match stmt {
            Statement::Declaration(decl) => {
                ids.push(decl.expression.id);
                if let ExprKind::Operation { lhs, rhs, .. } = &decl.expression.kind {
                    ids.push(lhs.id);
                    ids.push(rhs.id);
                }
            }
            Statement::If(clause) => {
                ids.push(clause.id);
                ids.push(clause.condition.id);
            }
            Statement::Assignment(_) => {}
        }
    }
    let mut deduped = ids.clone();
    deduped.sort();
    deduped.dedup();
    assert_eq!(deduped.len(), ids.len());
}

#[test]
fn empty_block_is_rejected() {
    assert_eq!(
        parse_errors("a { }"),
        vec!["expected at least one statement in block"]
    );
}

#[test]
fn empty_stylesheet_is_rejected() {
    assert_eq!(
        parse_errors("/* nothing here */"),
        vec!["expected at least one style rule"]
    );
}

#[test]
fn missing_semicolon_is_reported() {
    assert_eq!(
        parse_errors("a { width: 10px }"),
        vec!["expected `;`, found `}`"]
    );
}

#[test]
fn malformed_color_is_reported() {
    assert_eq!(
        parse_errors("a { color: #12345; }"),
        vec!["invalid color literal `#12345`: expected six hex digits"]
    );
}

#[test]
fn parser_recovers_and_reports_later_errors() {
    let errors = parse_errors("a { width: ; }\nb { 5px; }\nc { height: 1px; }");
    assert!(errors.len() >= 2, "errors: {errors:?}");
    assert_eq!(errors[0], "expected a value, found `;`");
    assert_eq!(
        errors[1],
        "expected a declaration, if-clause or variable assignment, found `5px`"
    );
}
