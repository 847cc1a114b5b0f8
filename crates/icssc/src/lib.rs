pub mod ast;
pub mod diag;
pub mod generator;
pub mod lexer;
pub mod parser;
pub mod sema;
pub mod span;
pub mod token;
pub mod transform;

use crate::ast::Stylesheet;
use crate::diag::{Diag, Diagnostics};
use crate::transform::FoldError;

pub fn parse_source(src: &str) -> (Stylesheet, Vec<Diag>) {
    let mut diags = Diagnostics::default();
    let tokens = lexer::lex(src, &mut diags);
    let mut parser = parser::Parser::new(&tokens, &mut diags);
    let sheet = parser.parse_stylesheet();
    (sheet, diags.into_vec())
}

/// Parses and, if parsing was clean, type checks `src`.
pub fn check_source(src: &str) -> (Stylesheet, Vec<Diag>) {
    let (sheet, diags) = parse_source(src);
    if !diags.is_empty() {
        return (sheet, diags);
    }
    let diags = sema::analyze(&sheet);
    (sheet, diags)
}

#[derive(Clone, Copy, Debug, Default)]
pub struct CompileOptions {
    /// Replace each if/else by the branch its condition selects.
    pub select_branches: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("{} error(s) reported", .0.len())]
    Diagnostics(Vec<Diag>),
    #[error("internal error: {0}")]
    Fold(#[from] FoldError),
}

/// Runs the whole pipeline and returns the generated stylesheet text.
pub fn compile(src: &str, options: &CompileOptions) -> Result<String, CompileError> {
    let (mut sheet, diags) = check_source(src);
    if !diags.is_empty() {
        tracing::debug!(count = diags.len(), "compilation stopped on diagnostics");
        return Err(CompileError::Diagnostics(diags));
    }
    fold_and_select(&mut sheet, options)?;
    let out = generator::generate(&sheet);
    tracing::debug!(rules = sheet.rules().count(), bytes = out.len(), "generated stylesheet");
    Ok(out)
}

/// Folds a checked stylesheet and, if requested, selects branches. Arithmetic
/// overflow comes back as a diagnostic on the operation that overflowed.
pub fn fold_and_select(
    sheet: &mut Stylesheet,
    options: &CompileOptions,
) -> Result<(), CompileError> {
    match transform::fold(sheet) {
        Ok(()) => {}
        Err(FoldError::Overflow { op, node, span }) => {
            return Err(CompileError::Diagnostics(vec![Diag {
                message: format!("Arithmetic overflow in '{op}' operation"),
                span,
                node: Some(node),
            }]));
        }
        Err(err) => return Err(err.into()),
    }
    if options.select_branches {
        transform::select_branches(sheet)?;
    }
    Ok(())
}
