pub mod check;
pub mod scope;
pub mod types;

use crate::ast::Stylesheet;
use crate::diag::{Diag, Diagnostics};

/// Type checks `sheet` and returns every diagnostic found. Never stops at the
/// first error.
pub fn analyze(sheet: &Stylesheet) -> Vec<Diag> {
    let mut diags = Diagnostics::default();
    let mut checker = check::Checker::new(&mut diags);
    checker.check_stylesheet(sheet);
    tracing::debug!(diagnostics = diags.len(), "type check finished");
    diags.into_vec()
}
