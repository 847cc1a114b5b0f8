use std::path::Path;

use crate::ast::NodeId;
use crate::span::Span;

#[derive(Clone, Debug, PartialEq)]
pub struct Diag {
    pub message: String,
    pub span: Span,
    /// The AST node the diagnostic is attached to. Lexer and parser
    /// diagnostics have no node.
    pub node: Option<NodeId>,
}

impl Diag {
    /// Renders the diagnostic as `error: <message> (<path>:<line>:<col>)`
    /// followed by the offending source line and a caret.
    pub fn render(&self, path: Option<&Path>, src: &str) -> String {
        let (line, col, line_text) = line_info(src, self.span.start);
        let location = match path {
            Some(path) => format!("{}:{line}:{col}", path.display()),
            None => format!("{line}:{col}"),
        };
        let mut out = format!("error: {} ({location})\n", self.message);
        out.push_str(&format!("  {line_text}\n"));
        out.push_str(&format!("  {}^", " ".repeat(col.saturating_sub(1))));
        out
    }
}

#[derive(Default, Debug)]
pub struct Diagnostics {
    diags: Vec<Diag>,
}

impl Diagnostics {
    pub fn error<S: Into<String>>(&mut self, span: Span, message: S) {
        self.diags.push(Diag {
            message: message.into(),
            span,
            node: None,
        });
    }

    pub fn error_at<S: Into<String>>(&mut self, node: NodeId, span: Span, message: S) {
        self.diags.push(Diag {
            message: message.into(),
            span,
            node: Some(node),
        });
    }

    pub fn len(&self) -> usize {
        self.diags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diags.is_empty()
    }

    pub fn into_vec(self) -> Vec<Diag> {
        self.diags
    }
}

/// 1-based line and column of `offset`, plus the text of that line.
pub fn line_info(src: &str, offset: usize) -> (usize, usize, &str) {
    let offset = offset.min(src.len());
    let mut line = 1usize;
    let mut line_start = 0usize;
    for (idx, byte) in src.bytes().enumerate() {
        if idx >= offset {
            break;
        }
        if byte == b'\n' {
            line += 1;
            line_start = idx + 1;
        }
    }
    let line_end = src[line_start..]
        .find('\n')
        .map(|rel| line_start + rel)
        .unwrap_or(src.len());
    let col = src[line_start..offset].chars().count() + 1;
    (line, col, src[line_start..line_end].trim_end_matches('\r'))
}
