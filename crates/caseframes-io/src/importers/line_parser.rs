//! Turns one located value span into rows of typed cells.

use caseframes_core::{FieldKind, Row, Value};

/// Cut `line` at the first `%` that is not inside a single-quoted string.
pub fn strip_comment(line: &str) -> &str {
    let mut quoted = false;
    for (i, c) in line.char_indices() {
        match c {
            '\'' => quoted = !quoted,
            '%' if !quoted => return &line[..i],
            _ => {}
        }
    }
    line
}

fn unquote(s: &str) -> &str {
    let s = s.trim();
    for q in ['\'', '"'] {
        if s.len() >= 2 && s.starts_with(q) && s.ends_with(q) {
            return &s[1..s.len() - 1];
        }
    }
    s
}

fn is_quoted(s: &str) -> bool {
    unquote(s).len() != s.trim().len()
}

/// Parse a value span into rows, one per non-empty source line.
///
/// Matrix lines are split on whitespace and every token goes through
/// [`Value::infer`]. String lists give one unquoted string per line. Scalar
/// lines are strings when quoted and inferred otherwise.
pub fn parse_rows(span: &str, kind: FieldKind) -> Vec<Row> {
    span.lines()
        .map(|line| strip_comment(line).replace(';', ""))
        .filter(|line| !line.trim().is_empty())
        .map(|line| match kind {
            FieldKind::Matrix => line.split_whitespace().map(Value::infer).collect(),
            FieldKind::StringList => vec![Value::Str(unquote(&line).to_string())],
            FieldKind::Scalar if is_quoted(&line) => vec![Value::Str(unquote(&line).to_string())],
            FieldKind::Scalar => vec![Value::infer(line.trim())],
        })
        .collect()
}
