//! Field locator for MATPOWER case text.
//!
//! Finds `mpc.<name> = ...` declarations and the raw text span of each
//! value. Matching is done on the literal text: comments are only removed
//! later by the line parser, so a `]` or `}` inside a comment on a
//! terminating line can end a span early.

use caseframes_core::{field_kind, CaseError, CaseResult, FieldKind};
use once_cell::sync::Lazy;
use regex::Regex;

static NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"function\s*mpc\s*=\s*(.*?)\r?\n").expect("valid regex"));

static FIELD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bmpc\.([A-Za-z_][A-Za-z0-9_]*(?:\.[A-Za-z_][A-Za-z0-9_]*)*)\s*=[^=]")
        .expect("valid regex")
});

/// A declared field: its dotted name and where the declaration starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub name: String,
    pub offset: usize,
}

/// Span lookups over one case text.
#[derive(Debug, Clone, Copy)]
pub struct Locator<'a> {
    text: &'a str,
}

impl<'a> Locator<'a> {
    pub fn new(text: &'a str) -> Self {
        Locator { text }
    }

    /// Display name from `function mpc = <name>`.
    pub fn case_name(&self) -> Option<String> {
        NAME_RE
            .captures(self.text)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string())
            .filter(|name| !name.is_empty())
    }

    /// Every `mpc.<name> =` declaration in source order, repeats included.
    pub fn declarations(&self) -> Vec<Declaration> {
        FIELD_RE
            .captures_iter(self.text)
            .filter_map(|c| c.get(1))
            .map(|m| Declaration {
                name: m.as_str().to_string(),
                offset: m.start(),
            })
            .collect()
    }

    /// 1-based line number of a byte offset.
    pub fn line_of(&self, offset: usize) -> usize {
        self.text[..offset.min(self.text.len())]
            .bytes()
            .filter(|b| *b == b'\n')
            .count()
            + 1
    }

    /// Value span of a recognized field, or `None` when it has no value.
    pub fn span(&self, name: &str) -> CaseResult<Option<&'a str>> {
        let kind = field_kind(name)
            .ok_or_else(|| CaseError::UnrecognizedFieldName(name.to_string()))?;
        Ok(self.span_as(name, kind))
    }

    /// Value span of `name` read as `kind`.
    pub fn span_as(&self, name: &str, kind: FieldKind) -> Option<&'a str> {
        let name = regex::escape(name);
        let pattern = match kind {
            FieldKind::Matrix => format!(r"(?s)\bmpc\.{}\s*=\s*\[\n?(.*?)\n?\];", name),
            FieldKind::StringList => format!(r"(?s)\bmpc\.{}\s*=\s*\{{\n?(.*?)\n?\}};", name),
            FieldKind::Scalar => format!(r"(?s)\bmpc\.{}\s*=\s*(.*?);", name),
        };
        // the escaped name keeps the pattern valid
        let re = Regex::new(&pattern).ok()?;
        re.captures(self.text)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str())
    }

    /// Guess the kind of an unrecognized field from the first character
    /// of its value.
    pub fn infer_kind(&self, name: &str) -> Option<FieldKind> {
        let pattern = format!(r"\bmpc\.{}\s*=\s*(\S)", regex::escape(name));
        let re = Regex::new(&pattern).ok()?;
        let first = re.captures(self.text)?.get(1)?.as_str();
        Some(match first {
            "[" => FieldKind::Matrix,
            "{" => FieldKind::StringList,
            _ => FieldKind::Scalar,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CASE: &str = "function mpc = case3
%% system MVA base
mpc.version = '2';
mpc.baseMVA = 100;

%% bus data
mpc.bus = [
\t1\t3\t0\t0;
\t2\t1\t90\t30;  % load bus
];

mpc.gencost = [
\t2\t0\t0\t3\t0.11\t5\t150;
];

mpc.bus_name = {
\t'Alpha';
\t'Beta';
};
";

    #[test]
    fn test_case_name() {
        assert_eq!(Locator::new(CASE).case_name().as_deref(), Some("case3"));
        assert_eq!(Locator::new("mpc.baseMVA = 1;").case_name(), None);
    }

    #[test]
    fn test_declarations_in_order() {
        let names: Vec<_> = Locator::new(CASE)
            .declarations()
            .into_iter()
            .map(|d| d.name)
            .collect();
        assert_eq!(names, vec!["version", "baseMVA", "bus", "gencost", "bus_name"]);
    }

    #[test]
    fn test_declarations_keep_repeats_and_skip_indexing() {
        let text = "mpc.bus = [1 3];\nmpc.bus(1, 2) = 2;\nmpc.reserves.zones = [1];\nmpc.bus = [2 3];\n";
        let names: Vec<_> = Locator::new(text)
            .declarations()
            .into_iter()
            .map(|d| d.name)
            .collect();
        assert_eq!(names, vec!["bus", "reserves.zones", "bus"]);
    }

    #[test]
    fn test_spans() {
        let locator = Locator::new(CASE);
        assert_eq!(locator.span("version").unwrap(), Some("'2'"));
        assert_eq!(locator.span("baseMVA").unwrap(), Some("100"));
        let bus = locator.span("bus").unwrap().unwrap();
        assert!(bus.starts_with("\t1\t3"));
        assert!(bus.ends_with("% load bus"));
        let names = locator.span("bus_name").unwrap().unwrap();
        assert_eq!(names.lines().count(), 2);
    }

    #[test]
    fn test_gen_does_not_match_gencost() {
        assert_eq!(Locator::new(CASE).span("gen").unwrap(), None);
    }

    #[test]
    fn test_unrecognized_name() {
        let err = Locator::new(CASE).span("foo").unwrap_err();
        assert!(matches!(err, CaseError::UnrecognizedFieldName(ref n) if n == "foo"));
    }

    #[test]
    fn test_infer_kind() {
        let text = "mpc.areas = [1 5];\nmpc.tags = {'a'};\nmpc.note = 'x';\n";
        let locator = Locator::new(text);
        assert_eq!(locator.infer_kind("areas"), Some(FieldKind::Matrix));
        assert_eq!(locator.infer_kind("tags"), Some(FieldKind::StringList));
        assert_eq!(locator.infer_kind("note"), Some(FieldKind::Scalar));
        assert_eq!(locator.infer_kind("missing"), None);
    }

    #[test]
    fn test_bracket_in_comment_ends_span_early() {
        // known limitation: brackets are matched on raw text
        let text = "mpc.bus = [\n1 3 0;\n2 1 0; % see [ref];\n3 1 0;\n];\n";
        let span = Locator::new(text).span("bus").unwrap().unwrap();
        assert!(!span.contains("3 1 0"));
    }

    #[test]
    fn test_line_of() {
        let locator = Locator::new(CASE);
        let decl = locator
            .declarations()
            .into_iter()
            .find(|d| d.name == "bus")
            .unwrap();
        assert_eq!(locator.line_of(decl.offset), 7);
    }
}
