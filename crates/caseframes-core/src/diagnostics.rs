//! Non-fatal issues collected while loading a case.
//!
//! Loading keeps going past advisory conditions (a cost table whose rows
//! disagree on the cost model, a field the parser could not find, a branch
//! pointing at a bus that does not exist). Each one is recorded here and
//! mirrored to `tracing` so callers can either inspect the list or just read
//! the log.
//!
//! ```
//! use caseframes_core::diagnostics::{Diagnostics, IssueKind};
//!
//! let mut diag = Diagnostics::new();
//! diag.warn(IssueKind::FieldNotFound, "gencost", "no value span");
//! assert_eq!(diag.warning_count(), 1);
//! assert!(diag.has(IssueKind::FieldNotFound));
//! ```

use serde::Serialize;

/// What went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum IssueKind {
    /// Rows of one cost table declare different cost models.
    MixedCostModel,
    /// Row width exceeded the template and overflow was relaxed.
    ColumnOverflow,
    /// A declared field had no locatable value.
    FieldNotFound,
    /// A field outside the recognized set was skipped.
    UnknownField,
    /// An id did not resolve in the referenced table.
    DanglingReference,
    /// A short cost row was padded with NaN.
    PaddedRow,
}

/// A single issue encountered during a load
#[derive(Debug, Clone, Serialize)]
pub struct Issue {
    pub kind: IssueKind,
    pub field: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
}

impl std::fmt::Display for Issue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[warning:{}] {}", self.field, self.message)?;
        if let Some(line) = self.line {
            write!(f, " at line {}", line)?;
        }
        Ok(())
    }
}

/// Issues collected for one load
#[derive(Debug, Clone, Default, Serialize)]
pub struct Diagnostics {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<Issue>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a warning and log it.
    pub fn warn(&mut self, kind: IssueKind, field: &str, message: &str) {
        tracing::warn!(field, "{}", message);
        self.issues.push(Issue {
            kind,
            field: field.to_string(),
            message: message.to_string(),
            line: None,
        });
    }

    /// Record a warning tied to a 1-based source line.
    pub fn warn_at(&mut self, kind: IssueKind, field: &str, line: usize, message: &str) {
        tracing::warn!(field, line, "{}", message);
        self.issues.push(Issue {
            kind,
            field: field.to_string(),
            message: message.to_string(),
            line: Some(line),
        });
    }

    pub fn warning_count(&self) -> usize {
        self.issues.len()
    }

    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }

    /// True if any issue of `kind` was recorded.
    pub fn has(&self, kind: IssueKind) -> bool {
        self.issues.iter().any(|i| i.kind == kind)
    }

    /// Issues of one kind.
    pub fn of_kind(&self, kind: IssueKind) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(move |i| i.kind == kind)
    }

    /// Append issues from a later stage (parser output followed by aggregation).
    pub fn merge(&mut self, other: Diagnostics) {
        self.issues.extend(other.issues);
    }
}

impl std::fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for issue in &self.issues {
            writeln!(f, "{}", issue)?;
        }
        Ok(())
    }
}
