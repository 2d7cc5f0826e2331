//! Built-in MATPOWER text parser and file loaders.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use caseframes_core::{
    field_kind, Case, CaseImport, CaseParser, CaseResult, CaseSource, Diagnostics, FieldKind,
    FieldValue, IssueKind, LoadOptions, ParsedCase,
};

use super::format::{resolve_source, SourceFormat};
use super::line_parser::parse_rows;
use super::locator::Locator;

/// Locator + line parser over MATPOWER `.m` text.
#[derive(Debug, Clone, Copy, Default)]
pub struct MatpowerParser;

impl CaseParser for MatpowerParser {
    fn parse(&self, text: &str, options: &LoadOptions) -> CaseResult<ParsedCase> {
        let locator = Locator::new(text);
        let mut diagnostics = Diagnostics::new();
        let mut parsed = ParsedCase {
            name: locator.case_name(),
            ..Default::default()
        };

        for decl in locator.declarations() {
            let name = decl.name.as_str();
            if parsed.fields.get_path(name).is_some() {
                tracing::debug!(field = name, "field declared again; keeping the first value");
                continue;
            }
            let line = locator.line_of(decl.offset);

            let kind = match field_kind(name) {
                Some(kind) => kind,
                None if options.allow_any_keys => match locator.infer_kind(name) {
                    Some(kind) => kind,
                    None => {
                        diagnostics.warn_at(IssueKind::FieldNotFound, name, line, "no value found");
                        continue;
                    }
                },
                None => {
                    diagnostics.warn_at(
                        IssueKind::UnknownField,
                        name,
                        line,
                        "not a recognized case field; enable allow_any_keys to keep it",
                    );
                    continue;
                }
            };
            let span = match field_kind(name) {
                Some(_) => locator.span(name)?,
                None => locator.span_as(name, kind),
            };
            let Some(span) = span else {
                diagnostics.warn_at(IssueKind::FieldNotFound, name, line, "no value span found");
                continue;
            };

            let mut rows = parse_rows(span, kind);
            let value = match kind {
                FieldKind::Matrix => FieldValue::Matrix(rows),
                FieldKind::StringList => FieldValue::Strings(
                    rows.into_iter()
                        .filter_map(|mut r| r.pop())
                        .map(|cell| cell.to_string())
                        .collect(),
                ),
                FieldKind::Scalar if rows.len() > 1 => FieldValue::Matrix(rows),
                FieldKind::Scalar => match rows.pop().and_then(|mut r| r.pop()) {
                    Some(cell) => FieldValue::Scalar(cell),
                    None => {
                        diagnostics.warn_at(IssueKind::FieldNotFound, name, line, "empty value");
                        continue;
                    }
                },
            };
            tracing::trace!(field = name, kind = ?kind, "parsed field");
            parsed.fields.insert_path(name, value);
        }

        parsed.diagnostics = diagnostics;
        Ok(parsed)
    }
}

/// Parse MATPOWER text into a case.
pub fn load_case_str(text: &str, options: &LoadOptions) -> CaseResult<CaseImport> {
    Case::from_source(CaseSource::Text(text.to_string()), &MatpowerParser, options)
}

/// Load a case file.
///
/// `.m` files go through [`MatpowerParser`], `.json` files are read as a
/// field dictionary. A path without an extension is tried as `<path>.m`.
pub fn load_case_file(path: &Path, options: &LoadOptions) -> Result<CaseImport> {
    let (path, format) = resolve_source(path)?;
    let content = fs::read_to_string(&path)
        .with_context(|| format!("reading case file: {}", path.display()))?;
    let source = match format {
        SourceFormat::Matpower => CaseSource::Text(content),
        SourceFormat::Json => CaseSource::Json(
            serde_json::from_str(&content)
                .with_context(|| format!("parsing JSON case: {}", path.display()))?,
        ),
    };
    let mut import = Case::from_source(source, &MatpowerParser, options)
        .with_context(|| format!("loading case: {}", path.display()))?;
    if import.case.name().is_none() {
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            import.case.set_name(stem);
        }
    }
    tracing::info!(
        path = %path.display(),
        fields = import.case.attributes().len(),
        warnings = import.diagnostics.warning_count(),
        "loaded case"
    );
    Ok(import)
}
