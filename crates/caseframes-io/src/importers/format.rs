//! Source format detection.

use std::path::{Path, PathBuf};

use caseframes_core::{CaseError, CaseResult};

/// Case file formats the loader understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// MATPOWER `.m` case text
    Matpower,
    /// A JSON field dictionary, as written by the JSON exporter
    Json,
}

impl SourceFormat {
    pub const ALL: &'static [SourceFormat] = &[SourceFormat::Matpower, SourceFormat::Json];

    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            SourceFormat::Matpower => &["m"],
            SourceFormat::Json => &["json"],
        }
    }

    /// Detect the format from a file extension.
    pub fn from_path(path: &Path) -> Option<SourceFormat> {
        let ext = path.extension()?.to_str()?;
        Self::ALL
            .iter()
            .find(|f| f.extensions().iter().any(|e| e.eq_ignore_ascii_case(ext)))
            .copied()
    }
}

impl std::fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceFormat::Matpower => write!(f, "MATPOWER case"),
            SourceFormat::Json => write!(f, "JSON field dictionary"),
        }
    }
}

/// Resolve the file to read and its format.
///
/// A path with no extension that does not exist as given is looked up as
/// `<path>.m`, so `case9` finds `case9.m`.
pub fn resolve_source(path: &Path) -> CaseResult<(PathBuf, SourceFormat)> {
    if path.extension().is_none() {
        let with_m = path.with_extension("m");
        if !path.is_file() && with_m.is_file() {
            return Ok((with_m, SourceFormat::Matpower));
        }
        return Ok((path.to_path_buf(), SourceFormat::Matpower));
    }
    SourceFormat::from_path(path)
        .map(|format| (path.to_path_buf(), format))
        .ok_or_else(|| {
            CaseError::UnsupportedSourceType(format!(
                "{} (expected .m or .json)",
                path.display()
            ))
        })
}
