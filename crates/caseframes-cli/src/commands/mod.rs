pub mod columns;
pub mod convert;
pub mod inspect;

use std::path::Path;

use anyhow::Result;
use caseframes_core::{CaseImport, LoadOptions};

/// Load a case and report its diagnostics on stderr.
pub fn load(path: &Path, options: &LoadOptions) -> Result<CaseImport> {
    let import = caseframes_io::load_case_file(path, options)?;
    for issue in &import.diagnostics.issues {
        eprintln!("{issue}");
    }
    Ok(import)
}
