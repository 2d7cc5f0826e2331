//! Case conversion to JSON or a directory of CSV tables.

use std::path::Path;

use anyhow::{Context, Result};
use caseframes_cli::ConvertFormat;
use caseframes_core::LoadOptions;
use caseframes_io::{write_csv_dir, write_json};
use tracing::info;

pub fn handle(
    case_path: &Path,
    to: ConvertFormat,
    output: &Path,
    per_unit: bool,
    reset_index: bool,
    options: &LoadOptions,
) -> Result<()> {
    let mut case = super::load(case_path, options)?.case;

    if reset_index {
        case.reset_index().context("resetting row labels")?;
    }
    if per_unit {
        case = case.to_per_unit().context("converting to per-unit")?;
    }

    match to {
        ConvertFormat::Json => {
            write_json(&case, output)?;
            println!("Wrote {}", output.display());
        }
        ConvertFormat::Csv => {
            let written = write_csv_dir(&case, output)?;
            info!(files = written.len(), "wrote csv tables");
            println!("Wrote {} files to {}", written.len(), output.display());
        }
    }
    Ok(())
}
