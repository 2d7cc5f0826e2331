use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use caseframes_core::{Case, Table};
use csv::Writer;

/// Write every table to `<dir>/<table>.csv` and the case scalars to
/// `<dir>/case.csv`. Returns the written paths.
///
/// Each table file starts with the index column (named after the index),
/// followed by the table's columns.
pub fn write_csv_dir(case: &Case, dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)
        .with_context(|| format!("creating output directory: {}", dir.display()))?;
    let mut written = Vec::new();

    let case_path = dir.join("case.csv");
    let mut writer = Writer::from_path(&case_path)
        .with_context(|| format!("creating {}", case_path.display()))?;
    writer.write_record(["name", "version", "baseMVA"])?;
    writer.write_record([
        case.name().unwrap_or_default().to_string(),
        case.version().unwrap_or_default().to_string(),
        case.base_mva().map(|b| b.to_string()).unwrap_or_default(),
    ])?;
    writer
        .flush()
        .with_context(|| format!("flushing {}", case_path.display()))?;
    written.push(case_path);

    for table in case.tables() {
        let path = dir.join(format!("{}.csv", table.name()));
        write_table(table, &path)?;
        written.push(path);
    }
    tracing::info!(dir = %dir.display(), files = written.len(), "wrote CSV directory");
    Ok(written)
}

fn write_table(table: &Table, path: &Path) -> Result<()> {
    let mut writer =
        Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;
    let header = std::iter::once(table.index().name.as_str())
        .chain(table.columns().iter().map(String::as_str));
    writer.write_record(header)?;
    for (label, row) in table.index().labels.iter().zip(table.rows()) {
        let record = std::iter::once(label.to_string()).chain(row.iter().map(|v| v.to_string()));
        writer
            .write_record(record)
            .with_context(|| format!("writing {}", path.display()))?;
    }
    writer
        .flush()
        .with_context(|| format!("flushing {}", path.display()))?;
    Ok(())
}
