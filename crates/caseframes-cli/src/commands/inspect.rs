//! Case inspection: scalars, tables and their column labels.

use std::io::{self, Write};
use std::path::Path;

use anyhow::Result;
use caseframes_core::{Case, LoadOptions, Table};
use serde::Serialize;
use tabwriter::TabWriter;

#[derive(Serialize)]
struct TableSummary<'a> {
    name: &'a str,
    index: &'a str,
    rows: usize,
    columns: &'a [String],
}

#[derive(Serialize)]
struct CaseSummary<'a> {
    name: Option<&'a str>,
    version: Option<&'a str>,
    #[serde(rename = "baseMVA")]
    base_mva: Option<f64>,
    attributes: &'a [String],
    tables: Vec<TableSummary<'a>>,
    warnings: usize,
}

fn summarize<'a>(case: &'a Case, warnings: usize) -> CaseSummary<'a> {
    CaseSummary {
        name: case.name(),
        version: case.version(),
        base_mva: case.base_mva(),
        attributes: case.attributes(),
        tables: case.tables().into_iter().map(table_summary).collect(),
        warnings,
    }
}

fn table_summary(table: &Table) -> TableSummary<'_> {
    TableSummary {
        name: table.name(),
        index: &table.index().name,
        rows: table.n_rows(),
        columns: table.columns(),
    }
}

pub fn handle(case_path: &Path, json: bool, options: &LoadOptions) -> Result<()> {
    let import = super::load(case_path, options)?;
    let summary = summarize(&import.case, import.diagnostics.warning_count());

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    let mut tw = TabWriter::new(io::stdout());
    writeln!(tw, "name\t{}", summary.name.unwrap_or("-"))?;
    writeln!(tw, "version\t{}", summary.version.unwrap_or("-"))?;
    match summary.base_mva {
        Some(base) => writeln!(tw, "baseMVA\t{base}")?,
        None => writeln!(tw, "baseMVA\t-")?,
    }
    writeln!(tw, "fields\t{}", summary.attributes.join(","))?;
    for name in summary.attributes {
        if matches!(name.as_str(), "version" | "baseMVA") {
            continue;
        }
        if let Some(value) = import.case.scalar(name) {
            writeln!(tw, "{name}\t{value}")?;
        }
    }
    writeln!(tw)?;
    writeln!(tw, "TABLE\tINDEX\tROWS\tCOLUMNS")?;
    for table in &summary.tables {
        writeln!(
            tw,
            "{}\t{}\t{}\t{}",
            table.name,
            table.index,
            table.rows,
            table.columns.join(",")
        )?;
    }
    tw.flush()?;
    Ok(())
}
