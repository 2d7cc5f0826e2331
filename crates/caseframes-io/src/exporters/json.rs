use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::{Context, Result};
use caseframes_core::Case;
use serde_json::{Map, Value as Json};

/// The case as a JSON object: `name` first, then every field in
/// declaration order.
pub fn case_to_json(case: &Case) -> Json {
    let mut root = Map::new();
    if let Some(name) = case.name() {
        root.insert("name".to_string(), Json::String(name.to_string()));
    }
    if let Json::Object(fields) = case.to_dict().to_json() {
        root.extend(fields);
    }
    Json::Object(root)
}

/// Write the case as pretty-printed JSON.
pub fn write_json(case: &Case, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating output directory: {}", parent.display()))?;
    }
    let file = File::create(path)
        .with_context(|| format!("creating JSON output: {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), &case_to_json(case))
        .with_context(|| format!("writing JSON output: {}", path.display()))?;
    tracing::info!(path = %path.display(), "wrote case JSON");
    Ok(())
}
