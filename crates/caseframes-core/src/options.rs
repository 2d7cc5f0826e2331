//! Load options.
//!
//! Options are plain serde structs so they can come from a TOML file, from
//! CLI flags, or be built in code. Unspecified keys take their defaults.
//!
//! ```toml
//! allow_any_keys = true
//! strict_references = false
//!
//! [columns]
//! load = ["BUS", "P", "Q"]
//! ```

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::columns::{ColumnTemplates, OverflowPolicy};
use crate::error::{CaseError, CaseResult};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    /// Keep fields outside the recognized set, with positional column names.
    pub allow_any_keys: bool,

    /// Downgrade column overflow on fixed-width fields to a warning.
    pub allow_column_overflow: bool,

    /// Store `bus_name` verbatim as `bus_string` instead of using it as the bus index.
    pub legacy_bus_string: bool,

    /// Dangling branch/gen → bus references fail the load instead of warning.
    pub strict_references: bool,

    /// Column template overrides, keyed by field name.
    pub columns: HashMap<String, Vec<String>>,
}

impl LoadOptions {
    pub fn from_toml_str(text: &str) -> CaseResult<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn from_path(path: &Path) -> CaseResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|err| {
            CaseError::Config(format!("reading {}: {}", path.display(), err))
        })?;
        Self::from_toml_str(&text)
    }

    pub fn with_any_keys(mut self, allow: bool) -> Self {
        self.allow_any_keys = allow;
        self
    }

    pub fn overflow_policy(&self) -> OverflowPolicy {
        if self.allow_column_overflow {
            OverflowPolicy::Suffix
        } else {
            OverflowPolicy::Error
        }
    }

    /// Standard templates with this load's overrides applied.
    pub fn templates(&self) -> ColumnTemplates {
        ColumnTemplates::default().merged(&self.columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let opts = LoadOptions::default();
        assert!(!opts.allow_any_keys);
        assert_eq!(opts.overflow_policy(), OverflowPolicy::Error);
        assert_eq!(opts.templates().get("bus").unwrap().len(), 17);
    }

    #[test]
    fn test_partial_toml() {
        let opts = LoadOptions::from_toml_str(
            r#"
allow_any_keys = true

[columns]
load = ["BUS", "P", "Q"]
"#,
        )
        .unwrap();
        assert!(opts.allow_any_keys);
        assert!(!opts.strict_references);
        assert_eq!(opts.templates().get("load").unwrap(), &["BUS", "P", "Q"]);
    }

    #[test]
    fn test_bad_toml_is_config_error() {
        let err = LoadOptions::from_toml_str("allow_any_keys = 3").unwrap_err();
        assert!(matches!(err, CaseError::Config(_)));
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "allow_column_overflow = true").unwrap();
        let opts = LoadOptions::from_path(file.path()).unwrap();
        assert_eq!(opts.overflow_policy(), OverflowPolicy::Suffix);
    }
}
