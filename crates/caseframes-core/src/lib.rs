//! # caseframes-core: MATPOWER Case Tables
//!
//! Turns the named fields of a MATPOWER case (`bus`, `gen`, `branch`,
//! `gencost`, ...) into labeled tables and provides whole-case transforms.
//!
//! ## Design Philosophy
//!
//! Parsing text is a separate concern from building tables:
//! - A [`CaseParser`] turns source text into an ordered [`FieldMap`]
//!   (the built-in MATPOWER parser lives in `caseframes-io`)
//! - [`Case::from_fields`] resolves column names, builds [`Table`]s and
//!   attaches row labels across tables
//! - [`Case::to_dict`] produces the same [`FieldMap`] shape again, so any
//!   case survives a round trip through JSON or another engine
//!
//! ## Quick Start
//!
//! ```rust
//! use caseframes_core::*;
//!
//! let mut fields = FieldMap::new();
//! fields.insert("baseMVA", FieldValue::Scalar(Value::Int(100)));
//! fields.insert(
//!     "gencost",
//!     FieldValue::Matrix(vec![[2.0, 0.0, 0.0, 3.0, 0.01, 0.3, 15.0]
//!         .iter()
//!         .map(|x| Value::from_f64(*x))
//!         .collect()]),
//! );
//!
//! let import = Case::from_fields(None, fields, &LoadOptions::default()).unwrap();
//! let gencost = import.case.gencost().unwrap();
//! assert_eq!(
//!     gencost.columns(),
//!     &["MODEL", "STARTUP", "SHUTDOWN", "NCOST", "C2", "C1", "C0"]
//! );
//! ```
//!
//! ## Column Naming
//!
//! Standard fields use fixed templates (17 bus columns, 25 gen, 21 branch,
//! 23 dcline). Narrower rows take a prefix of the template. Cost tables grow
//! a tail named after the first row's cost model:
//! - **Polynomial** (`MODEL = 2`): `C{n-1} .. C0`
//! - **Piecewise linear** (`MODEL = 1`): `X1, Y1, X2, Y2, ..`
//!
//! ## Modules
//!
//! - [`case`] - The [`Case`] aggregator, index reset and per-unit conversion
//! - [`columns`] - Column templates and the resolver
//! - [`diagnostics`] - Non-fatal issues found while loading
//! - [`units`] - Per-unit scaling rules

pub mod case;
pub mod columns;
pub mod diagnostics;
pub mod error;
pub mod fields;
pub mod options;
pub mod reserves;
pub mod table;
pub mod units;
pub mod value;
pub mod xgd;

pub use case::{Case, CaseField, CaseImport};
pub use columns::{resolve_columns, ColumnTemplates, CostModel, OverflowPolicy};
pub use diagnostics::{Diagnostics, Issue, IssueKind};
pub use error::{CaseError, CaseResult};
pub use fields::{
    field_kind, is_known_field, CaseParser, CaseSource, FieldKind, FieldMap, FieldValue,
    ParsedCase,
};
pub use options::LoadOptions;
pub use reserves::Reserves;
pub use table::{RowIndex, Table};
pub use units::Quantity;
pub use value::{Row, Value};
pub use xgd::XGenDataTable;
