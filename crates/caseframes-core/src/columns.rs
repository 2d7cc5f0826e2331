//! Column templates and the column resolver.
//!
//! Every standard MATPOWER matrix has a fixed column layout. Parsed rows are
//! matched against those layouts here: narrow rows take a prefix of the
//! template, and the two cost tables grow extra columns whose names depend on
//! the declared cost model.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::diagnostics::{Diagnostics, IssueKind};
use crate::error::{CaseError, CaseResult};
use crate::value::{Row, Value};

pub const BUS_COLUMNS: &[&str] = &[
    "BUS_I", "BUS_TYPE", "PD", "QD", "GS", "BS", "BUS_AREA", "VM", "VA", "BASE_KV", "ZONE",
    "VMAX", "VMIN", "LAM_P", "LAM_Q", "MU_VMAX", "MU_VMIN",
];

pub const GEN_COLUMNS: &[&str] = &[
    "GEN_BUS", "PG", "QG", "QMAX", "QMIN", "VG", "MBASE", "GEN_STATUS", "PMAX", "PMIN", "PC1",
    "PC2", "QC1MIN", "QC1MAX", "QC2MIN", "QC2MAX", "RAMP_AGC", "RAMP_10", "RAMP_30", "RAMP_Q",
    "APF", "MU_PMAX", "MU_PMIN", "MU_QMAX", "MU_QMIN",
];

pub const BRANCH_COLUMNS: &[&str] = &[
    "F_BUS", "T_BUS", "BR_R", "BR_X", "BR_B", "RATE_A", "RATE_B", "RATE_C", "TAP", "SHIFT",
    "BR_STATUS", "ANGMIN", "ANGMAX", "PF", "QF", "PT", "QT", "MU_SF", "MU_ST", "MU_ANGMIN",
    "MU_ANGMAX",
];

pub const DCLINE_COLUMNS: &[&str] = &[
    "F_BUS", "T_BUS", "BR_STATUS", "PF", "PT", "QF", "QT", "VF", "VT", "PMIN", "PMAX", "QMINF",
    "QMAXF", "QMINT", "QMAXT", "LOSS0", "LOSS1", "MU_PMIN", "MU_PMAX", "MU_QMINF", "MU_QMAXF",
    "MU_QMINT", "MU_QMAXT",
];

/// `COST` is a placeholder for the variable-width tail.
pub const COST_COLUMNS: &[&str] = &["MODEL", "STARTUP", "SHUTDOWN", "NCOST", "COST"];

/// Number of fixed leading columns in a standard cost table.
pub const COST_FIXED: usize = 4;

pub const IF_MAP_COLUMNS: &[&str] = &["IFNUM", "BRANCHIDX"];
pub const IF_LIMS_COLUMNS: &[&str] = &["IFNUM", "LOWER", "UPPER"];
pub const RESERVES_REQ_COLUMNS: &[&str] = &["PREQ"];
pub const RESERVES_COST_COLUMNS: &[&str] = &["C1"];
pub const RESERVES_QTY_COLUMNS: &[&str] = &["PQTY"];

/// Cost model codes in the `MODEL` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CostModel {
    PiecewiseLinear = 1,
    Polynomial = 2,
}

impl CostModel {
    /// Anything other than the piecewise-linear code reads as polynomial.
    pub fn from_cell(cell: &Value) -> CostModel {
        match cell.as_i64() {
            Some(1) => CostModel::PiecewiseLinear,
            _ => CostModel::Polynomial,
        }
    }
}

/// True for the two tables whose width depends on the cost model.
pub fn is_cost_field(name: &str) -> bool {
    matches!(name, "gencost" | "dclinecost")
}

/// Name → column template lookup.
///
/// Each loader gets its own copy, so per-call overrides never leak into
/// other parses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnTemplates {
    templates: HashMap<String, Vec<String>>,
}

impl Default for ColumnTemplates {
    fn default() -> Self {
        let standard: &[(&str, &[&str])] = &[
            ("bus", BUS_COLUMNS),
            ("gen", GEN_COLUMNS),
            ("branch", BRANCH_COLUMNS),
            ("dcline", DCLINE_COLUMNS),
            ("gencost", COST_COLUMNS),
            ("dclinecost", COST_COLUMNS),
            ("if.map", IF_MAP_COLUMNS),
            ("if.lims", IF_LIMS_COLUMNS),
            ("reserves.req", RESERVES_REQ_COLUMNS),
            ("reserves.cost", RESERVES_COST_COLUMNS),
            ("reserves.qty", RESERVES_QTY_COLUMNS),
            ("bus_name", &["BUS_NAME"]),
            ("branch_name", &["BRANCH_NAME"]),
            ("gen_name", &["GEN_NAME"]),
        ];
        let templates = standard
            .iter()
            .map(|(name, cols)| {
                (
                    name.to_string(),
                    cols.iter().map(|c| c.to_string()).collect(),
                )
            })
            .collect();
        Self { templates }
    }
}

impl ColumnTemplates {
    /// Templates with nothing registered; every field gets positional names.
    pub fn empty() -> Self {
        Self {
            templates: HashMap::new(),
        }
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.templates.get(field).map(|v| v.as_slice())
    }

    pub fn insert(&mut self, field: impl Into<String>, columns: Vec<String>) {
        self.templates.insert(field.into(), columns);
    }

    /// Overlay `overrides` on top of these templates.
    pub fn merged(&self, overrides: &HashMap<String, Vec<String>>) -> Self {
        let mut merged = self.clone();
        for (field, columns) in overrides {
            merged.insert(field.clone(), columns.clone());
        }
        merged
    }

    /// The template for `field`, or `0, 1, ..` of `width` when none is registered.
    pub fn template_or_positional(&self, field: &str, width: usize) -> Vec<String> {
        match self.get(field) {
            Some(cols) => cols.to_vec(),
            None => positional(width),
        }
    }
}

/// Positional integer column names.
pub fn positional(width: usize) -> Vec<String> {
    (0..width).map(|i| i.to_string()).collect()
}

/// What to do when a fixed-width field has more columns than its template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverflowPolicy {
    #[default]
    Error,
    /// Warn, then suffix the last template name: `LAST_k .. LAST_0`.
    Suffix,
}

/// Resolve the final column names for `field` given its parsed rows.
pub fn resolve_columns(
    field: &str,
    rows: &[Row],
    templates: &ColumnTemplates,
    policy: OverflowPolicy,
    diag: &mut Diagnostics,
) -> CaseResult<Vec<String>> {
    let n_cols = rows.iter().map(|r| r.len()).max().unwrap_or(0);
    let template = templates.template_or_positional(field, n_cols);

    if is_cost_field(field) {
        let fixed = cost_fixed_part(&template);
        if n_cols > fixed.len() {
            let mut columns = fixed.to_vec();
            columns.extend(cost_columns(field, rows, n_cols - fixed.len(), diag));
            return Ok(columns);
        }
    }

    if n_cols <= template.len() {
        return Ok(template[..n_cols].to_vec());
    }

    match policy {
        OverflowPolicy::Error => Err(CaseError::ColumnOverflow {
            field: field.to_string(),
            observed: n_cols,
            expected: template.len(),
        }),
        OverflowPolicy::Suffix => {
            diag.warn(
                IssueKind::ColumnOverflow,
                field,
                &format!(
                    "{} columns observed, {} expected; naming extras after the last column",
                    n_cols,
                    template.len()
                ),
            );
            Ok(suffixed(&template, n_cols))
        }
    }
}

/// The leading columns of a cost template, without the `COST` placeholder.
pub fn cost_fixed_part(template: &[String]) -> &[String] {
    match template.split_last() {
        Some((last, head)) if last == "COST" => head,
        _ => template,
    }
}

/// Names for the variable-width tail of a cost table.
///
/// Piecewise-linear tails are `X1, Y1, X2, Y2, ..`; polynomial tails run from
/// the highest order coefficient down to `C0`.
fn cost_columns(field: &str, rows: &[Row], excess: usize, diag: &mut Diagnostics) -> Vec<String> {
    let models: BTreeSet<String> = rows
        .iter()
        .filter_map(|r| r.first())
        .map(|cell| cell.to_string())
        .collect();
    if models.len() > 1 {
        let listed: Vec<String> = models.into_iter().collect();
        diag.warn(
            IssueKind::MixedCostModel,
            field,
            &format!(
                "rows declare cost models {}; naming columns after the first row",
                listed.join(", ")
            ),
        );
    }

    let model = rows
        .first()
        .and_then(|r| r.first())
        .map(CostModel::from_cell)
        .unwrap_or(CostModel::Polynomial);

    match model {
        CostModel::PiecewiseLinear => (0..excess)
            .map(|i| {
                let axis = if i % 2 == 0 { "X" } else { "Y" };
                format!("{}{}", axis, i / 2 + 1)
            })
            .collect(),
        CostModel::Polynomial => (0..excess).rev().map(|k| format!("C{}", k)).collect(),
    }
}

fn suffixed(template: &[String], n_cols: usize) -> Vec<String> {
    let (last, head) = match template.split_last() {
        Some(split) => split,
        None => return positional(n_cols),
    };
    let extra = n_cols - template.len();
    let mut columns = head.to_vec();
    columns.extend((0..=extra).rev().map(|k| format!("{}_{}", last, k)));
    columns
}
