//! Labeled tables built from parsed rows.

use serde::Serialize;

use crate::columns::is_cost_field;
use crate::diagnostics::{Diagnostics, IssueKind};
use crate::error::{CaseError, CaseResult};
use crate::value::{Row, Value};

/// Row labels for a table plus the name of what they label (`bus`, `gen`, ..).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowIndex {
    pub name: String,
    pub labels: Vec<Value>,
}

impl RowIndex {
    /// `start, start + 1, ..` for `len` rows.
    pub fn sequential(name: impl Into<String>, len: usize, start: i64) -> Self {
        Self {
            name: name.into(),
            labels: (0..len as i64).map(|i| Value::Int(i + start)).collect(),
        }
    }

    pub fn from_names(name: impl Into<String>, names: &[String]) -> Self {
        Self {
            name: name.into(),
            labels: names.iter().map(|n| Value::Str(n.clone())).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Position of `label`, if present.
    pub fn position(&self, label: &Value) -> Option<usize> {
        self.labels.iter().position(|l| l.same(label))
    }
}

/// A rows × named-columns table with a row index.
///
/// The column set is fixed once built; cell values stay mutable so whole-case
/// transforms (per-unit scaling, id renumbering) can rewrite them in place.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    name: String,
    columns: Vec<String>,
    rows: Vec<Row>,
    index: RowIndex,
}

impl Table {
    /// Build a table from parsed rows and resolved column names.
    ///
    /// Cost tables may have short rows (fewer cost points than the widest
    /// row); those are padded with NaN and reported. Any other short row is a
    /// [`CaseError::RaggedRows`].
    pub fn build(
        name: &str,
        columns: Vec<String>,
        rows: Vec<Row>,
        diag: &mut Diagnostics,
    ) -> CaseResult<Table> {
        let width = columns.len();
        let padding = is_cost_field(name);
        let mut grid = Vec::with_capacity(rows.len());
        for (i, mut row) in rows.into_iter().enumerate() {
            if row.len() < width {
                if !padding {
                    return Err(CaseError::RaggedRows {
                        field: name.to_string(),
                        row: i,
                        width: row.len(),
                        expected: width,
                    });
                }
                diag.warn(
                    IssueKind::PaddedRow,
                    name,
                    &format!("row {} padded from {} to {} columns", i, row.len(), width),
                );
                row.resize(width, Value::nan());
            } else if row.len() > width {
                return Err(CaseError::ColumnOverflow {
                    field: name.to_string(),
                    observed: row.len(),
                    expected: width,
                });
            }
            grid.push(row);
        }
        let index = RowIndex::sequential(name, grid.len(), 1);
        Ok(Table {
            name: name.to_string(),
            columns,
            rows: grid,
            index,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn index(&self) -> &RowIndex {
        &self.index
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_position(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// All cells of one column, top to bottom.
    pub fn column(&self, column: &str) -> Option<Vec<&Value>> {
        let pos = self.column_position(column)?;
        Some(self.rows.iter().map(|r| &r[pos]).collect())
    }

    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let pos = self.column_position(column)?;
        self.rows.get(row).map(|r| &r[pos])
    }

    /// Cell by row label instead of position.
    pub fn get_by_label(&self, label: &Value, column: &str) -> Option<&Value> {
        let row = self.index.position(label)?;
        self.get(row, column)
    }

    /// Apply `f` to every numeric cell of `column`. Strings are left alone.
    pub fn map_column(&mut self, column: &str, f: impl Fn(f64) -> f64) {
        if let Some(pos) = self.column_position(column) {
            for row in &mut self.rows {
                if let Some(x) = row[pos].as_f64() {
                    row[pos] = Value::Float(f(x));
                }
            }
        }
    }

    pub(crate) fn rows_mut(&mut self) -> &mut [Row] {
        &mut self.rows
    }

    /// Replace the row labels; the count must match the row count.
    pub fn set_index(&mut self, index: RowIndex) -> CaseResult<()> {
        if index.len() != self.rows.len() {
            return Err(CaseError::IndexLength {
                table: self.name.clone(),
                expected: self.rows.len(),
                found: index.len(),
            });
        }
        self.index = index;
        Ok(())
    }

    pub(crate) fn rename_columns(&mut self, columns: Vec<String>) {
        debug_assert_eq!(columns.len(), self.columns.len());
        self.columns = columns;
    }

    /// Row-major cells in column order, index excluded.
    pub fn to_rows(&self) -> Vec<Row> {
        self.rows.clone()
    }

    /// Mismatches between two tables, for diagnostics and tests.
    pub fn diff(&self, other: &Table) -> Vec<String> {
        let mut out = Vec::new();
        if self.columns != other.columns {
            out.push(format!(
                "{}: columns {:?} != {:?}",
                self.name, self.columns, other.columns
            ));
            return out;
        }
        if self.index.name != other.index.name {
            out.push(format!(
                "{}: index name {} != {}",
                self.name, self.index.name, other.index.name
            ));
        }
        if self.rows.len() != other.rows.len() {
            out.push(format!(
                "{}: {} rows != {} rows",
                self.name,
                self.rows.len(),
                other.rows.len()
            ));
            return out;
        }
        for (i, (a, b)) in self.index.labels.iter().zip(&other.index.labels).enumerate() {
            if !a.same(b) {
                out.push(format!("{}: index[{}] {} != {}", self.name, i, a, b));
            }
        }
        for (i, (ra, rb)) in self.rows.iter().zip(&other.rows).enumerate() {
            for (col, (a, b)) in self.columns.iter().zip(ra.iter().zip(rb)) {
                if !a.same(b) {
                    out.push(format!("{}[{}].{}: {} != {}", self.name, i, col, a, b));
                }
            }
        }
        out
    }
}
