//! Extended generator data (`xGenData`) tables.
//!
//! These arrive as a bare data matrix plus a list of column names, usually
//! produced by an external engine, and are labeled with the generator index
//! of the case they belong to.

use serde::Serialize;

use crate::diagnostics::Diagnostics;
use crate::error::{CaseError, CaseResult};
use crate::fields::{FieldMap, FieldValue};
use crate::table::{RowIndex, Table};
use crate::value::{Row, Value};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct XGenDataTable {
    pub colnames: Vec<String>,
    pub table: Table,
}

impl XGenDataTable {
    pub fn from_data(
        data: Vec<Row>,
        colnames: Vec<String>,
        index: Option<&RowIndex>,
    ) -> CaseResult<Self> {
        let width = data.iter().map(|r| r.len()).max().unwrap_or(colnames.len());
        if width != colnames.len() {
            return Err(CaseError::ColumnOverflow {
                field: "xgd_table".to_string(),
                observed: width,
                expected: colnames.len(),
            });
        }
        let mut diag = Diagnostics::new();
        let mut table = Table::build("xgd_table", colnames.clone(), data, &mut diag)?;
        if let Some(index) = index {
            table.set_index(index.clone())?;
        }
        Ok(XGenDataTable { colnames, table })
    }

    pub fn column(&self, name: &str) -> Option<Vec<&Value>> {
        self.table.column(name)
    }

    pub fn len(&self) -> usize {
        self.table.n_rows()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Column names in table order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.table.columns().iter().map(String::as_str)
    }

    pub fn to_dict(&self) -> FieldMap {
        let mut out = FieldMap::new();
        out.insert("colnames", FieldValue::Strings(self.colnames.clone()));
        out.insert("data", FieldValue::Matrix(self.table.to_rows()));
        out
    }
}
