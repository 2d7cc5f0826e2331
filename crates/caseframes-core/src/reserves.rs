//! Fixed zonal reserve data (`mpc.reserves`).
//!
//! `zones` is a zone × generator participation matrix, `req` the per-zone
//! requirement, and `cost`/`qty` hold one row per participating generator.

use serde::Serialize;

use crate::columns::{positional, resolve_columns, ColumnTemplates, OverflowPolicy};
use crate::diagnostics::Diagnostics;
use crate::error::{CaseError, CaseResult};
use crate::fields::{FieldMap, FieldValue};
use crate::table::{RowIndex, Table};
use crate::units::{scale_table, Direction};
use crate::value::{Row, Value};

pub const RESERVE_FIELDS: &[&str] = &["zones", "req", "cost", "qty"];

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Reserves {
    pub zones: Option<Table>,
    pub req: Option<Table>,
    pub cost: Option<Table>,
    pub qty: Option<Table>,
    attributes: Vec<String>,
}

impl Reserves {
    /// Build reserve tables from the nested `reserves` field.
    ///
    /// `gen` is the generator index used to label zone columns and the
    /// cost/qty rows; without it both fall back to 1-based positions.
    pub fn from_fields(
        fields: &FieldMap,
        gen: Option<&RowIndex>,
        templates: &ColumnTemplates,
        policy: OverflowPolicy,
        diag: &mut Diagnostics,
    ) -> CaseResult<Reserves> {
        let mut reserves = Reserves::default();

        for (name, value) in fields.iter() {
            if !RESERVE_FIELDS.contains(&name) {
                tracing::debug!(field = name, "skipping unknown reserves field");
                continue;
            }
            let rows = match value {
                FieldValue::Matrix(rows) => rows.clone(),
                FieldValue::Scalar(v) => vec![vec![v.clone()]],
                other => {
                    return Err(CaseError::UnsupportedSourceType(format!(
                        "reserves.{} must be a matrix, found {}",
                        name,
                        other.kind()
                    )))
                }
            };
            let table_name = format!("reserves.{}", name);
            let table = if name == "zones" {
                zones_table(&table_name, rows, gen, diag)?
            } else {
                let columns = resolve_columns(&table_name, &rows, templates, policy, diag)?;
                Table::build(&table_name, columns, rows, diag)?
            };
            reserves.attributes.push(name.to_string());
            match name {
                "zones" => reserves.zones = Some(table),
                "req" => reserves.req = Some(table),
                "cost" => reserves.cost = Some(table),
                _ => reserves.qty = Some(table),
            }
        }

        reserves.attach_indices(gen)?;
        Ok(reserves)
    }

    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        match name {
            "zones" => self.zones.as_ref(),
            "req" => self.req.as_ref(),
            "cost" => self.cost.as_ref(),
            "qty" => self.qty.as_ref(),
            _ => None,
        }
    }

    fn tables_mut(&mut self) -> impl Iterator<Item = &mut Table> {
        [&mut self.zones, &mut self.req, &mut self.cost, &mut self.qty]
            .into_iter()
            .flatten()
    }

    fn attach_indices(&mut self, gen: Option<&RowIndex>) -> CaseResult<()> {
        let n_zones = self.zones.as_ref().map(|z| z.n_rows());
        if let Some(zones) = self.zones.as_mut() {
            zones.set_index(RowIndex::sequential("zone", zones.n_rows(), 1))?;
        }
        if let Some(req) = self.req.as_mut() {
            if let Some(n) = n_zones {
                if req.n_rows() != n {
                    return Err(CaseError::IndexLength {
                        table: req.name().to_string(),
                        expected: n,
                        found: req.n_rows(),
                    });
                }
            }
            req.set_index(RowIndex::sequential("zone", req.n_rows(), 1))?;
        }

        let participating = self.participating_labels(gen);
        let all_gens = gen.map(|g| g.labels.clone());
        for table in [&mut self.cost, &mut self.qty].into_iter().flatten() {
            let n = table.n_rows();
            let labels = match (&all_gens, &participating) {
                (Some(all), _) if all.len() == n => all.clone(),
                (_, Some(part)) if part.len() == n => part.clone(),
                (None, None) => (1..=n as i64).map(Value::Int).collect(),
                (_, part) => {
                    return Err(CaseError::IndexLength {
                        table: table.name().to_string(),
                        expected: part.as_ref().map(|p| p.len()).unwrap_or(0),
                        found: n,
                    })
                }
            };
            table.set_index(RowIndex {
                name: "gen".to_string(),
                labels,
            })?;
        }
        Ok(())
    }

    /// Labels of generators with a nonzero entry in any zone.
    fn participating_labels(&self, gen: Option<&RowIndex>) -> Option<Vec<Value>> {
        let zones = self.zones.as_ref()?;
        let labels = (0..zones.n_cols())
            .filter(|&k| {
                zones
                    .rows()
                    .iter()
                    .any(|r| r[k].as_f64().map(|x| x != 0.0).unwrap_or(false))
            })
            .map(|k| match gen {
                Some(g) => g.labels[k].clone(),
                None => Value::Int(k as i64 + 1),
            })
            .collect();
        Some(labels)
    }

    /// Renumber zones from 0 and move generator labels through `old_gen`'s
    /// positions.
    pub(crate) fn reset_index(&mut self, old_gen: Option<&RowIndex>) -> CaseResult<()> {
        if let Some(zones) = self.zones.as_mut() {
            if let Some(gen) = old_gen {
                let columns = zones
                    .columns()
                    .iter()
                    .map(|c| {
                        gen.labels
                            .iter()
                            .position(|l| l.to_string() == *c)
                            .map(|p| p.to_string())
                            .ok_or_else(|| CaseError::dangling("reserves.zones", c, "gen", c))
                    })
                    .collect::<CaseResult<Vec<_>>>()?;
                zones.rename_columns(columns);
            } else {
                zones.rename_columns(positional(zones.n_cols()));
            }
            zones.set_index(RowIndex::sequential("zone", zones.n_rows(), 0))?;
        }
        if let Some(req) = self.req.as_mut() {
            req.set_index(RowIndex::sequential("zone", req.n_rows(), 0))?;
        }
        for table in [&mut self.cost, &mut self.qty].into_iter().flatten() {
            let labels = match old_gen {
                Some(gen) => table
                    .index()
                    .labels
                    .iter()
                    .map(|l| {
                        gen.position(l)
                            .map(Value::from)
                            .ok_or_else(|| CaseError::dangling(table.name(), "index", "gen", l))
                    })
                    .collect::<CaseResult<Vec<_>>>()?,
                None => (0..table.n_rows()).map(Value::from).collect(),
            };
            table.set_index(RowIndex {
                name: "gen".to_string(),
                labels,
            })?;
        }
        Ok(())
    }

    pub(crate) fn scale(&mut self, base_mva: f64, dir: Direction) {
        for table in self.tables_mut() {
            let key = table.name().to_string();
            scale_table(table, &key, base_mva, dir);
        }
    }

    pub fn to_fields(&self) -> FieldMap {
        let mut fields = FieldMap::new();
        for name in &self.attributes {
            if let Some(table) = self.table(name) {
                fields.insert(name.clone(), FieldValue::Matrix(table.to_rows()));
            }
        }
        fields
    }

    pub fn diff(&self, other: &Reserves) -> Vec<String> {
        let mut out = Vec::new();
        if self.attributes != other.attributes {
            out.push(format!(
                "reserves: attributes {:?} != {:?}",
                self.attributes, other.attributes
            ));
        }
        for name in RESERVE_FIELDS {
            match (self.table(name), other.table(name)) {
                (Some(a), Some(b)) => out.extend(a.diff(b)),
                (None, None) => {}
                _ => out.push(format!("reserves.{}: present in only one case", name)),
            }
        }
        out
    }
}

fn zones_table(
    name: &str,
    rows: Vec<Row>,
    gen: Option<&RowIndex>,
    diag: &mut Diagnostics,
) -> CaseResult<Table> {
    let width = rows.iter().map(|r| r.len()).max().unwrap_or(0);
    let columns = match gen {
        Some(g) if g.len() == width => g.labels.iter().map(|l| l.to_string()).collect(),
        Some(g) => {
            return Err(CaseError::IndexLength {
                table: name.to_string(),
                expected: g.len(),
                found: width,
            })
        }
        None => (1..=width).map(|k| k.to_string()).collect(),
    };
    Table::build(name, columns, rows, diag)
}
