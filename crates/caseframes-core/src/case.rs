//! The case aggregator.
//!
//! A [`Case`] owns every table and scalar loaded from one MATPOWER case and
//! wires up the cross-table row labels (gen → gencost, name lists → bus,
//! branch and gen). Whole-case transforms never mutate in a half-finished
//! state: they either work on a copy (`to_per_unit`) or swap the result in
//! only once every step succeeded (`reset_index`).

use std::collections::{HashMap, HashSet};

use crate::columns::{is_cost_field, resolve_columns, ColumnTemplates, OverflowPolicy};
use crate::diagnostics::{Diagnostics, IssueKind};
use crate::error::{CaseError, CaseResult};
use crate::fields::{is_known_field, CaseParser, CaseSource, FieldMap, FieldValue};
use crate::options::LoadOptions;
use crate::reserves::Reserves;
use crate::table::{RowIndex, Table};
use crate::units::{scale_cost_table, scale_table, Direction};
use crate::value::{Row, Value};
use crate::xgd::XGenDataTable;

/// Entity tables that can be labeled by a name list.
const NAMED_ENTITIES: &[&str] = &["bus", "branch", "gen"];

/// Bus-id columns checked against `bus.BUS_I`.
const BUS_REFERENCES: &[(&str, &str)] = &[
    ("branch", "F_BUS"),
    ("branch", "T_BUS"),
    ("dcline", "F_BUS"),
    ("dcline", "T_BUS"),
    ("gen", "GEN_BUS"),
];

/// One loaded field.
#[derive(Debug, Clone, PartialEq)]
pub enum CaseField {
    Scalar(Value),
    Table(Table),
    /// A name list (`bus_name`, ..) kept so it can be written back out.
    Names(Vec<String>),
    /// Tables of a nested struct such as `if`, in declaration order.
    Group(Vec<Table>),
    Reserves(Reserves),
}

/// A case plus everything noteworthy that happened while loading it.
#[derive(Debug, Clone)]
pub struct CaseImport {
    pub case: Case,
    pub diagnostics: Diagnostics,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Case {
    name: Option<String>,
    version: Option<String>,
    base_mva: Option<f64>,
    per_unit: bool,
    attributes: Vec<String>,
    fields: HashMap<String, CaseField>,
}

impl Case {
    pub fn new(name: Option<String>) -> Self {
        Case {
            name,
            ..Default::default()
        }
    }

    /// Build a case from any supported source.
    ///
    /// Text goes through `parser`; JSON is read as a field map whose optional
    /// `name` entry becomes the case name.
    pub fn from_source(
        source: CaseSource,
        parser: &dyn CaseParser,
        options: &LoadOptions,
    ) -> CaseResult<CaseImport> {
        match source {
            CaseSource::Text(text) => {
                let parsed = parser.parse(&text, options)?;
                let mut import = Case::from_fields(parsed.name, parsed.fields, options)?;
                let mut diagnostics = parsed.diagnostics;
                diagnostics.merge(import.diagnostics);
                import.diagnostics = diagnostics;
                Ok(import)
            }
            CaseSource::Fields { name, fields } => Case::from_fields(name, fields, options),
            CaseSource::Json(json) => {
                let mut fields = FieldMap::from_json(&json)?;
                let name = match fields.remove("name") {
                    Some(FieldValue::Scalar(Value::Str(name))) => Some(name),
                    Some(other) => {
                        return Err(CaseError::InvalidScalar {
                            field: "name".to_string(),
                            value: other.kind().to_string(),
                        })
                    }
                    None => None,
                };
                Case::from_fields(name, fields, options)
            }
        }
    }

    /// Build a case from an already split field map.
    pub fn from_fields(
        name: Option<String>,
        fields: FieldMap,
        options: &LoadOptions,
    ) -> CaseResult<CaseImport> {
        let templates = options.templates();
        let policy = options.overflow_policy();
        let mut diag = Diagnostics::new();
        let mut case = Case::new(name);
        let mut reserves = None;

        for (field, value) in fields.iter() {
            if case.attributes.iter().any(|a| a == field) {
                tracing::debug!(field, "skipping repeated field");
                continue;
            }
            if !options.allow_any_keys && !is_known_field(field) {
                diag.warn(
                    IssueKind::UnknownField,
                    field,
                    "not a recognized case field; enable allow_any_keys to keep it",
                );
                continue;
            }

            match (field, value) {
                ("version", v) => case.set_version(scalar_of(field, v)?)?,
                ("baseMVA", v) => case.set_base_mva(scalar_of(field, v)?)?,
                ("bus_name", FieldValue::Strings(names)) if options.legacy_bus_string => {
                    let rows = names.iter().map(|n| vec![Value::Str(n.clone())]).collect();
                    let table = Table::build("bus_string", vec!["BUS_NAME".to_string()], rows, &mut diag)?;
                    case.push("bus_string", CaseField::Table(table));
                }
                ("reserves", FieldValue::Struct(map)) => {
                    reserves = Some(map.clone());
                    case.attributes.push(field.to_string());
                }
                (_, FieldValue::Strings(names)) => {
                    case.push(field, CaseField::Names(names.clone()));
                }
                (_, FieldValue::Struct(map)) => {
                    let group = build_group(field, map, &templates, policy, &mut diag)?;
                    case.push(field, CaseField::Group(group));
                }
                (_, FieldValue::Matrix(rows)) => {
                    let table = build_table(field, rows.clone(), &templates, policy, &mut diag)?;
                    case.push(field, CaseField::Table(table));
                }
                (_, FieldValue::Scalar(v)) if is_known_field(field) => {
                    // a one-row table written as a bare number
                    let table = build_table(field, vec![vec![v.clone()]], &templates, policy, &mut diag)?;
                    case.push(field, CaseField::Table(table));
                }
                (_, FieldValue::Scalar(v)) => case.push(field, CaseField::Scalar(v.clone())),
            }
        }

        case.attach_indices()?;
        if let Some(map) = reserves {
            let gen = case.gen().map(|g| g.index().clone());
            let reserves = Reserves::from_fields(&map, gen.as_ref(), &templates, policy, &mut diag)?;
            case.fields.insert("reserves".to_string(), CaseField::Reserves(reserves));
        }
        case.check_references(options.strict_references, &mut diag)?;

        tracing::debug!(
            name = case.name.as_deref().unwrap_or(""),
            fields = case.attributes.len(),
            warnings = diag.warning_count(),
            "loaded case"
        );
        Ok(CaseImport {
            case,
            diagnostics: diag,
        })
    }

    fn push(&mut self, field: &str, value: CaseField) {
        self.attributes.push(field.to_string());
        self.fields.insert(field.to_string(), value);
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn base_mva(&self) -> Option<f64> {
        self.base_mva
    }

    pub fn is_per_unit(&self) -> bool {
        self.per_unit
    }

    /// Loaded field names in declaration order.
    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }

    fn note_attribute(&mut self, name: &str) {
        if !self.attributes.iter().any(|a| a == name) {
            self.attributes.push(name.to_string());
        }
    }

    /// Set `version`, coercing numbers to their text form.
    pub fn set_version(&mut self, value: Value) -> CaseResult<()> {
        if value.is_nan() {
            return Err(CaseError::InvalidScalar {
                field: "version".to_string(),
                value: value.to_string(),
            });
        }
        self.version = Some(value.to_string());
        self.note_attribute("version");
        Ok(())
    }

    /// Set `baseMVA`. Text is accepted when it reads as a number.
    pub fn set_base_mva(&mut self, value: Value) -> CaseResult<()> {
        let parsed = match &value {
            Value::Str(s) => Value::infer(s.trim()).as_f64(),
            other => other.as_f64(),
        };
        match parsed {
            Some(base) if base.is_finite() => {
                self.base_mva = Some(base);
                self.note_attribute("baseMVA");
                Ok(())
            }
            _ => Err(CaseError::InvalidScalar {
                field: "baseMVA".to_string(),
                value: value.to_string(),
            }),
        }
    }

    /// Any loaded field by top-level name.
    pub fn field(&self, name: &str) -> Option<&CaseField> {
        self.fields.get(name)
    }

    /// A table by name. Dotted names reach into groups and reserves.
    pub fn table(&self, name: &str) -> Option<&Table> {
        match name.split_once('.') {
            None => match self.fields.get(name)? {
                CaseField::Table(t) => Some(t),
                _ => None,
            },
            Some((head, rest)) => match self.fields.get(head)? {
                CaseField::Group(tables) => tables.iter().find(|t| t.name() == name),
                CaseField::Reserves(r) => r.table(rest),
                _ => None,
            },
        }
    }

    /// Every table in declaration order, nested ones included.
    pub fn tables(&self) -> Vec<&Table> {
        let mut out = Vec::new();
        for name in &self.attributes {
            match self.fields.get(name) {
                Some(CaseField::Table(t)) => out.push(t),
                Some(CaseField::Group(tables)) => out.extend(tables.iter()),
                Some(CaseField::Reserves(r)) => {
                    out.extend(r.attributes().iter().filter_map(|a| r.table(a)))
                }
                _ => {}
            }
        }
        out
    }

    fn table_mut(&mut self, name: &str) -> Option<&mut Table> {
        match self.fields.get_mut(name)? {
            CaseField::Table(t) => Some(t),
            _ => None,
        }
    }

    /// Scalar fields, including `version` and `baseMVA`.
    pub fn scalar(&self, name: &str) -> Option<Value> {
        match name {
            "version" => self.version.clone().map(Value::Str),
            "baseMVA" => self.base_mva.map(Value::from_f64),
            _ => match self.fields.get(name)? {
                CaseField::Scalar(v) => Some(v.clone()),
                _ => None,
            },
        }
    }

    /// The name list for `entity` (`bus`, `branch` or `gen`), if one was loaded.
    pub fn names(&self, entity: &str) -> Option<&[String]> {
        match self.fields.get(&format!("{}_name", entity))? {
            CaseField::Names(names) => Some(names),
            _ => None,
        }
    }

    pub fn bus(&self) -> Option<&Table> {
        self.table("bus")
    }

    pub fn gen(&self) -> Option<&Table> {
        self.table("gen")
    }

    pub fn branch(&self) -> Option<&Table> {
        self.table("branch")
    }

    pub fn gencost(&self) -> Option<&Table> {
        self.table("gencost")
    }

    pub fn dcline(&self) -> Option<&Table> {
        self.table("dcline")
    }

    pub fn dclinecost(&self) -> Option<&Table> {
        self.table("dclinecost")
    }

    pub fn reserves(&self) -> Option<&Reserves> {
        match self.fields.get("reserves")? {
            CaseField::Reserves(r) => Some(r),
            _ => None,
        }
    }

    /// Label an extended generator data matrix with this case's gen index.
    pub fn xgen_data(&self, data: Vec<Row>, colnames: Vec<String>) -> CaseResult<XGenDataTable> {
        XGenDataTable::from_data(data, colnames, self.gen().map(|g| g.index()))
    }

    /// Row labels from name lists, then cost tables mirroring their owner.
    fn attach_indices(&mut self) -> CaseResult<()> {
        for entity in NAMED_ENTITIES {
            let names = self.names(entity).map(|n| n.to_vec());
            if let Some(table) = self.table_mut(entity) {
                let index = match names {
                    Some(names) => RowIndex::from_names(*entity, &names),
                    None => RowIndex::sequential(*entity, table.n_rows(), 1),
                };
                table.set_index(index)?;
            }
        }

        for (cost, owner) in [("gencost", "gen"), ("dclinecost", "dcline")] {
            let owner_index = self.table(owner).map(|t| t.index().clone());
            let Some(table) = self.table_mut(cost) else {
                continue;
            };
            let n = table.n_rows();
            let index = match owner_index {
                None => RowIndex::sequential(owner, n, 1),
                Some(idx) if idx.len() == n => idx,
                Some(idx) if n == 0 => RowIndex {
                    name: idx.name,
                    labels: Vec::new(),
                },
                // active and reactive costs stacked
                Some(idx) if 2 * idx.len() == n => RowIndex {
                    name: idx.name.clone(),
                    labels: idx.labels.iter().chain(&idx.labels).cloned().collect(),
                },
                Some(idx) => {
                    return Err(CaseError::IndexLength {
                        table: cost.to_string(),
                        expected: idx.len(),
                        found: n,
                    })
                }
            };
            table.set_index(index)?;
        }
        Ok(())
    }

    /// Check every bus reference against `bus.BUS_I`. Skipped when the case
    /// has no bus table.
    fn check_references(&self, strict: bool, diag: &mut Diagnostics) -> CaseResult<()> {
        let Some(bus_ids) = self.bus_ids() else {
            return Ok(());
        };
        for (table_name, column) in BUS_REFERENCES {
            let Some(cells) = self.table(table_name).and_then(|t| t.column(column)) else {
                continue;
            };
            let missing: Vec<&Value> = cells
                .into_iter()
                .filter(|v| !v.as_i64().map_or(false, |id| bus_ids.contains(&id)))
                .collect();
            let Some(first) = missing.first() else {
                continue;
            };
            if strict {
                return Err(CaseError::dangling(table_name, column, "bus", first));
            }
            diag.warn(
                IssueKind::DanglingReference,
                table_name,
                &format!(
                    "{} {} value(s) not found in bus.BUS_I (first: {})",
                    missing.len(),
                    column,
                    first
                ),
            );
        }
        Ok(())
    }

    fn bus_ids(&self) -> Option<HashSet<i64>> {
        let ids = self.bus()?.column("BUS_I")?;
        Some(ids.into_iter().filter_map(Value::as_i64).collect())
    }

    /// Renumber every row label from 0 and every bus id to its row position.
    ///
    /// Bus ids in `bus.BUS_I`, branch/dcline `F_BUS`/`T_BUS` and
    /// `gen.GEN_BUS` are all rewritten through the same old → new map, and
    /// reserve generator labels follow the gen order. An id that does not
    /// resolve is a [`CaseError::ReferentialIntegrity`]; in that case the
    /// case is left untouched.
    pub fn reset_index(&mut self) -> CaseResult<()> {
        let mut next = self.clone();
        next.reset_index_in_place()?;
        *self = next;
        Ok(())
    }

    fn reset_index_in_place(&mut self) -> CaseResult<()> {
        let bus_map = match self.bus().and_then(|b| b.column("BUS_I")) {
            Some(ids) => Some(position_map(&ids)?),
            None => None,
        };

        if let Some(map) = &bus_map {
            remap_column(self.table_mut("bus"), "bus", "BUS_I", map)?;
            for (table_name, column) in BUS_REFERENCES {
                remap_column(self.table_mut(table_name), table_name, column, map)?;
            }
        }

        let old_gen = self.gen().map(|g| g.index().clone());
        for field in self.fields.values_mut() {
            match field {
                CaseField::Table(t) => reset_labels(t)?,
                CaseField::Group(tables) => {
                    for t in tables {
                        reset_labels(t)?;
                    }
                }
                CaseField::Reserves(r) => r.reset_index(old_gen.as_ref())?,
                CaseField::Scalar(_) | CaseField::Names(_) => {}
            }
        }
        Ok(())
    }

    /// A copy with power in per-unit of `baseMVA` and angles in radians.
    pub fn to_per_unit(&self) -> CaseResult<Case> {
        self.converted(true)
    }

    /// Inverse of [`Case::to_per_unit`].
    pub fn to_physical_units(&self) -> CaseResult<Case> {
        self.converted(false)
    }

    fn converted(&self, per_unit: bool) -> CaseResult<Case> {
        let mut out = self.clone();
        if self.per_unit == per_unit {
            return Ok(out);
        }
        let base = self.base_mva.ok_or(CaseError::MissingBaseMva)?;
        let dir = if per_unit {
            Direction::ToPerUnit
        } else {
            Direction::FromPerUnit
        };
        for (name, field) in out.fields.iter_mut() {
            match field {
                CaseField::Table(t) if is_cost_field(name) => scale_cost_table(t, base, dir),
                CaseField::Table(t) => scale_table(t, name, base, dir),
                CaseField::Reserves(r) => r.scale(base, dir),
                _ => {}
            }
        }
        out.per_unit = per_unit;
        Ok(out)
    }

    /// Plain field map in declaration order, suitable for re-loading.
    pub fn to_dict(&self) -> FieldMap {
        let mut out = FieldMap::new();
        for name in &self.attributes {
            if let Some(value) = self.scalar(name).filter(|_| !self.fields.contains_key(name)) {
                out.insert(name.clone(), FieldValue::Scalar(value));
                continue;
            }
            let Some(field) = self.fields.get(name) else {
                continue;
            };
            match field {
                CaseField::Scalar(v) => out.insert(name.clone(), FieldValue::Scalar(v.clone())),
                CaseField::Table(t) if name == "bus_string" => out.insert(
                    "bus_name",
                    FieldValue::Strings(t.rows().iter().map(|r| r[0].to_string()).collect()),
                ),
                CaseField::Table(t) => out.insert(name.clone(), FieldValue::Matrix(t.to_rows())),
                CaseField::Names(names) => out.insert(name.clone(), FieldValue::Strings(names.clone())),
                CaseField::Group(tables) => {
                    let mut inner = FieldMap::new();
                    for t in tables {
                        let key = t.name().rsplit('.').next().unwrap_or(t.name());
                        inner.insert(key, FieldValue::Matrix(t.to_rows()));
                    }
                    out.insert(name.clone(), FieldValue::Struct(inner));
                }
                CaseField::Reserves(r) => out.insert(name.clone(), FieldValue::Struct(r.to_fields())),
            }
        }
        out
    }

    /// Every difference between two cases; empty when they match.
    pub fn diff(&self, other: &Case) -> Vec<String> {
        let mut out = Vec::new();
        if self.attributes != other.attributes {
            out.push(format!(
                "attributes {:?} != {:?}",
                self.attributes, other.attributes
            ));
        }
        if self.version != other.version {
            out.push(format!("version {:?} != {:?}", self.version, other.version));
        }
        if self.base_mva != other.base_mva {
            out.push(format!("baseMVA {:?} != {:?}", self.base_mva, other.base_mva));
        }
        if self.per_unit != other.per_unit {
            out.push(format!("per_unit {} != {}", self.per_unit, other.per_unit));
        }
        for name in &self.attributes {
            let (Some(a), Some(b)) = (self.fields.get(name), other.fields.get(name)) else {
                continue;
            };
            match (a, b) {
                (CaseField::Table(x), CaseField::Table(y)) => out.extend(x.diff(y)),
                (CaseField::Reserves(x), CaseField::Reserves(y)) => out.extend(x.diff(y)),
                (CaseField::Group(x), CaseField::Group(y)) if x.len() == y.len() => {
                    for (tx, ty) in x.iter().zip(y) {
                        out.extend(tx.diff(ty));
                    }
                }
                (CaseField::Scalar(x), CaseField::Scalar(y)) if x.same(y) => {}
                (x, y) if x == y => {}
                _ => out.push(format!("{}: values differ", name)),
            }
        }
        out
    }
}

fn scalar_of(field: &str, value: &FieldValue) -> CaseResult<Value> {
    match value {
        FieldValue::Scalar(v) => Ok(v.clone()),
        FieldValue::Matrix(rows) if rows.len() == 1 && rows[0].len() == 1 => Ok(rows[0][0].clone()),
        FieldValue::Strings(s) if s.len() == 1 => Ok(Value::Str(s[0].clone())),
        other => Err(CaseError::InvalidScalar {
            field: field.to_string(),
            value: format!("a {}", other.kind()),
        }),
    }
}

fn build_table(
    field: &str,
    rows: Vec<Row>,
    templates: &ColumnTemplates,
    policy: OverflowPolicy,
    diag: &mut Diagnostics,
) -> CaseResult<Table> {
    let columns = resolve_columns(field, &rows, templates, policy, diag)?;
    Table::build(field, columns, rows, diag)
}

fn build_group(
    field: &str,
    map: &FieldMap,
    templates: &ColumnTemplates,
    policy: OverflowPolicy,
    diag: &mut Diagnostics,
) -> CaseResult<Vec<Table>> {
    let mut tables = Vec::new();
    for (sub, value) in map.iter() {
        let path = format!("{}.{}", field, sub);
        let rows = match value {
            FieldValue::Matrix(rows) => rows.clone(),
            FieldValue::Scalar(v) => vec![vec![v.clone()]],
            other => {
                diag.warn(
                    IssueKind::UnknownField,
                    &path,
                    &format!("nested {} values are not supported", other.kind()),
                );
                continue;
            }
        };
        tables.push(build_table(&path, rows, templates, policy, diag)?);
    }
    Ok(tables)
}

fn remap_column(
    table: Option<&mut Table>,
    table_name: &str,
    column: &str,
    map: &HashMap<i64, i64>,
) -> CaseResult<()> {
    let Some(table) = table else {
        return Ok(());
    };
    let Some(pos) = table.column_position(column) else {
        return Ok(());
    };
    for row in table.rows_mut() {
        let new_id = row[pos]
            .as_i64()
            .and_then(|id| map.get(&id))
            .ok_or_else(|| CaseError::dangling(table_name, column, "bus", &row[pos]))?;
        row[pos] = Value::Int(*new_id);
    }
    Ok(())
}

/// Bus id → row position. Each id must appear once for the new ids to
/// cover `0..n` exactly.
fn position_map(ids: &[&Value]) -> CaseResult<HashMap<i64, i64>> {
    let mut map = HashMap::with_capacity(ids.len());
    for (pos, id) in ids.iter().enumerate() {
        let Some(id) = id.as_i64() else {
            continue;
        };
        if map.insert(id, pos as i64).is_some() {
            return Err(CaseError::DuplicateId {
                table: "bus".to_string(),
                column: "BUS_I".to_string(),
                id,
            });
        }
    }
    Ok(map)
}

fn reset_labels(table: &mut Table) -> CaseResult<()> {
    let name = table.index().name.clone();
    table.set_index(RowIndex::sequential(name, table.n_rows(), 0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ints(rows: &[&[i64]]) -> FieldValue {
        FieldValue::Matrix(
            rows.iter()
                .map(|r| r.iter().map(|v| Value::Int(*v)).collect())
                .collect(),
        )
    }

    fn bus_row(id: i64, kind: i64, pd: i64) -> Vec<i64> {
        vec![id, kind, pd, 0, 0, 0, 1, 1, 0, 345, 1, 1, 1]
    }

    fn gen_row(bus: i64, pg: i64) -> Vec<i64> {
        vec![bus, pg, 0, 300, -300, 1, 100, 1, 250, 10]
    }

    fn branch_row(f: i64, t: i64) -> Vec<i64> {
        vec![f, t, 0, 1, 0, 250, 250, 250, 0, 0, 1, -360, 360]
    }

    fn three_bus() -> FieldMap {
        let buses = [bus_row(10, 3, 0), bus_row(4, 2, 0), bus_row(7, 1, 90)];
        let gens = [gen_row(10, 72), gen_row(4, 163)];
        let branches = [branch_row(10, 4), branch_row(4, 7)];
        let mut fields = FieldMap::new();
        fields.insert("version", FieldValue::Scalar("2".into()));
        fields.insert("baseMVA", FieldValue::Scalar(Value::Int(100)));
        fields.insert(
            "bus",
            ints(&buses.iter().map(|r| r.as_slice()).collect::<Vec<_>>()),
        );
        fields.insert(
            "gen",
            ints(&gens.iter().map(|r| r.as_slice()).collect::<Vec<_>>()),
        );
        fields.insert(
            "branch",
            ints(&branches.iter().map(|r| r.as_slice()).collect::<Vec<_>>()),
        );
        fields.insert(
            "gencost",
            FieldValue::Matrix(vec![
                cost_row(&[2.0, 0.0, 0.0, 3.0, 0.11, 5.0, 150.0]),
                cost_row(&[2.0, 0.0, 0.0, 3.0, 0.085, 1.2, 600.0]),
            ]),
        );
        fields
    }

    fn cost_row(cells: &[f64]) -> Row {
        cells.iter().map(|c| Value::from_f64(*c)).collect()
    }

    fn load(fields: FieldMap) -> CaseImport {
        Case::from_fields(Some("case3".to_string()), fields, &LoadOptions::default()).unwrap()
    }

    #[test]
    fn test_scalars_are_typed() {
        let case = load(three_bus()).case;
        assert_eq!(case.version(), Some("2"));
        assert_eq!(case.base_mva(), Some(100.0));
        assert_eq!(case.scalar("baseMVA"), Some(Value::Int(100)));
        assert_eq!(
            case.attributes(),
            &["version", "baseMVA", "bus", "gen", "branch", "gencost"]
        );
    }

    #[test]
    fn test_invalid_base_mva() {
        let mut fields = three_bus();
        fields.insert("baseMVA", FieldValue::Scalar("lots".into()));
        let err = Case::from_fields(None, fields, &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, CaseError::InvalidScalar { .. }));
    }

    #[test]
    fn test_sequential_indices() {
        let case = load(three_bus()).case;
        let bus = case.bus().unwrap();
        assert_eq!(bus.index().name, "bus");
        assert_eq!(bus.index().labels, vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
        assert_eq!(bus.columns().len(), 13);
        let gencost = case.gencost().unwrap();
        assert_eq!(gencost.index(), case.gen().unwrap().index());
        assert_eq!(
            gencost.columns(),
            &["MODEL", "STARTUP", "SHUTDOWN", "NCOST", "C2", "C1", "C0"]
        );
    }

    #[test]
    fn test_name_lists_label_tables() {
        let mut fields = three_bus();
        fields.insert(
            "bus_name",
            FieldValue::Strings(vec!["Alpha".into(), "Beta".into(), "Gamma".into()]),
        );
        let case = load(fields).case;
        let bus = case.bus().unwrap();
        assert_eq!(bus.index().labels[1], Value::Str("Beta".into()));
        assert_eq!(
            bus.get_by_label(&Value::Str("Gamma".into()), "PD"),
            Some(&Value::Int(90))
        );
        assert_eq!(case.names("bus").map(|n| n.len()), Some(3));
    }

    #[test]
    fn test_legacy_bus_string() {
        let mut fields = three_bus();
        fields.insert(
            "bus_name",
            FieldValue::Strings(vec!["A".into(), "B".into(), "C".into()]),
        );
        let options = LoadOptions {
            legacy_bus_string: true,
            ..Default::default()
        };
        let case = Case::from_fields(None, fields.clone(), &options).unwrap().case;
        assert!(case.table("bus_string").is_some());
        assert!(case.names("bus").is_none());
        assert_eq!(case.bus().unwrap().index().labels[0], Value::Int(1));
        assert_eq!(case.to_dict().get("bus_name"), fields.get("bus_name"));
    }

    #[test]
    fn test_name_list_length_mismatch() {
        let mut fields = three_bus();
        fields.insert("gen_name", FieldValue::Strings(vec!["G1".into()]));
        let err = Case::from_fields(None, fields, &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, CaseError::IndexLength { .. }));
    }

    #[test]
    fn test_stacked_gencost_repeats_gen_labels() {
        let mut fields = three_bus();
        let row = cost_row(&[2.0, 0.0, 0.0, 2.0, 1.0, 0.0]);
        fields.insert("gencost", FieldValue::Matrix(vec![row; 4]));
        let case = load(fields).case;
        let labels = &case.gencost().unwrap().index().labels;
        assert_eq!(
            labels,
            &vec![Value::Int(1), Value::Int(2), Value::Int(1), Value::Int(2)]
        );
    }

    #[test]
    fn test_unknown_field_skipped_or_kept() {
        let mut fields = three_bus();
        fields.insert("foo", ints(&[&[1, 2, 3]]));

        let import = load(fields.clone());
        assert!(!import.case.attributes().iter().any(|a| a == "foo"));
        assert!(import.diagnostics.has(IssueKind::UnknownField));

        let options = LoadOptions::default().with_any_keys(true);
        let case = Case::from_fields(None, fields, &options).unwrap().case;
        assert!(case.attributes().iter().any(|a| a == "foo"));
        assert_eq!(case.table("foo").unwrap().columns(), &["0", "1", "2"]);
    }

    #[test]
    fn test_dangling_reference_warns_or_fails() {
        let mut fields = three_bus();
        fields.insert("gen", ints(&[gen_row(10, 72).as_slice(), gen_row(99, 1).as_slice()]));
        let import = load(fields.clone());
        assert!(import.diagnostics.has(IssueKind::DanglingReference));

        let options = LoadOptions {
            strict_references: true,
            ..Default::default()
        };
        let err = Case::from_fields(None, fields, &options).unwrap_err();
        assert!(matches!(err, CaseError::ReferentialIntegrity { .. }));
    }

    #[test]
    fn test_reset_index_remaps_bus_ids() {
        let mut case = load(three_bus()).case;
        case.reset_index().unwrap();
        let bus = case.bus().unwrap();
        assert_eq!(
            bus.column("BUS_I").unwrap(),
            vec![&Value::Int(0), &Value::Int(1), &Value::Int(2)]
        );
        assert_eq!(bus.index().labels[0], Value::Int(0));
        assert_eq!(bus.index().name, "bus");
        let branch = case.branch().unwrap();
        // bus 4 was the second row
        assert_eq!(branch.get(0, "T_BUS"), Some(&Value::Int(1)));
        assert_eq!(branch.get(1, "F_BUS"), Some(&Value::Int(1)));
        assert_eq!(branch.get(1, "T_BUS"), Some(&Value::Int(2)));
        assert_eq!(case.gen().unwrap().get(0, "GEN_BUS"), Some(&Value::Int(0)));
    }

    #[test]
    fn test_reset_index_failure_leaves_case_untouched() {
        let mut fields = three_bus();
        fields.insert("branch", ints(&[branch_row(10, 55).as_slice()]));
        let mut case = load(fields).case;
        let before = case.clone();
        let err = case.reset_index().unwrap_err();
        assert!(matches!(err, CaseError::ReferentialIntegrity { ref id, .. } if id == "55"));
        assert!(case.diff(&before).is_empty());
    }

    #[test]
    fn test_reset_index_rejects_repeated_bus_id() {
        let mut fields = three_bus();
        let buses = [bus_row(1, 3, 0), bus_row(1, 1, 90), bus_row(2, 1, 0)];
        fields.insert(
            "bus",
            ints(&buses.iter().map(|r| r.as_slice()).collect::<Vec<_>>()),
        );
        fields.insert("gen", ints(&[gen_row(1, 72).as_slice()]));
        fields.insert("branch", ints(&[branch_row(1, 2).as_slice()]));
        fields.remove("gencost");
        let mut case = load(fields).case;
        let before = case.clone();

        let err = case.reset_index().unwrap_err();
        assert!(matches!(err, CaseError::DuplicateId { id: 1, .. }));
        assert!(case.diff(&before).is_empty());
    }

    #[test]
    fn test_empty_gencost_gets_empty_index() {
        let mut fields = three_bus();
        fields.insert("gencost", FieldValue::Matrix(vec![]));
        let case = load(fields).case;
        let gencost = case.gencost().unwrap();
        assert!(gencost.is_empty());
        assert_eq!(gencost.index().name, "gen");
        assert!(gencost.index().labels.is_empty());
    }

    #[test]
    fn test_per_unit_copy() {
        let case = load(three_bus()).case;
        let pu = case.to_per_unit().unwrap();
        assert!(pu.is_per_unit());
        assert!(!case.is_per_unit());
        assert_eq!(pu.bus().unwrap().get(2, "PD"), Some(&Value::Float(0.9)));
        assert_eq!(case.bus().unwrap().get(2, "PD"), Some(&Value::Int(90)));
        let c2 = pu.gencost().unwrap().get(0, "C2").and_then(Value::as_f64).unwrap();
        assert!((c2 - 1100.0).abs() < 1e-9);

        let back = pu.to_physical_units().unwrap();
        let pd = back.bus().unwrap().get(2, "PD").and_then(Value::as_f64).unwrap();
        assert!((pd - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_per_unit_needs_base() {
        let mut fields = three_bus();
        fields.remove("baseMVA");
        let case = load(fields).case;
        assert!(matches!(case.to_per_unit(), Err(CaseError::MissingBaseMva)));
    }

    #[test]
    fn test_to_dict_round_trip() {
        let mut fields = three_bus();
        fields.insert_path("if.map", ints(&[&[1, 1], &[1, -2]]));
        fields.insert_path("if.lims", ints(&[&[1, -100, 100]]));
        let case = load(fields.clone()).case;
        assert_eq!(case.table("if.lims").unwrap().columns(), &["IFNUM", "LOWER", "UPPER"]);

        let dict = case.to_dict();
        assert_eq!(dict, fields);
        let again = load(dict).case;
        assert!(case.diff(&again).is_empty(), "{:?}", case.diff(&again));
    }

    #[test]
    fn test_json_source_takes_name() {
        let case = load(three_bus()).case;
        let mut json = case.to_dict().to_json();
        json["name"] = serde_json::json!("case3");
        let parser = NoParser;
        let import =
            Case::from_source(CaseSource::Json(json), &parser, &LoadOptions::default()).unwrap();
        assert_eq!(import.case.name(), Some("case3"));
        assert!(case.diff(&import.case).is_empty());
    }

    struct NoParser;

    impl CaseParser for NoParser {
        fn parse(&self, _text: &str, _options: &LoadOptions) -> CaseResult<crate::ParsedCase> {
            Err(CaseError::UnsupportedSourceType("text".to_string()))
        }
    }

    #[test]
    fn test_text_source_goes_through_parser() {
        let err = Case::from_source(
            CaseSource::Text("mpc.baseMVA = 100;".to_string()),
            &NoParser,
            &LoadOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, CaseError::UnsupportedSourceType(_)));
    }

    #[test]
    fn test_tables_in_declaration_order() {
        let mut fields = three_bus();
        fields.insert_path("if.lims", ints(&[&[1, -100, 100]]));
        let case = load(fields).case;
        let names: Vec<_> = case.tables().iter().map(|t| t.name().to_string()).collect();
        assert_eq!(names, vec!["bus", "gen", "branch", "gencost", "if.lims"]);
    }

    #[test]
    fn test_xgen_data_uses_gen_labels() {
        let case = load(three_bus()).case;
        let xgd = case
            .xgen_data(
                vec![vec![Value::Int(1)], vec![Value::Int(0)]],
                vec!["CommitKey".to_string()],
            )
            .unwrap();
        assert_eq!(xgd.table.index(), case.gen().unwrap().index());
    }
}
