//! Ordered field maps: the parser's output and the `to_dict` form of a case.
//!
//! A [`FieldMap`] keeps fields in declaration order. Dotted names such as
//! `reserves.zones` live in a nested [`FieldValue::Struct`].

use serde::{Serialize, Serializer};
use serde_json::{Map, Number, Value as Json};

use crate::diagnostics::Diagnostics;
use crate::error::{CaseError, CaseResult};
use crate::options::LoadOptions;
use crate::value::{Row, Value};

/// The value of one top-level (or nested) field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Scalar(Value),
    Matrix(Vec<Row>),
    Strings(Vec<String>),
    Struct(FieldMap),
}

impl FieldValue {
    pub fn kind(&self) -> &'static str {
        match self {
            FieldValue::Scalar(_) => "scalar",
            FieldValue::Matrix(_) => "matrix",
            FieldValue::Strings(_) => "strings",
            FieldValue::Struct(_) => "struct",
        }
    }

    fn to_json(&self) -> Json {
        match self {
            FieldValue::Scalar(v) => cell_to_json(v),
            FieldValue::Matrix(rows) => Json::Array(
                rows.iter()
                    .map(|r| Json::Array(r.iter().map(cell_to_json).collect()))
                    .collect(),
            ),
            FieldValue::Strings(names) => {
                Json::Array(names.iter().map(|n| Json::String(n.clone())).collect())
            }
            FieldValue::Struct(map) => map.to_json(),
        }
    }

    fn from_json(path: &str, json: &Json) -> CaseResult<FieldValue> {
        match json {
            Json::Object(map) => Ok(FieldValue::Struct(FieldMap::from_object(path, map)?)),
            Json::Array(items) => array_from_json(path, items),
            scalar => Ok(FieldValue::Scalar(cell_from_json(path, scalar)?)),
        }
    }
}

/// Shape of a recognized field's value in case text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Scalar,
    Matrix,
    StringList,
}

const FIELD_KINDS: &[(&str, FieldKind)] = &[
    ("version", FieldKind::Scalar),
    ("baseMVA", FieldKind::Scalar),
    ("bus", FieldKind::Matrix),
    ("gen", FieldKind::Matrix),
    ("branch", FieldKind::Matrix),
    ("gencost", FieldKind::Matrix),
    ("dcline", FieldKind::Matrix),
    ("dclinecost", FieldKind::Matrix),
    ("reserves.zones", FieldKind::Matrix),
    ("reserves.req", FieldKind::Matrix),
    ("reserves.cost", FieldKind::Matrix),
    ("reserves.qty", FieldKind::Matrix),
    ("if.map", FieldKind::Matrix),
    ("if.lims", FieldKind::Matrix),
    ("bus_name", FieldKind::StringList),
    ("branch_name", FieldKind::StringList),
    ("gen_name", FieldKind::StringList),
];

/// Kind of a recognized (possibly dotted) field name.
pub fn field_kind(name: &str) -> Option<FieldKind> {
    FIELD_KINDS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, kind)| *kind)
}

/// True for recognized names and for the struct heads of dotted ones
/// (`reserves`, `if`).
pub fn is_known_field(name: &str) -> bool {
    FIELD_KINDS.iter().any(|(n, _)| {
        *n == name || n.strip_prefix(name).map_or(false, |rest| rest.starts_with('.'))
    })
}

/// Ordered name → value mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldMap {
    entries: Vec<(String, FieldValue)>,
}

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace `name`. A replaced field keeps its original position.
    pub fn insert(&mut self, name: impl Into<String>, value: FieldValue) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Insert under a dotted path, creating nested structs as needed.
    pub fn insert_path(&mut self, path: &str, value: FieldValue) {
        match path.split_once('.') {
            None => self.insert(path, value),
            Some((head, rest)) => {
                if !matches!(self.get(head), Some(FieldValue::Struct(_))) {
                    self.insert(head, FieldValue::Struct(FieldMap::new()));
                }
                if let Some(FieldValue::Struct(inner)) = self.get_mut(head) {
                    inner.insert_path(rest, value);
                }
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut FieldValue> {
        self.entries
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Look up a dotted path.
    pub fn get_path(&self, path: &str) -> Option<&FieldValue> {
        match path.split_once('.') {
            None => self.get(path),
            Some((head, rest)) => match self.get(head)? {
                FieldValue::Struct(inner) => inner.get_path(rest),
                _ => None,
            },
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn remove(&mut self, name: &str) -> Option<FieldValue> {
        let pos = self.entries.iter().position(|(n, _)| n == name)?;
        Some(self.entries.remove(pos).1)
    }

    pub fn to_json(&self) -> Json {
        let mut map = Map::new();
        for (name, value) in &self.entries {
            map.insert(name.clone(), value.to_json());
        }
        Json::Object(map)
    }

    /// Read a field map from a JSON document. The root must be an object.
    pub fn from_json(json: &Json) -> CaseResult<FieldMap> {
        match json {
            Json::Object(map) => FieldMap::from_object("", map),
            other => Err(CaseError::UnsupportedSourceType(format!(
                "expected a JSON object of fields, found {}",
                json_kind(other)
            ))),
        }
    }

    fn from_object(prefix: &str, map: &Map<String, Json>) -> CaseResult<FieldMap> {
        let mut fields = FieldMap::new();
        for (name, value) in map {
            let path = if prefix.is_empty() {
                name.clone()
            } else {
                format!("{}.{}", prefix, name)
            };
            fields.insert(name.clone(), FieldValue::from_json(&path, value)?);
        }
        Ok(fields)
    }
}

impl Serialize for FieldMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

/// JSON numbers cannot hold infinities, so they are written as the tokens
/// the text parser reads back as floats. NaN is written as `null`.
const POS_INF: &str = "Inf";
const NEG_INF: &str = "-Inf";

fn cell_to_json(cell: &Value) -> Json {
    match cell {
        Value::Int(i) => Json::Number(Number::from(*i)),
        Value::Float(f) if f.is_infinite() => {
            Json::String(if *f > 0.0 { POS_INF } else { NEG_INF }.to_string())
        }
        Value::Float(f) => Number::from_f64(*f).map(Json::Number).unwrap_or(Json::Null),
        Value::Str(s) => Json::String(s.clone()),
    }
}

fn cell_from_json(path: &str, json: &Json) -> CaseResult<Value> {
    match json {
        Json::Number(n) => match n.as_i64() {
            Some(i) => Ok(Value::Int(i)),
            None => Ok(Value::from_f64(n.as_f64().unwrap_or(f64::NAN))),
        },
        Json::String(s) if s == POS_INF || s == NEG_INF => Ok(Value::infer(s)),
        Json::String(s) => Ok(Value::Str(s.clone())),
        Json::Bool(b) => Ok(Value::Int(i64::from(*b))),
        Json::Null => Ok(Value::nan()),
        other => Err(CaseError::UnsupportedSourceType(format!(
            "{}: expected a cell, found {}",
            path,
            json_kind(other)
        ))),
    }
}

/// Arrays of strings are name lists, arrays of arrays are matrices, and a
/// flat numeric array is a column vector.
fn array_from_json(path: &str, items: &[Json]) -> CaseResult<FieldValue> {
    if !items.is_empty() && items.iter().all(|i| i.is_string()) {
        let names = items
            .iter()
            .filter_map(|i| i.as_str().map(str::to_string))
            .collect();
        return Ok(FieldValue::Strings(names));
    }
    let mut rows = Vec::with_capacity(items.len());
    for item in items {
        match item {
            Json::Array(cells) => rows.push(
                cells
                    .iter()
                    .map(|c| cell_from_json(path, c))
                    .collect::<CaseResult<Row>>()?,
            ),
            cell => rows.push(vec![cell_from_json(path, cell)?]),
        }
    }
    Ok(FieldValue::Matrix(rows))
}

fn json_kind(json: &Json) -> &'static str {
    match json {
        Json::Null => "null",
        Json::Bool(_) => "a boolean",
        Json::Number(_) => "a number",
        Json::String(_) => "a string",
        Json::Array(_) => "an array",
        Json::Object(_) => "an object",
    }
}

/// Output of a [`CaseParser`].
#[derive(Debug, Clone, Default)]
pub struct ParsedCase {
    /// Display name from the `function mpc = <name>` declaration.
    pub name: Option<String>,
    pub fields: FieldMap,
    pub diagnostics: Diagnostics,
}

/// Turns raw case text into named fields.
///
/// The built-in MATPOWER text parser implements this; an external engine
/// that pre-parses case files can stand in for it.
pub trait CaseParser {
    fn parse(&self, text: &str, options: &LoadOptions) -> CaseResult<ParsedCase>;
}

/// Everything the aggregator accepts as input.
#[derive(Debug, Clone)]
pub enum CaseSource {
    /// Raw case text, handed to a [`CaseParser`].
    Text(String),
    /// Fields already split out, e.g. from [`crate::Case::to_dict`].
    Fields {
        name: Option<String>,
        fields: FieldMap,
    },
    /// A JSON document shaped like a field map.
    Json(Json),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_insert_keeps_position() {
        let mut map = FieldMap::new();
        map.insert("version", FieldValue::Scalar("2".into()));
        map.insert("baseMVA", FieldValue::Scalar(Value::Int(100)));
        map.insert("version", FieldValue::Scalar("1".into()));
        assert_eq!(map.names().collect::<Vec<_>>(), vec!["version", "baseMVA"]);
        assert_eq!(map.get("version"), Some(&FieldValue::Scalar("1".into())));
    }

    #[test]
    fn test_known_fields() {
        assert_eq!(field_kind("gencost"), Some(FieldKind::Matrix));
        assert_eq!(field_kind("bus_name"), Some(FieldKind::StringList));
        assert_eq!(field_kind("foo"), None);
        assert!(is_known_field("reserves"));
        assert!(is_known_field("if.lims"));
        assert!(!is_known_field("re"));
        assert!(!is_known_field("load"));
    }

    #[test]
    fn test_insert_path_nests() {
        let mut map = FieldMap::new();
        map.insert_path("reserves.zones", FieldValue::Matrix(vec![vec![Value::Int(1)]]));
        map.insert_path("reserves.req", FieldValue::Matrix(vec![vec![Value::Int(60)]]));
        assert_eq!(map.len(), 1);
        assert!(matches!(map.get("reserves"), Some(FieldValue::Struct(s)) if s.len() == 2));
        assert!(map.get_path("reserves.req").is_some());
    }

    #[test]
    fn test_json_shapes() {
        let json = json!({
            "baseMVA": 100.0,
            "bus": [[1, 3, 0.5], [2, 1, 0]],
            "bus_name": ["A", "B"],
            "reserves": {"req": [60, 20.5]},
            "cost": null
        });
        let map = FieldMap::from_json(&json).unwrap();
        assert_eq!(map.get("baseMVA"), Some(&FieldValue::Scalar(Value::Int(100))));
        assert_eq!(
            map.get("bus"),
            Some(&FieldValue::Matrix(vec![
                vec![Value::Int(1), Value::Int(3), Value::Float(0.5)],
                vec![Value::Int(2), Value::Int(1), Value::Int(0)],
            ]))
        );
        assert_eq!(
            map.get("bus_name"),
            Some(&FieldValue::Strings(vec!["A".into(), "B".into()]))
        );
        assert_eq!(
            map.get_path("reserves.req"),
            Some(&FieldValue::Matrix(vec![vec![Value::Int(60)], vec![Value::Float(20.5)]]))
        );
        assert!(matches!(map.get("cost"), Some(FieldValue::Scalar(v)) if v.is_nan()));
    }

    #[test]
    fn test_non_object_root_rejected() {
        let err = FieldMap::from_json(&json!([1, 2, 3])).unwrap_err();
        assert!(matches!(err, CaseError::UnsupportedSourceType(_)));
        let err = FieldMap::from_json(&json!(42)).unwrap_err();
        assert!(err.to_string().contains("a number"));
    }

    #[test]
    fn test_json_preserves_order() {
        let mut map = FieldMap::new();
        map.insert("version", FieldValue::Scalar("2".into()));
        map.insert("bus", FieldValue::Matrix(vec![]));
        map.insert("baseMVA", FieldValue::Scalar(Value::Int(100)));
        let text = serde_json::to_string(&map).unwrap();
        assert_eq!(text, r#"{"version":"2","bus":[],"baseMVA":100}"#);
    }

    #[test]
    fn test_nan_serializes_as_null() {
        let mut map = FieldMap::new();
        map.insert("x", FieldValue::Matrix(vec![vec![Value::nan()]]));
        assert_eq!(serde_json::to_string(&map).unwrap(), r#"{"x":[[null]]}"#);
    }

    #[test]
    fn test_infinity_survives_json() {
        let mut map = FieldMap::new();
        map.insert(
            "gen",
            FieldValue::Matrix(vec![vec![
                Value::Int(1),
                Value::Float(f64::INFINITY),
                Value::Float(f64::NEG_INFINITY),
                Value::Str("Inf?".into()),
            ]]),
        );
        let json = map.to_json();
        assert_eq!(json, json!({"gen": [[1, "Inf", "-Inf", "Inf?"]]}));

        let back = FieldMap::from_json(&json).unwrap();
        assert_eq!(back, map);
    }
}
