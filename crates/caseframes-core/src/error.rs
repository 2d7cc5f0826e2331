//! Error types for case loading and whole-case transforms.
//!
//! Structural problems abort construction and surface as [`CaseError`].
//! Advisory conditions (mixed cost models, relaxed column overflow) never
//! appear here; they go to [`crate::Diagnostics`] instead.

use thiserror::Error;

/// Errors raised while building or transforming a [`crate::Case`].
#[derive(Error, Debug)]
pub enum CaseError {
    /// A requested field has no value in the source.
    #[error("field '{0}' not found")]
    FieldNotFound(String),

    /// The locator was asked about a name it has no span pattern for.
    #[error("unrecognized field name '{0}'")]
    UnrecognizedFieldName(String),

    /// A row is wider than the column template and the field has no
    /// variable-width convention.
    #[error("field '{field}' has {observed} columns but only {expected} are defined")]
    ColumnOverflow {
        field: String,
        observed: usize,
        expected: usize,
    },

    /// A row is narrower than the resolved width of a fixed-width field.
    #[error("field '{field}' row {row} has {width} values, expected {expected}")]
    RaggedRows {
        field: String,
        row: usize,
        width: usize,
        expected: usize,
    },

    /// An id in one table does not resolve in the table it references.
    #[error("{table}.{column} references unknown {target} id {id}")]
    ReferentialIntegrity {
        table: String,
        column: String,
        target: String,
        id: String,
    },

    /// An id column that must be unique repeats a value.
    #[error("{table}.{column} repeats id {id}")]
    DuplicateId {
        table: String,
        column: String,
        id: i64,
    },

    /// A row index does not line up with the table it labels.
    #[error("index for '{table}' has {found} labels, expected {expected}")]
    IndexLength {
        table: String,
        expected: usize,
        found: usize,
    },

    /// The input handed to the aggregator is not text, a mapping or an array.
    #[error("unsupported case source: {0}")]
    UnsupportedSourceType(String),

    /// A scalar field could not be coerced to its declared type.
    #[error("invalid value for '{field}': {value}")]
    InvalidScalar { field: String, value: String },

    /// Per-unit conversion needs `baseMVA`.
    #[error("case has no baseMVA")]
    MissingBaseMva,

    #[error("configuration error: {0}")]
    Config(String),
}

impl CaseError {
    pub(crate) fn dangling(table: &str, column: &str, target: &str, id: impl ToString) -> Self {
        CaseError::ReferentialIntegrity {
            table: table.to_string(),
            column: column.to_string(),
            target: target.to_string(),
            id: id.to_string(),
        }
    }
}

/// Convenience alias for results carrying [`CaseError`].
pub type CaseResult<T> = Result<T, CaseError>;

impl From<toml::de::Error> for CaseError {
    fn from(err: toml::de::Error) -> Self {
        CaseError::Config(err.to_string())
    }
}
