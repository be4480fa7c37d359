//! Core data model types for ingestion.
//!
//! Sources are read into rows of typed [`Value`]s. The column types are not supplied by the
//! caller: they are captured as a [`Schema`] of [`TypeTag`]s from the first data row and every
//! later row is checked against it.

use std::fmt;

/// Type of a single value. This is the whole type system: there is no bool or date tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    /// Empty text field or absent spreadsheet cell.
    Null,
    /// UTF-8 string.
    String,
    /// 64-bit signed integer.
    Integer,
    /// 64-bit floating point number.
    Float,
}

impl TypeTag {
    /// Tag of `value`.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::String(_) => Self::String,
            Value::Integer(_) => Self::Integer,
            Value::Float(_) => Self::Float,
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Null => "NULL",
            Self::String => "STRING",
            Self::Integer => "INTEGER",
            Self::Float => "FLOAT",
        };
        f.write_str(name)
    }
}

/// A single typed value in an accepted row (or a raw value in an [`ErrorRecord`]).
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Missing/empty value.
    Null,
    /// UTF-8 string.
    String(String),
    /// 64-bit signed integer.
    Integer(i64),
    /// 64-bit float.
    Float(f64),
}

impl Value {
    /// Tag of this value.
    pub fn type_tag(&self) -> TypeTag {
        TypeTag::of(self)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::String(s) => f.write_str(s),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v}"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

/// Column types captured from the first data row, one tag per header column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    tags: Vec<TypeTag>,
}

impl Schema {
    /// Create a schema from tags.
    pub fn new(tags: Vec<TypeTag>) -> Self {
        Self { tags }
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Ordered tags.
    pub fn tags(&self) -> &[TypeTag] {
        &self.tags
    }

    /// Returns `true` if `row` has one value per column and every non-null value carries the
    /// column's tag.
    pub fn matches(&self, row: &[Value]) -> bool {
        row.len() == self.tags.len()
            && row
                .iter()
                .zip(&self.tags)
                .all(|(value, tag)| value.is_null() || value.type_tag() == *tag)
    }
}

/// Why a row landed in the error bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorReason {
    /// Field count differs from the header column count.
    WrongLength,
    /// At least one non-null value disagrees with the schema.
    WrongType,
}

impl fmt::Display for ErrorReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WrongLength => f.write_str("wrong length"),
            Self::WrongType => f.write_str("wrong data type"),
        }
    }
}

/// A rejected row.
///
/// `raw` is the row as read from the source, before coercion: text fields are carried as
/// [`Value::String`] exactly as parsed (empty fields included), spreadsheet cells as their native
/// cell value.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorRecord {
    /// 1-based physical row (spreadsheet) or line (text) the record started on.
    pub row_number: usize,
    /// Raw row values.
    pub raw: Box<[Value]>,
    /// Failure reason.
    pub reason: ErrorReason,
}

impl ErrorRecord {
    pub fn new(row_number: usize, raw: impl Into<Box<[Value]>>, reason: ErrorReason) -> Self {
        Self {
            row_number,
            raw: raw.into(),
            reason,
        }
    }
}

impl fmt::Display for ErrorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {}: {} (", self.row_number, self.reason)?;
        for (i, v) in self.raw.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{v:?}")?;
        }
        f.write_str(")")
    }
}
