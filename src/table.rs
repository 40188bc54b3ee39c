use std::{fmt, str::FromStr};

use crate::error::{Error, Result};

/// Declared type of a column. The engine never coerces between the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    Number,
    Str,
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Number => write!(f, "number"),
            DataType::Str => write!(f, "string"),
        }
    }
}

impl FromStr for DataType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "number" => Ok(DataType::Number),
            "string" => Ok(DataType::Str),
            other => Err(Error::InvalidValue(format!("unknown column type {other:?}"))),
        }
    }
}

/// A single typed scalar, stored in table cells and produced by literals.
#[derive(Debug, Clone, PartialEq)]
pub enum Datum {
    Number(i64),
    Str(String),
}

impl Datum {
    pub fn data_type(&self) -> DataType {
        match self {
            Datum::Number(_) => DataType::Number,
            Datum::Str(_) => DataType::Str,
        }
    }
}

impl fmt::Display for Datum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Datum::Number(n) => write!(f, "{n}"),
            Datum::Str(s) => write!(f, "{s}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSchema {
    pub name: String,
    pub dtype: DataType,
}

impl ColumnSchema {
    pub fn new(name: impl Into<String>, dtype: DataType) -> Self {
        Self {
            name: name.into(),
            dtype,
        }
    }
}

/// A named table: an ordered column schema and rows of cells aligned
/// positionally to it. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    name: String,
    schema: Vec<ColumnSchema>,
    rows: Vec<Vec<Datum>>,
}

impl Table {
    /// Builds a table, checking that every row has one cell per column and
    /// that each cell matches the column's declared type.
    pub fn new(
        name: impl Into<String>,
        schema: Vec<ColumnSchema>,
        rows: Vec<Vec<Datum>>,
    ) -> Result<Self> {
        let name = name.into();
        for (i, row) in rows.iter().enumerate() {
            if row.len() != schema.len() {
                return Err(Error::InvalidValue(format!(
                    "table {name}: row {i} has {} cells but the schema has {} columns",
                    row.len(),
                    schema.len()
                )));
            }
            for (cell, col) in row.iter().zip(&schema) {
                if cell.data_type() != col.dtype {
                    return Err(Error::InvalidValue(format!(
                        "table {name}: row {i}, column {}: expected {}, got {}",
                        col.name,
                        col.dtype,
                        cell.data_type()
                    )));
                }
            }
        }
        Ok(Self { name, schema, rows })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &[ColumnSchema] {
        &self.schema
    }

    pub fn rows(&self) -> &[Vec<Datum>] {
        &self.rows
    }

    /// Position of `column` in the schema. Exact match, no case folding.
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.schema.iter().position(|c| c.name == column)
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&Datum> {
        self.rows.get(row)?.get(col)
    }
}
