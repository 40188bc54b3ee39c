use std::collections::HashMap;

use serde_json::Value as Json;

use crate::{
    error::{Error, Result},
    table::{ColumnSchema, Datum, Table},
};

/// The set of named tables a query runs against. Read-only for the duration
/// of a query; the engine holds it only as `&Database`, so independent
/// queries may share one instance.
#[derive(Debug, Default)]
pub struct Database {
    tables: HashMap<String, Table>,
}

impl Database {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, table: Table) {
        self.tables.insert(table.name().to_string(), table);
    }

    /// Exact-match lookup; identifier case is significant.
    pub fn get(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    /// Loads a catalog from one JSON document mapping each table name to
    ///
    /// ```json
    /// { "columns": [{"name": "id", "type": "number"}, ...],
    ///   "rows": [[1, "Alice"], ...] }
    /// ```
    ///
    /// Cells must match the declared column types; `"number"` cells are
    /// 64-bit integers.
    pub fn from_json(src: &str) -> Result<Self> {
        let doc: Json = serde_json::from_str(src)
            .map_err(|e| Error::InvalidValue(format!("catalog is not valid JSON: {e}")))?;
        let Json::Object(tables) = doc else {
            return Err(Error::InvalidValue(
                "catalog root must be an object of tables".to_string(),
            ));
        };

        let mut db = Database::new();
        for (name, def) in &tables {
            db.insert(table_from_json(name, def)?);
        }
        Ok(db)
    }
}

fn table_from_json(name: &str, def: &Json) -> Result<Table> {
    let columns = def
        .get("columns")
        .and_then(Json::as_array)
        .ok_or_else(|| Error::InvalidValue(format!("table {name}: missing \"columns\" array")))?;
    let schema = columns
        .iter()
        .map(|col| {
            let cname = col.get("name").and_then(Json::as_str).ok_or_else(|| {
                Error::InvalidValue(format!("table {name}: column without a \"name\""))
            })?;
            let dtype = col
                .get("type")
                .and_then(Json::as_str)
                .ok_or_else(|| {
                    Error::InvalidValue(format!("table {name}: column {cname} without a \"type\""))
                })?
                .parse()?;
            Ok(ColumnSchema::new(cname, dtype))
        })
        .collect::<Result<Vec<_>>>()?;

    let rows = def
        .get("rows")
        .and_then(Json::as_array)
        .ok_or_else(|| Error::InvalidValue(format!("table {name}: missing \"rows\" array")))?;
    let rows = rows
        .iter()
        .map(|row| {
            let cells = row.as_array().ok_or_else(|| {
                Error::InvalidValue(format!("table {name}: each row must be an array"))
            })?;
            cells.iter().map(datum_from_json).collect()
        })
        .collect::<Result<Vec<_>>>()?;

    Table::new(name, schema, rows)
}

fn datum_from_json(value: &Json) -> Result<Datum> {
    match value {
        Json::Number(n) => n
            .as_i64()
            .map(Datum::Number)
            .ok_or_else(|| Error::InvalidValue(format!("cell {n} is not a 64-bit integer"))),
        Json::String(s) => Ok(Datum::Str(s.clone())),
        other => Err(Error::InvalidValue(format!("unsupported cell value: {other}"))),
    }
}
