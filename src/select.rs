use std::{cmp::Ordering, fmt, io::Write};

use tracing::debug;

use crate::{
    db::Database,
    error::{Error, Result},
    eval,
    table::{Datum, Table},
};

/// The parsed form of a query: projection list, starting table, zero or more
/// inner joins, and an optional row filter.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectStmt {
    pub cols: Vec<ColumnRef>,
    pub table: String,
    pub joins: Vec<JoinClause>,
    pub condition: Option<ValueTest>,
}

/// A fully qualified `table.column` reference, the only column form the
/// dialect permits.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnRef {
    pub table: String,
    pub column: String,
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.table, self.column)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JoinClause {
    pub table: String,
    pub on: ValueTest,
}

/// A single binary comparison between two values, used by both `ON` and
/// `WHERE`.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueTest {
    pub left: Value,
    pub cmp: Cmp,
    pub right: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Column(ColumnRef),
    Literal(Datum),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cmp {
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
}

impl Cmp {
    pub fn symbol(self) -> &'static str {
        match self {
            Cmp::Eq => "=",
            Cmp::Ne => "<>",
            Cmp::Lt => "<",
            Cmp::Gt => ">",
            Cmp::Le => "<=",
            Cmp::Ge => ">=",
        }
    }

    pub(crate) fn matches(self, ord: Ordering) -> bool {
        match self {
            Cmp::Eq => ord == Ordering::Equal,
            Cmp::Ne => ord != Ordering::Equal,
            Cmp::Lt => ord == Ordering::Less,
            Cmp::Gt => ord == Ordering::Greater,
            Cmp::Le => ord != Ordering::Greater,
            Cmp::Ge => ord != Ordering::Less,
        }
    }
}

/// Header labels in projection order plus the output rows, positionally
/// aligned to the headers.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultSet {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Datum>>,
}

impl ResultSet {
    /// Header line, then one comma-separated line per row.
    pub fn write_csv(&self, out: &mut impl Write) -> std::io::Result<()> {
        writeln!(out, "{}", self.headers.join(","))?;
        for row in &self.rows {
            let cells: Vec<String> = row.iter().map(ToString::to_string).collect();
            writeln!(out, "{}", cells.join(","))?;
        }
        Ok(())
    }
}

/// Runs `stmt` against `db`. Reads the catalog, never writes it; any failure
/// abandons the query with no partial result.
///
/// Joins are nested loops: each `JOIN` extends every surviving tuple with
/// each row of the joined table in native order and keeps the combinations
/// whose `ON` test holds, so the output order is outer stream first, joined
/// rows second.
pub fn exec_select(db: &Database, stmt: &SelectStmt) -> Result<ResultSet> {
    let from = db
        .get(&stmt.table)
        .ok_or_else(|| Error::UnknownTable(stmt.table.clone()))?;

    // A tuple is one row index per table in `scope`, extended immutably at
    // each join step.
    let mut scope: Vec<&Table> = vec![from];
    let mut tuples: Vec<Vec<usize>> = (0..from.rows().len()).map(|row| vec![row]).collect();

    for join in &stmt.joins {
        let table = db
            .get(&join.table)
            .ok_or_else(|| Error::UnknownTable(join.table.clone()))?;
        scope.push(table);
        let on = eval::bind_test(&join.on, &scope)?;

        let mut joined = Vec::new();
        for tuple in &tuples {
            for row in 0..table.rows().len() {
                let mut extended = tuple.clone();
                extended.push(row);
                if on.eval(&scope, &extended) {
                    joined.push(extended);
                }
            }
        }
        debug!(table = %join.table, kept = joined.len(), "join step");
        tuples = joined;
    }

    if let Some(condition) = &stmt.condition {
        let test = eval::bind_test(condition, &scope)?;
        tuples.retain(|tuple| test.eval(&scope, tuple));
    }

    let cols = stmt
        .cols
        .iter()
        .map(|col| eval::bind_column(col, &scope).map(|(slot, _)| slot))
        .collect::<Result<Vec<_>>>()?;

    let headers: Vec<String> = stmt.cols.iter().map(ColumnRef::to_string).collect();
    let rows: Vec<Vec<Datum>> = tuples
        .iter()
        .map(|tuple| {
            cols.iter()
                .map(|slot| scope[slot.table].rows()[tuple[slot.table]][slot.column].clone())
                .collect()
        })
        .collect();

    debug!(rows = rows.len(), "query finished");
    Ok(ResultSet { headers, rows })
}
