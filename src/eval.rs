use std::cmp::Ordering;

use crate::{
    error::{Error, Result},
    select::{Cmp, ColumnRef, Value, ValueTest},
    table::{DataType, Datum, Table},
};

/// A column resolved to integer slots: which table of the join scope, and
/// which column of that table. Resolved once per query so the row loops do
/// no name lookups.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ColSlot {
    pub table: usize,
    pub column: usize,
}

#[derive(Debug, Clone)]
enum Operand {
    Col(ColSlot),
    Lit(Datum),
}

/// A [`ValueTest`] with both operands bound and type-checked.
#[derive(Debug, Clone)]
pub(crate) struct BoundTest {
    left: Operand,
    cmp: Cmp,
    right: Operand,
}

/// Resolves `col` against the tables joined so far. The qualifier must name
/// one of them, and the column must exist in that table's schema.
pub(crate) fn bind_column(col: &ColumnRef, scope: &[&Table]) -> Result<(ColSlot, DataType)> {
    let table = scope
        .iter()
        .position(|t| t.name() == col.table)
        .ok_or_else(|| Error::UnknownTable(col.table.clone()))?;
    let column = scope[table]
        .column_index(&col.column)
        .ok_or_else(|| Error::UnknownColumn {
            table: col.table.clone(),
            column: col.column.clone(),
        })?;
    Ok((ColSlot { table, column }, scope[table].schema()[column].dtype))
}

fn bind_value(value: &Value, scope: &[&Table]) -> Result<(Operand, DataType)> {
    match value {
        Value::Column(col) => {
            bind_column(col, scope).map(|(slot, dtype)| (Operand::Col(slot), dtype))
        }
        Value::Literal(datum) => Ok((Operand::Lit(datum.clone()), datum.data_type())),
    }
}

/// Binds both operands of `test` and rejects the comparison unless their
/// declared types agree. The check uses declared types only, so a mismatch
/// fails even when no row would ever be compared.
pub(crate) fn bind_test(test: &ValueTest, scope: &[&Table]) -> Result<BoundTest> {
    let (left, left_type) = bind_value(&test.left, scope)?;
    let (right, right_type) = bind_value(&test.right, scope)?;
    if left_type != right_type {
        return Err(Error::TypeMismatch {
            left: left_type,
            right: right_type,
        });
    }
    Ok(BoundTest {
        left,
        cmp: test.cmp,
        right,
    })
}

impl BoundTest {
    /// Evaluates the comparison with `tuple[i]` as the row bound to
    /// `scope[i]`. Numbers order numerically, strings lexicographically.
    pub(crate) fn eval(&self, scope: &[&Table], tuple: &[usize]) -> bool {
        match (fetch(&self.left, scope, tuple), fetch(&self.right, scope, tuple)) {
            (Some(left), Some(right)) => {
                compare(left, right).is_some_and(|ord| self.cmp.matches(ord))
            }
            _ => false,
        }
    }
}

fn fetch<'a>(operand: &'a Operand, scope: &[&'a Table], tuple: &[usize]) -> Option<&'a Datum> {
    match operand {
        Operand::Lit(datum) => Some(datum),
        Operand::Col(slot) => {
            let row = *tuple.get(slot.table)?;
            scope.get(slot.table)?.get(row, slot.column)
        }
    }
}

fn compare(left: &Datum, right: &Datum) -> Option<Ordering> {
    match (left, right) {
        (Datum::Number(l), Datum::Number(r)) => Some(l.cmp(r)),
        (Datum::Str(l), Datum::Str(r)) => Some(l.cmp(r)),
        _ => None,
    }
}
