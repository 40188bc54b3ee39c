mod db;
mod error;
mod eval;
mod parser;
mod select;
mod table;
mod token;

pub use crate::{
    db::Database,
    error::{Error, Result},
    parser::parse_query,
    select::{Cmp, ColumnRef, JoinClause, ResultSet, SelectStmt, Value, ValueTest, exec_select},
    table::{ColumnSchema, DataType, Datum, Table},
    token::{Keyword, Token, TokenKind, tokenize},
};
