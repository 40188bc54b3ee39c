//! Error taxonomy for the engine. One `thiserror` enum covering every
//! terminal failure the pipeline can produce, plus the crate `Result` alias.

use thiserror::Error;

use crate::table::DataType;

/// Every way a query can fail, from lexing through execution and catalog load.
#[derive(Debug, PartialEq, Eq, Error)]
pub enum Error {
    /// The tokenizer hit a character it cannot start a token with.
    #[error("lex error: unexpected character {found:?} at offset {at}")]
    Lex { found: char, at: usize },

    /// The parser expected one thing and found another.
    #[error("syntax error: expected {expected}, found {found} at offset {at}")]
    Syntax {
        expected: String,
        found: String,
        at: usize,
    },

    /// A referenced table is not in scope.
    #[error("unknown table {0}")]
    UnknownTable(String),

    /// A referenced column is absent from its table's schema.
    #[error("unknown column {column} in table {table}")]
    UnknownColumn { table: String, column: String },

    /// The two sides of a comparison have different declared types.
    #[error("type mismatch: {left:?} vs {right:?}")]
    TypeMismatch { left: DataType, right: DataType },

    /// The catalog JSON was malformed at load time.
    #[error("invalid value: {0}")]
    InvalidValue(String),
}

/// Crate-wide result type with [`Error`] as the error.
pub type Result<T> = std::result::Result<T, Error>;
