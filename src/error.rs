//! Error types shared by the parser, the table engine and the storage layer.

use thiserror::Error;

use crate::data_type::DataType;
use crate::value::Value;

/// Every failure a command can produce.
///
/// Variants carry the offending table, column or token so the shell can print
/// a useful message and keep reading commands.
#[derive(Debug, Error)]
pub enum DbError {
    // --- catalog ---
    #[error("table \"{0}\" already exists")]
    DuplicateTable(String),

    #[error("table \"{0}\" does not exist")]
    UnknownTable(String),

    #[error("invalid table name \"{0}\"; use letters, digits, '_' or '-'")]
    InvalidTableName(String),

    #[error("table name \"{0}\" is reserved by the storage")]
    ReservedTableName(String),

    #[error("invalid type \"{ty}\" for column \"{column}\"; allowed types: int, str, bool")]
    InvalidColumnType { column: String, ty: String },

    // --- row engine ---
    #[error("expected {expected} values, got {found}")]
    ArityMismatch { expected: usize, found: usize },

    #[error("value {value} does not fit column \"{column}\" of type {expected}")]
    TypeMismatch {
        column: String,
        expected: DataType,
        value: Value,
    },

    #[error("column \"{0}\" does not exist")]
    UnknownColumn(String),

    #[error("{0} requires a where clause")]
    MissingCondition(&'static str),

    // --- parser ---
    #[error("invalid column spec \"{0}\", expected name:type")]
    InvalidColumnSpec(String),

    #[error("invalid value \"{0}\"")]
    InvalidLiteral(String),

    #[error("malformed condition \"{0}\", expected column = value")]
    MalformedCondition(String),

    #[error("missing VALUES in insert command")]
    MissingValues,

    #[error("malformed insert \"{0}\", expected: insert into <table> values (...)")]
    MalformedInsert(String),

    #[error("missing table name in \"{0}\"")]
    MissingTableName(String),

    #[error("malformed {command} command, expected: {usage}")]
    MalformedCommand {
        command: &'static str,
        usage: &'static str,
    },

    #[error("unknown command \"{0}\"")]
    UnknownCommand(String),

    #[error("unterminated quote in \"{0}\"")]
    UnterminatedQuote(String),

    // --- collaborators ---
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, DbError>;
