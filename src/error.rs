//! Error handling module
//!
//! Typed failures for the change engine. Nothing in this crate panics on bad
//! input; lookups that fail during a revert come back as [`RevertError`].

use crate::models::ChangeKey;
use thiserror::Error;

/// Failure while computing a reverted schema
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RevertError {
    #[error("Table not found")]
    TableNotFound,

    #[error("Column not found")]
    ColumnNotFound,

    #[error("Foreign key not found")]
    ForeignKeyNotFound,

    #[error("Change {0} does not identify an object")]
    MissingObjectId(ChangeKey),
}

/// Structural problems in a schema snapshot
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Duplicate table id: {0}")]
    DuplicateTableId(String),

    #[error("Duplicate column id {id} in table {table}")]
    DuplicateColumnId { table: String, id: String },

    #[error("Duplicate foreign key id {id} in table {table}")]
    DuplicateForeignKeyId { table: String, id: String },

    #[error("Invalid table {table}: {details}")]
    Invalid { table: String, details: String },
}

/// Result type alias for revert computation
pub type RevertOutcome<T> = Result<T, RevertError>;
