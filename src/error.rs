//! Planner error types.
//!
//! Every failure the planner surfaces carries a MySQL-compatible numeric
//! code so a server layer can put it on the wire unchanged. Internal
//! invariant breaches (an expression shape the upstream gates must have
//! rejected) are panics, not errors.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("database already exists")]
    DatabaseExists,
    #[error("database doesn't exist")]
    DbDropExists,
    #[error("unknown database '{0}'")]
    BadDb(String),
    #[error("table already exists")]
    TableExists,
    #[error("unknown table '{0}'")]
    BadTable(String),
    #[error("table '{0}' doesn't exist")]
    NoSuchTable(String),
    #[error("unknown column '{0}'")]
    BadField(String),
    #[error("Operand should contain 1 column(s)")]
    OneColumn,
    #[error("Operand should contain >= 2 columns for Row")]
    RowColumns,
    #[error("Operands should contain same columns")]
    SameColumns,
    #[error("wildcard field exist more than once")]
    MultiWildCard,
    #[error("incomparable values in range bounds")]
    Comparison,
    #[error("statement is not supported by this planner")]
    Unsupported,
}

impl Error {
    /// MySQL-compatible error code for the wire protocol.
    pub fn code(&self) -> u16 {
        match self {
            Error::DatabaseExists => 1007,
            Error::DbDropExists => 1008,
            Error::BadDb(_) => 1049,
            Error::TableExists => 1050,
            Error::BadTable(_) => 1051,
            Error::BadField(_) => 1054,
            Error::NoSuchTable(_) => 1146,
            Error::OneColumn | Error::RowColumns | Error::SameColumns => 1241,
            Error::MultiWildCard | Error::Comparison => 1105,
            Error::Unsupported => 1235,
        }
    }
}
