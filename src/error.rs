//! Error types for the data-access layer.
//!
//! Lookups never fail for a missing row (they return `None` or an empty
//! sequence). The only failures are the store refusing a query and the store
//! refusing a commit.

use std::fmt;

use sea_orm::DbErr;
use thiserror::Error;

/// Kind of staged change, used in commit diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Insert => "insert",
            Self::Update => "update",
            Self::Delete => "delete",
        };
        f.write_str(name)
    }
}

/// A commit failed. None of the batch is durable.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// The store rejected a statement (constraint violation, lost connection, ...).
    #[error("store rejected the batch while applying {kind} on `{table}`")]
    Rejected {
        kind: ChangeKind,
        table: String,
        #[source]
        source: DbErr,
    },

    /// A statement ran but touched an unexpected number of rows.
    #[error("{kind} on `{table}` affected {affected} row(s), expected {expected}")]
    RowCount {
        kind: ChangeKind,
        table: String,
        affected: u64,
        expected: u64,
    },

    /// Opening or committing the transaction failed.
    #[error("transaction failed")]
    Transaction(#[source] DbErr),
}

/// Errors surfaced by repository reads and unit-of-work commits.
#[derive(Debug, Error)]
pub enum Error {
    #[error("query failed")]
    Query(#[from] DbErr),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

pub type Result<T> = std::result::Result<T, Error>;
