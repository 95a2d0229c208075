//! The module contains the errors the engine can throw.
//!
//! The errors are:
//!
//! - [`KeyNotFound`] thrown when a wallet, transaction, subscription or
//!   category does not exist or is not owned by the caller.
//! - [`InvalidArgument`] thrown on non-positive amounts, bad installment
//!   counts, malformed dates and similar validation failures.
//! - [`InsufficientFunds`] thrown when a debit would take a wallet below zero.
//! - [`Conflict`] thrown when the store reports a concurrent-write conflict.
//!   These are retried by the engine before being surfaced.
//!
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`InvalidArgument`]: EngineError::InvalidArgument
//!  [`InsufficientFunds`]: EngineError::InsufficientFunds
//!  [`Conflict`]: EngineError::Conflict
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    AlreadyExists(String),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Conflicting write: {0}")]
    Conflict(String),
    #[error(transparent)]
    Database(DbErr),
}

impl EngineError {
    /// Stable machine-readable code for the error kind.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InsufficientFunds(_) => "insufficient_funds",
            Self::KeyNotFound(_) => "not_found",
            Self::AlreadyExists(_) => "already_exists",
            Self::InvalidArgument(_) => "invalid_argument",
            Self::Conflict(_) => "conflict",
            Self::Database(_) => "internal",
        }
    }

    /// Returns `true` when retrying the whole operation may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}

impl From<DbErr> for EngineError {
    fn from(value: DbErr) -> Self {
        if is_transient_db_error(&value) {
            return Self::Conflict(value.to_string());
        }
        Self::Database(value)
    }
}

/// SQLite reports lock contention as `SQLITE_BUSY`/`SQLITE_LOCKED`, which
/// surface as "database is locked" / "database table is locked" messages.
fn is_transient_db_error(err: &DbErr) -> bool {
    match err {
        DbErr::ConnectionAcquire(_) | DbErr::RecordNotUpdated => true,
        DbErr::Exec(_) | DbErr::Query(_) | DbErr::Conn(_) => {
            let message = err.to_string().to_lowercase();
            message.contains("database is locked")
                || message.contains("database table is locked")
                || message.contains("sqlite_busy")
                || message.contains("deadlock")
        }
        _ => false,
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InsufficientFunds(a), Self::InsufficientFunds(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::AlreadyExists(a), Self::AlreadyExists(b)) => a == b,
            (Self::InvalidArgument(a), Self::InvalidArgument(b)) => a == b,
            (Self::Conflict(a), Self::Conflict(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
