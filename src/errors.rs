use thiserror::Error;
use uuid::Uuid;

use crate::domain::company::CompanyType;
use crate::domain::transaction::Transaction;

/// User-correctable input problems, raised before anything is written.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("amount must be positive, have at most two decimals and not exceed 1000000000000")]
    InvalidAmount,
    #[error("description is required")]
    EmptyDescription,
    #[error("name is required")]
    EmptyName,
    #[error("no {0} selected")]
    MissingSelection(&'static str),
    #[error("company {company} is not an {expected:?}")]
    RoleMismatch { company: Uuid, expected: CompanyType },
}

/// Failures reported by a record store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Record not found: {0}")]
    NotFound(String),
    #[error("Unsupported store operation: {0}")]
    Unsupported(&'static str),
    #[error("Store failure: {0}")]
    Backend(String),
    /// A stored record does not match the ledger schema.
    #[error("Invalid stored record: {0}")]
    InvalidRecord(String),
}

/// Error type returned by the ledger services and the query façade.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Not authenticated")]
    Unauthenticated,
    #[error(transparent)]
    Store(#[from] StoreError),
    /// The receiving half of a payment was stored but the paying half was not.
    /// `orphan` is the stored half; the ledger stays unbalanced until it is
    /// removed or its counterpart is inserted.
    #[error("payment partially recorded: transaction {} has no counterpart ({source})", .orphan.id)]
    PartialLedgerInconsistency {
        orphan: Box<Transaction>,
        #[source]
        source: StoreError,
    },
}

pub type LedgerResult<T> = Result<T, LedgerError>;
