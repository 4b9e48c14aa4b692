use modkit::CtxError;
use thiserror::Error;

use crate::contract::model::AccountId;

/// One violated input constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: &'static str,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("validation failed: {} violation(s)", .0.len())]
    Validation(Vec<FieldViolation>),

    #[error("account '{id}' already exists")]
    DuplicateIdentity { id: AccountId },

    #[error("account '{id}' not found")]
    NotFound { id: AccountId },

    #[error("request deadline exceeded")]
    DeadlineExceeded,

    #[error("request cancelled")]
    Cancelled,

    #[error("insert failed: {0}")]
    InsertFailed(String),

    #[error("repository failure: {0}")]
    Repository(String),

    /// Stored data contradicts a storage invariant (e.g. two rows for one key).
    #[error("integrity violation: {0}")]
    Integrity(String),
}

impl DomainError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation(vec![FieldViolation::new(field, message)])
    }

    pub fn repository(e: impl std::fmt::Display) -> Self {
        Self::Repository(e.to_string())
    }

    pub fn insert_failed(e: impl std::fmt::Display) -> Self {
        Self::InsertFailed(e.to_string())
    }
}

impl From<CtxError> for DomainError {
    fn from(e: CtxError) -> Self {
        match e {
            CtxError::DeadlineExceeded => Self::DeadlineExceeded,
            CtxError::Cancelled => Self::Cancelled,
        }
    }
}
