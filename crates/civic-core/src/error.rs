//! Unified Error Model
use crate::store::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CivicError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Issue not found: {0}")]
    NotFound(String),
}

impl CivicError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

pub type CivicResult<T> = Result<T, CivicError>;
