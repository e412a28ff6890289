//! Failure taxonomy shared by the sync, verifier and service layers

use crate::ownership::OracleError;
use crate::storage::StorageError;

pub type CharacterResult<T> = Result<T, CharacterError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CharacterError {
    #[error("Ownership oracle unavailable: {0}")]
    OracleUnavailable(String),

    #[error("Token {0} has not been issued")]
    InvalidId(u64),

    #[error("Character {0} not found")]
    RecordNotFound(u64),

    #[error("Invalid signature: {0}")]
    SignatureInvalid(String),

    #[error("Signer {signer} is not the owner of this character")]
    NotOwner { signer: String, owner: String },

    #[error("Update payload expired")]
    Expired { exp: Option<i64>, now: i64 },

    #[error("Validation failed for {field}: {reason}")]
    ValidationFailed { field: String, reason: String },

    #[error("Store I/O error: {0}")]
    StoreIo(String),
}

impl CharacterError {
    /// Stable machine-readable kind, used by clients to pick a message.
    pub fn kind(&self) -> &'static str {
        match self {
            CharacterError::OracleUnavailable(_) => "oracle_unavailable",
            CharacterError::InvalidId(_) => "invalid_id",
            CharacterError::RecordNotFound(_) => "record_not_found",
            CharacterError::SignatureInvalid(_) => "signature_invalid",
            CharacterError::NotOwner { .. } => "not_owner",
            CharacterError::Expired { .. } => "expired",
            CharacterError::ValidationFailed { .. } => "validation_failed",
            CharacterError::StoreIo(_) => "store_io",
        }
    }

    pub fn validation(field: &str, reason: &str) -> Self {
        CharacterError::ValidationFailed {
            field: field.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl From<OracleError> for CharacterError {
    fn from(err: OracleError) -> Self {
        match err {
            OracleError::Unavailable(reason) => CharacterError::OracleUnavailable(reason),
            OracleError::InvalidId(id) => CharacterError::InvalidId(id),
        }
    }
}

impl From<StorageError> for CharacterError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(id) => CharacterError::RecordNotFound(id),
            other => CharacterError::StoreIo(other.to_string()),
        }
    }
}
