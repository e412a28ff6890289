// Ownership oracle boundary and the sync pass that folds its answers into records

use async_trait::async_trait;

pub mod ethereum;
pub mod static_oracle;
pub mod sync;

pub use ethereum::EthereumOwnershipOracle;
pub use static_oracle::StaticOwnershipOracle;
pub use sync::OwnershipSync;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OracleError {
    #[error("Ownership oracle unavailable: {0}")]
    Unavailable(String),

    #[error("Token {0} has not been issued")]
    InvalidId(u64),
}

/// Read-only view of the token contract's ownership table.
#[async_trait]
pub trait OwnershipOracle: Send + Sync {
    /// Current owner address of `token_id`.
    async fn owner_of(&self, token_id: u64) -> Result<String, OracleError>;
}
