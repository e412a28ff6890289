use super::{OracleError, OwnershipOracle};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::RwLock;

/// In-memory ownership table for tests and offline runs
#[derive(Default)]
pub struct StaticOwnershipOracle {
    owners: RwLock<HashMap<u64, String>>,
    unavailable: AtomicBool,
    calls: AtomicUsize,
}

impl StaticOwnershipOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_owners<I, S>(owners: I) -> Self
    where
        I: IntoIterator<Item = (u64, S)>,
        S: Into<String>,
    {
        let oracle = Self::new();
        for (token_id, owner) in owners {
            oracle.set_owner(token_id, owner);
        }
        oracle
    }

    /// Record a transfer of `token_id` to `owner`.
    pub fn set_owner(&self, token_id: u64, owner: impl Into<String>) {
        if let Ok(mut owners) = self.owners.write() {
            owners.insert(token_id, owner.into());
        }
    }

    /// Make every subsequent lookup fail as if the node were down.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of lookups served so far, failed ones included.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OwnershipOracle for StaticOwnershipOracle {
    async fn owner_of(&self, token_id: u64) -> Result<String, OracleError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(OracleError::Unavailable("node offline".to_string()));
        }

        let owners = self
            .owners
            .read()
            .map_err(|_| OracleError::Unavailable("ownership table poisoned".to_string()))?;
        owners
            .get(&token_id)
            .cloned()
            .ok_or(OracleError::InvalidId(token_id))
    }
}
