use super::{OracleError, OwnershipOracle};
use crate::errors::{CharacterError, CharacterResult};
use crate::models::Character;
use crate::storage::CharacterStore;
use futures::future::try_join_all;
use log::{info, warn};
use std::sync::Arc;
use std::time::Duration;

/// Folds the oracle's current owner into stored records.
///
/// Failures are strict: if the oracle cannot answer within the deadline, the
/// enclosing operation fails instead of serving a possibly stale owner.
#[derive(Clone)]
pub struct OwnershipSync {
    oracle: Arc<dyn OwnershipOracle>,
    store: Arc<dyn CharacterStore>,
    deadline: Duration,
}

impl OwnershipSync {
    pub fn new(
        oracle: Arc<dyn OwnershipOracle>,
        store: Arc<dyn CharacterStore>,
        deadline: Duration,
    ) -> Self {
        Self {
            oracle,
            store,
            deadline,
        }
    }

    /// Current owner of `token_id`, bounded by the configured deadline.
    pub async fn current_owner(&self, token_id: u64) -> CharacterResult<String> {
        match tokio::time::timeout(self.deadline, self.oracle.owner_of(token_id)).await {
            Ok(Ok(owner)) => Ok(owner),
            Ok(Err(e)) => {
                warn!("ownerOf({}) failed: {}", token_id, e);
                Err(e.into())
            }
            Err(_) => {
                warn!("ownerOf({}) timed out after {:?}", token_id, self.deadline);
                Err(OracleError::Unavailable(format!(
                    "no answer within {:?}",
                    self.deadline
                ))
                .into())
            }
        }
    }

    /// Refresh `character.owner` from the oracle, persisting it when it moved.
    pub async fn sync(&self, mut character: Character) -> CharacterResult<Character> {
        let owner = self.current_owner(character.id).await?;
        if owner != character.owner {
            self.store
                .set_owner(character.id, &owner)
                .await
                .map_err(CharacterError::from)?;
            info!(
                "Character {} owner changed {} -> {}",
                character.id, character.owner, owner
            );
            character.owner = owner;
        }
        Ok(character)
    }

    /// Sync every record concurrently; the first failure fails the whole pass.
    pub async fn sync_all(&self, characters: Vec<Character>) -> CharacterResult<Vec<Character>> {
        try_join_all(characters.into_iter().map(|character| self.sync(character))).await
    }
}
