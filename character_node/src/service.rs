use crate::errors::CharacterResult;
use crate::models::{Character, UpdateEnvelope};
use crate::ownership::{OwnershipOracle, OwnershipSync};
use crate::policy::UpdateVerifier;
use crate::storage::CharacterStore;
use std::sync::Arc;
use std::time::Duration;

/// Query and update surface composed from the store, the ownership sync and
/// the update verifier.
pub struct CharacterService {
    store: Arc<dyn CharacterStore>,
    sync: OwnershipSync,
    verifier: UpdateVerifier,
}

impl CharacterService {
    pub fn new(
        store: Arc<dyn CharacterStore>,
        oracle: Arc<dyn OwnershipOracle>,
        oracle_deadline: Duration,
    ) -> Self {
        let sync = OwnershipSync::new(oracle, store.clone(), oracle_deadline);
        let verifier = UpdateVerifier::new(store.clone(), sync.clone());
        Self {
            store,
            sync,
            verifier,
        }
    }

    /// Replace the verifier, e.g. to use non-default audience/action claims.
    pub fn with_verifier(mut self, verifier: UpdateVerifier) -> Self {
        self.verifier = verifier;
        self
    }

    pub fn store(&self) -> Arc<dyn CharacterStore> {
        self.store.clone()
    }

    pub fn sync(&self) -> &OwnershipSync {
        &self.sync
    }

    /// Every character in store order, owners refreshed from the chain.
    pub async fn list_characters(&self) -> CharacterResult<Vec<Character>> {
        let characters = self.store.load_all().await?;
        self.sync.sync_all(characters).await
    }

    /// The character addressed by `token_id`, or `None` when the token does not
    /// coerce to a stored id. Only the matched record is synced.
    pub async fn get_character(&self, token_id: &str) -> CharacterResult<Option<Character>> {
        let id = match coerce_token_id(token_id) {
            Some(id) => id,
            None => return Ok(None),
        };
        match self.store.get(id).await? {
            Some(character) => Ok(Some(self.sync.sync(character).await?)),
            None => Ok(None),
        }
    }

    pub async fn update_character(&self, envelope: &UpdateEnvelope) -> CharacterResult<Character> {
        self.verifier.verify_and_apply(envelope).await
    }

    pub async fn update_character_at(
        &self,
        envelope: &UpdateEnvelope,
        now: i64,
    ) -> CharacterResult<Character> {
        self.verifier.verify_and_apply_at(envelope, now).await
    }
}

/// Numeric coercion of an id token: `"3"`, `" 3 "`, `"3.0"`, `"3e0"`,
/// `"0x3"`, `"0o3"` and `"0b11"` all address token 3; anything that is not a
/// non-negative integral number addresses nothing.
pub fn coerce_token_id(token: &str) -> Option<u64> {
    let token = token.trim();
    if token.is_empty() {
        return None;
    }
    if let Ok(id) = token.parse::<u64>() {
        return Some(id);
    }
    if let Some(id) = parse_prefixed_integer(token) {
        return Some(id);
    }

    let value = token.parse::<f64>().ok()?;
    if value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value <= u64::MAX as f64 {
        Some(value as u64)
    } else {
        None
    }
}

/// `0x`/`0o`/`0b` integer literals; no sign, at least one digit.
fn parse_prefixed_integer(token: &str) -> Option<u64> {
    let radix = match token.get(..2)? {
        "0x" | "0X" => 16,
        "0o" | "0O" => 8,
        "0b" | "0B" => 2,
        _ => return None,
    };
    let digits = &token[2..];
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    u64::from_str_radix(digits, radix).ok()
}
