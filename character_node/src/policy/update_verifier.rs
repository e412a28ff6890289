use crate::crypto::{addresses_equal, recover_address};
use crate::errors::{CharacterError, CharacterResult};
use crate::models::{Character, UpdateEnvelope, UpdatePayload, UPDATE_ACTION, UPDATE_AUDIENCE};
use crate::ownership::OwnershipSync;
use crate::storage::CharacterStore;
use log::{info, warn};
use std::sync::Arc;

/// Gatekeeper for owner-signed detail updates.
///
/// A request is applied only if, in this order: the character exists, the
/// signature recovers to a signer (matching the claimed address when one is
/// given), that signer is the character's current on-chain owner, the payload
/// has not expired, and the claims and params are well formed.
pub struct UpdateVerifier {
    store: Arc<dyn CharacterStore>,
    sync: OwnershipSync,
    audience: String,
    action: String,
}

impl UpdateVerifier {
    pub fn new(store: Arc<dyn CharacterStore>, sync: OwnershipSync) -> Self {
        Self {
            store,
            sync,
            audience: UPDATE_AUDIENCE.to_string(),
            action: UPDATE_ACTION.to_string(),
        }
    }

    pub fn with_claims(mut self, audience: &str, action: &str) -> Self {
        self.audience = audience.to_string();
        self.action = action.to_string();
        self
    }

    pub async fn verify_and_apply(&self, envelope: &UpdateEnvelope) -> CharacterResult<Character> {
        self.verify_and_apply_at(envelope, chrono::Utc::now().timestamp())
            .await
    }

    /// Same as [`verify_and_apply`](Self::verify_and_apply) with an explicit
    /// unix time for the expiry check.
    pub async fn verify_and_apply_at(
        &self,
        envelope: &UpdateEnvelope,
        now: i64,
    ) -> CharacterResult<Character> {
        let token_id = envelope.payload.sub;
        let result = self.apply(envelope, now).await;
        match &result {
            Ok(_) => info!("Character {} details updated", token_id),
            Err(e) => warn!(
                "Rejected update for character {} ({}): {}",
                token_id,
                e.kind(),
                e
            ),
        }
        result
    }

    async fn apply(&self, envelope: &UpdateEnvelope, now: i64) -> CharacterResult<Character> {
        let payload = &envelope.payload;

        let stored = self
            .store
            .get(payload.sub)
            .await?
            .ok_or(CharacterError::RecordNotFound(payload.sub))?;
        let character = self.sync.sync(stored).await?;

        let signer = recover_signer(envelope)?;
        if !addresses_equal(&signer, &character.owner) {
            return Err(CharacterError::NotOwner {
                signer,
                owner: character.owner,
            });
        }

        match payload.exp {
            Some(exp) if now <= exp => {}
            exp => return Err(CharacterError::Expired { exp, now }),
        }

        let description = self.validate(payload)?;
        let statement = payload.params.statement.as_deref().unwrap_or_default();
        Ok(self
            .store
            .set_details(character.id, description, statement)
            .await?)
    }

    fn validate<'a>(&self, payload: &'a UpdatePayload) -> CharacterResult<&'a str> {
        if payload.aud.as_deref() != Some(self.audience.as_str()) {
            return Err(CharacterError::validation("aud", "unexpected audience"));
        }
        if payload.action.as_deref() != Some(self.action.as_str()) {
            return Err(CharacterError::validation("action", "unsupported action"));
        }
        match payload.params.description.as_deref() {
            Some(description) if !description.is_empty() => Ok(description),
            _ => Err(CharacterError::validation("description", "must not be empty")),
        }
    }
}

/// Address that signed the canonical form of `envelope.payload`.
pub fn recover_signer(envelope: &UpdateEnvelope) -> CharacterResult<String> {
    let message = envelope
        .payload
        .canonical()
        .map_err(|e| CharacterError::SignatureInvalid(e.to_string()))?;
    let signer = recover_address(message.as_bytes(), &envelope.signature)
        .map_err(|e| CharacterError::SignatureInvalid(e.to_string()))?;

    match &envelope.address {
        Some(claimed) if !addresses_equal(claimed, &signer) => Err(
            CharacterError::SignatureInvalid(format!("signature does not match {}", claimed)),
        ),
        _ => Ok(signer),
    }
}
