use serde::{Deserialize, Serialize};

/// Audience claim the web client stamps on every update payload.
pub const UPDATE_AUDIENCE: &str = "yamete-kudasai-nft";

/// Action claim for profile detail updates.
pub const UPDATE_ACTION: &str = "update-character";

/// Requested values for the owner-editable fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statement: Option<String>,
}

/// Claims signed by the token owner's wallet.
///
/// Field order is the signing order: `sub, aud, exp, iat, action, params`.
/// Absent optional claims are omitted, matching how a browser serializes the
/// same object literal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdatePayload {
    pub sub: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    pub params: UpdateParams,
}

impl UpdatePayload {
    /// Payload for a detail update on `token_id`, valid for `ttl_secs` from `now`.
    pub fn new(token_id: u64, description: &str, statement: &str, now: i64, ttl_secs: i64) -> Self {
        Self {
            sub: token_id,
            aud: Some(UPDATE_AUDIENCE.to_string()),
            exp: Some(now + ttl_secs),
            iat: Some(now),
            action: Some(UPDATE_ACTION.to_string()),
            params: UpdateParams {
                description: Some(description.to_string()),
                statement: Some(statement.to_string()),
            },
        }
    }

    /// The exact message the wallet signs.
    pub fn canonical(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Body of an update request: the payload, its detached `personal_sign`
/// signature, and optionally the account the wallet was asked to sign with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateEnvelope {
    pub payload: UpdatePayload,
    pub signature: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_key_order_matches_client() {
        let payload = UpdatePayload::new(0, "new", "", 1_700_000_000, 120);
        assert_eq!(
            payload.canonical().unwrap(),
            r#"{"sub":0,"aud":"yamete-kudasai-nft","exp":1700000120,"iat":1700000000,"action":"update-character","params":{"description":"new","statement":""}}"#
        );
    }

    #[test]
    fn test_canonical_omits_absent_claims() {
        let payload: UpdatePayload =
            serde_json::from_str(r#"{"params":{"description":"d"},"sub":7}"#).unwrap();
        assert_eq!(
            payload.canonical().unwrap(),
            r#"{"sub":7,"params":{"description":"d"}}"#
        );
    }

    #[test]
    fn test_canonical_is_independent_of_input_key_order() {
        let a: UpdatePayload = serde_json::from_str(
            r#"{"action":"update-character","params":{"statement":"s","description":"d"},"iat":1,"exp":2,"aud":"yamete-kudasai-nft","sub":4}"#,
        )
        .unwrap();
        let b = UpdatePayload {
            sub: 4,
            aud: Some(UPDATE_AUDIENCE.to_string()),
            exp: Some(2),
            iat: Some(1),
            action: Some(UPDATE_ACTION.to_string()),
            params: UpdateParams {
                description: Some("d".to_string()),
                statement: Some("s".to_string()),
            },
        };
        assert_eq!(a.canonical().unwrap(), b.canonical().unwrap());
    }
}
