use serde::{Deserialize, Serialize};

/// Locations of the off-chain assets attached to a character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterUrls {
    pub profile: String,
    pub metadata: String,
    pub image: String,
}

/// Profile record bound to one ERC-721 token.
///
/// `id` is the token id. `owner` mirrors the contract's `ownerOf(id)` as of the
/// last successful sync and is never written from client input. Only
/// `description` and `statement` are mutable through signed updates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub id: u64,
    pub owner: String,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub statement: String,
    pub urls: CharacterUrls,
}

impl Character {
    /// Overwrite the owner-editable fields. A missing statement clears it.
    pub fn apply_details(&mut self, description: &str, statement: Option<&str>) {
        self.description = description.to_string();
        self.statement = statement.unwrap_or_default().to_string();
    }
}
