use async_trait::async_trait;

use crate::models::Character;

pub mod file;
pub mod memory;

pub use file::FileCharacterStore;
pub use memory::MemoryCharacterStore;

/// Launch dataset written on first access when nothing is persisted yet.
pub const DEFAULT_CHARACTERS: &str = include_str!("../../data/characters.default.json");

// Storage-specific Result type
pub type Result<T> = std::result::Result<T, StorageError>;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Character not found: {0}")]
    NotFound(u64),

    #[error("Read error: {0}")]
    ReadError(String),

    #[error("Write error: {0}")]
    WriteError(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Durable id -> character mapping.
///
/// Records are never created or removed through this trait once seeded;
/// mutations replace fields of an existing id and persist the whole set.
#[async_trait]
pub trait CharacterStore: Send + Sync {
    /// All records in dataset order, seeding the defaults on first access.
    async fn load_all(&self) -> Result<Vec<Character>>;

    async fn get(&self, id: u64) -> Result<Option<Character>>;

    /// Replace the record sharing `character.id`.
    async fn save(&self, character: &Character) -> Result<()>;

    /// Overwrite only the owner of `id`.
    async fn set_owner(&self, id: u64, owner: &str) -> Result<()>;

    /// Overwrite only `description` and `statement` of `id`, returning the
    /// record as stored afterwards (with whatever owner it holds by then).
    async fn set_details(&self, id: u64, description: &str, statement: &str)
        -> Result<Character>;
}

/// Parse the bundled launch dataset.
pub fn default_characters() -> Result<Vec<Character>> {
    parse_characters(DEFAULT_CHARACTERS)
}

pub(crate) fn parse_characters(raw: &str) -> Result<Vec<Character>> {
    let characters: Vec<Character> =
        serde_json::from_str(raw).map_err(|e| StorageError::InvalidData(e.to_string()))?;

    let mut seen = std::collections::HashSet::new();
    for character in &characters {
        if !seen.insert(character.id) {
            return Err(StorageError::InvalidData(format!(
                "duplicate character id {}",
                character.id
            )));
        }
    }
    Ok(characters)
}

/// Arena of records plus an id index, shared by the store implementations.
#[derive(Debug, Default)]
pub(crate) struct CharacterArena {
    records: Vec<Character>,
    index: std::collections::HashMap<u64, usize>,
}

impl CharacterArena {
    pub(crate) fn new(records: Vec<Character>) -> Self {
        let index = records
            .iter()
            .enumerate()
            .map(|(slot, character)| (character.id, slot))
            .collect();
        Self { records, index }
    }

    pub(crate) fn records(&self) -> &[Character] {
        &self.records
    }

    pub(crate) fn get(&self, id: u64) -> Option<&Character> {
        self.index.get(&id).map(|slot| &self.records[*slot])
    }

    pub(crate) fn get_mut(&mut self, id: u64) -> Result<&mut Character> {
        let slot = *self.index.get(&id).ok_or(StorageError::NotFound(id))?;
        Ok(&mut self.records[slot])
    }
}
