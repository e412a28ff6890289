use super::{CharacterArena, CharacterStore, Result};
use crate::models::Character;
use async_trait::async_trait;
use tokio::sync::Mutex;

/// Volatile store for tests and dry runs
pub struct MemoryCharacterStore {
    arena: Mutex<CharacterArena>,
}

impl MemoryCharacterStore {
    pub fn new(characters: Vec<Character>) -> Self {
        Self {
            arena: Mutex::new(CharacterArena::new(characters)),
        }
    }

    /// Store preloaded with the launch dataset.
    pub fn with_defaults() -> Result<Self> {
        Ok(Self::new(super::default_characters()?))
    }
}

#[async_trait]
impl CharacterStore for MemoryCharacterStore {
    async fn load_all(&self) -> Result<Vec<Character>> {
        Ok(self.arena.lock().await.records().to_vec())
    }

    async fn get(&self, id: u64) -> Result<Option<Character>> {
        Ok(self.arena.lock().await.get(id).cloned())
    }

    async fn save(&self, character: &Character) -> Result<()> {
        let mut arena = self.arena.lock().await;
        *arena.get_mut(character.id)? = character.clone();
        Ok(())
    }

    async fn set_owner(&self, id: u64, owner: &str) -> Result<()> {
        let mut arena = self.arena.lock().await;
        arena.get_mut(id)?.owner = owner.to_string();
        Ok(())
    }

    async fn set_details(
        &self,
        id: u64,
        description: &str,
        statement: &str,
    ) -> Result<Character> {
        let mut arena = self.arena.lock().await;
        let record = arena.get_mut(id)?;
        record.apply_details(description, Some(statement));
        Ok(record.clone())
    }
}
