use super::{CharacterArena, CharacterStore, Result, StorageError};
use crate::models::Character;
use async_trait::async_trait;
use log::{debug, info};
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// Flat-file store holding the whole character set as one JSON array.
///
/// The file is read once, on first access, and is the seed target when it does
/// not exist yet. Afterwards the in-memory arena is authoritative and every
/// mutation rewrites the file wholesale through a temp file + rename, so a
/// crash mid-write never leaves a truncated database behind.
pub struct FileCharacterStore {
    path: PathBuf,
    arena: Mutex<Option<CharacterArena>>,
}

impl FileCharacterStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            arena: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn open(&self) -> Result<CharacterArena> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => {
                let characters = super::parse_characters(&raw)?;
                debug!("Loaded {} characters from {:?}", characters.len(), self.path);
                Ok(CharacterArena::new(characters))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let characters = super::default_characters()?;
                persist(&self.path, &characters).await?;
                info!(
                    "Seeded {} default characters into {:?}",
                    characters.len(),
                    self.path
                );
                Ok(CharacterArena::new(characters))
            }
            Err(e) => Err(StorageError::ReadError(format!("{:?}: {}", self.path, e))),
        }
    }

    /// Run `mutate` on the record `id` and persist the full set, returning the
    /// mutated record. The in-memory record is restored if the write fails.
    async fn modify<F>(&self, id: u64, mutate: F) -> Result<Character>
    where
        F: FnOnce(&mut Character) + Send,
    {
        let mut guard = self.arena.lock().await;
        if guard.is_none() {
            *guard = Some(self.open().await?);
        }
        let arena = guard.as_mut().ok_or(StorageError::NotFound(id))?;

        let record = arena.get_mut(id)?;
        let previous = record.clone();
        mutate(record);
        let updated = record.clone();

        if let Err(e) = persist(&self.path, arena.records()).await {
            *arena.get_mut(id)? = previous;
            return Err(e);
        }
        Ok(updated)
    }
}

#[async_trait]
impl CharacterStore for FileCharacterStore {
    async fn load_all(&self) -> Result<Vec<Character>> {
        let mut guard = self.arena.lock().await;
        if guard.is_none() {
            *guard = Some(self.open().await?);
        }
        Ok(guard
            .as_ref()
            .map(|arena| arena.records().to_vec())
            .unwrap_or_default())
    }

    async fn get(&self, id: u64) -> Result<Option<Character>> {
        let mut guard = self.arena.lock().await;
        if guard.is_none() {
            *guard = Some(self.open().await?);
        }
        Ok(guard.as_ref().and_then(|arena| arena.get(id).cloned()))
    }

    async fn save(&self, character: &Character) -> Result<()> {
        let replacement = character.clone();
        self.modify(character.id, move |record| *record = replacement)
            .await?;
        Ok(())
    }

    async fn set_owner(&self, id: u64, owner: &str) -> Result<()> {
        let owner = owner.to_string();
        self.modify(id, move |record| record.owner = owner).await?;
        Ok(())
    }

    async fn set_details(
        &self,
        id: u64,
        description: &str,
        statement: &str,
    ) -> Result<Character> {
        let (description, statement) = (description.to_string(), statement.to_string());
        self.modify(id, move |record| {
            record.apply_details(&description, Some(statement.as_str()))
        })
        .await
    }
}

/// Pretty-print `characters` (two-space indent) and atomically replace `path`.
async fn persist(path: &Path, characters: &[Character]) -> Result<()> {
    let body = serde_json::to_vec_pretty(characters)
        .map_err(|e| StorageError::WriteError(e.to_string()))?;
    let path = path.to_path_buf();

    tokio::task::spawn_blocking(move || write_atomically(&path, &body))
        .await
        .map_err(|e| StorageError::WriteError(e.to_string()))?
}

fn write_atomically(path: &Path, body: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir).map_err(|e| StorageError::WriteError(e.to_string()))?;

    let mut tmp = tempfile::NamedTempFile::new_in(&dir)
        .map_err(|e| StorageError::WriteError(e.to_string()))?;
    tmp.write_all(body)
        .and_then(|_| tmp.as_file().sync_all())
        .map_err(|e| StorageError::WriteError(e.to_string()))?;
    tmp.persist(path)
        .map_err(|e| StorageError::WriteError(e.to_string()))?;
    Ok(())
}
