//! In-memory port implementations for tests and single-node dev runs.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use telluria_data::{Character, User};
use uuid::Uuid;

use crate::ports::{
    CharacterDirectory, KeyValueStore, StoreError, UserRepository, WorldEntityRecord,
    WorldEntityRepository,
};

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self) -> bool {
        self.expires_at.map(|at| Instant::now() >= at).unwrap_or(false)
    }
}

/// HashMap-backed stand-in for the external key-value store.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: Mutex<HashMap<String, Entry>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Test helper: forces a key's window to elapse immediately.
    pub async fn force_expire(&self, key: &str) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let expired = entries.get(key).map(Entry::is_expired).unwrap_or(false);
        if expired {
            entries.remove(key);
            return Ok(None);
        }
        Ok(entries.get(key).map(|entry| entry.value.clone()))
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: Some(Instant::now() + ttl),
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }

    async fn incr(&self, key: &str) -> Result<i64, StoreError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let next = match entries.get(key) {
            Some(entry) if !entry.is_expired() => {
                entry.value.parse::<i64>().unwrap_or(0) + 1
            }
            _ => 1,
        };
        let expires_at = entries
            .get(key)
            .filter(|e| !e.is_expired())
            .and_then(|e| e.expires_at);
        entries.insert(
            key.to_string(),
            Entry {
                value: next.to_string(),
                expires_at,
            },
        );
        Ok(next)
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(entry) = entries.get_mut(key) {
            entry.expires_at = Some(Instant::now() + ttl);
        }
        Ok(())
    }
}

/// Vec-backed stand-in for the SQL user repository, usable for tests
/// and credential-seeded dev mode.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: Mutex<Vec<User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users(users: Vec<User>) -> Self {
        Self {
            users: Mutex::new(users),
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(users.iter().find(|u| u.username == username).cloned())
    }

    async fn insert(&self, user: User) -> Result<(), StoreError> {
        let mut users = self.users.lock().unwrap_or_else(PoisonError::into_inner);
        if users
            .iter()
            .any(|u| u.username == user.username || u.email == user.email)
        {
            return Err(StoreError::Conflict(format!(
                "user {} already exists",
                user.username
            )));
        }
        users.push(user);
        Ok(())
    }

    async fn touch_last_login(&self, id: Uuid, when: DateTime<Utc>) -> Result<(), StoreError> {
        let mut users = self.users.lock().unwrap_or_else(PoisonError::into_inner);
        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(StoreError::NotFound)?;
        user.last_login_at = Some(when);
        Ok(())
    }
}

/// Vec-backed world-entity lookup; also serves as the no-op
/// implementation when a caller has no persisted entities.
#[derive(Debug, Default)]
pub struct InMemoryWorldEntities {
    entities: Mutex<Vec<WorldEntityRecord>>,
}

impl InMemoryWorldEntities {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entities(entities: Vec<WorldEntityRecord>) -> Self {
        Self {
            entities: Mutex::new(entities),
        }
    }
}

#[async_trait]
impl WorldEntityRepository for InMemoryWorldEntities {
    async fn find_by_name(
        &self,
        world_id: Uuid,
        name: &str,
    ) -> Result<Option<WorldEntityRecord>, StoreError> {
        let entities = self.entities.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entities
            .iter()
            .find(|e| e.world_id == world_id && e.name.eq_ignore_ascii_case(name))
            .cloned())
    }
}

/// Vec-backed character directory; doubles as the no-op default.
#[derive(Debug, Default)]
pub struct InMemoryCharacterDirectory {
    characters: Mutex<Vec<Character>>,
}

impl InMemoryCharacterDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_characters(characters: Vec<Character>) -> Self {
        Self {
            characters: Mutex::new(characters),
        }
    }
}

#[async_trait]
impl CharacterDirectory for InMemoryCharacterDirectory {
    async fn characters_in_world(&self, world_id: Uuid) -> Result<Vec<Character>, StoreError> {
        let characters = self.characters.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(characters
            .iter()
            .filter(|c| c.world_id == world_id)
            .cloned()
            .collect())
    }
}
