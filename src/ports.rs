//! Ports to external infrastructure.
//!
//! The SQL layer, the key-value store and the bus daemon are external
//! collaborators; the server touches them only through these traits.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;
use telluria_data::{Character, User};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("not found")]
    NotFound,
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

/// User lookup and registration, backed by SQL in production.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    /// Fails with [`StoreError::Conflict`] when the username or email
    /// is already taken.
    async fn insert(&self, user: User) -> Result<(), StoreError>;

    async fn touch_last_login(&self, id: Uuid, when: DateTime<Utc>) -> Result<(), StoreError>;
}

/// Minimal key-value surface: enough for sessions and rate limiting.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError>;

    async fn delete(&self, key: &str) -> Result<(), StoreError>;

    /// Atomic increment; a missing key starts from zero.
    async fn incr(&self, key: &str) -> Result<i64, StoreError>;

    async fn expire(&self, key: &str, ttl: Duration) -> Result<(), StoreError>;
}

/// A named, DB-persisted object placed in a world (statues, signs,
/// fixtures) that the look service can resolve by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorldEntityRecord {
    pub id: Uuid,
    pub world_id: Uuid,
    pub name: String,
    pub description: String,
}

#[async_trait]
pub trait WorldEntityRepository: Send + Sync {
    async fn find_by_name(
        &self,
        world_id: Uuid,
        name: &str,
    ) -> Result<Option<WorldEntityRecord>, StoreError>;
}

/// Directory of player characters, backed by SQL in production.
#[async_trait]
pub trait CharacterDirectory: Send + Sync {
    async fn characters_in_world(&self, world_id: Uuid) -> Result<Vec<Character>, StoreError>;
}
