use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::data::entity::Position;

/// A registered account. Created on registration, never destroyed.
/// `password_hash` holds the PHC-encoded Argon2id string verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

/// A live login session, mirrored into the key-value store under
/// `session:<id>` with a TTL matching `expires_at`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub user_id: Uuid,
    pub username: String,
    pub created_at: DateTime<Utc>,
    pub last_access_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Player,
    Builder,
    Admin,
}

/// A player's presence in one world. Unique per `(user_id, world_id)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Character {
    pub id: Uuid,
    pub user_id: Uuid,
    pub world_id: Uuid,
    pub name: String,
    pub role: Role,
    /// Opaque JSON blob; parsed by the presentation layer only.
    pub appearance: String,
    pub description: Option<String>,
    pub occupation: Option<String>,
    pub position: Position,
    pub is_flying: bool,
    pub last_world_visited: Option<Uuid>,
}
