//! Session store over the external key-value port.
//!
//! Records live under `session:<id>` with a TTL matching their expiry.
//! `last_access_at` is updated in an in-memory cache on every read and
//! flushed to the store in batches; readers may observe timestamps up
//! to one flush interval stale.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{Duration as ChronoDuration, Utc};
use telluria_data::Session;
use thiserror::Error;
use uuid::Uuid;

use crate::ports::{KeyValueStore, StoreError};

pub const SESSION_TTL: Duration = Duration::from_secs(24 * 60 * 60);

const SESSION_PREFIX: &str = "session:";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session not found")]
    NotFound,
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("session record is malformed: {0}")]
    Malformed(String),
}

#[derive(Debug, Clone)]
struct CachedSession {
    session: Session,
    dirty: bool,
}

pub struct SessionManager {
    store: Arc<dyn KeyValueStore>,
    cache: Mutex<HashMap<Uuid, CachedSession>>,
}

fn key_for(id: Uuid) -> String {
    format!("{SESSION_PREFIX}{id}")
}

impl SessionManager {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Creates and persists a fresh session for a successful login.
    pub async fn create_session(
        &self,
        user_id: Uuid,
        username: &str,
    ) -> Result<Session, SessionError> {
        let now = Utc::now();
        let session = Session {
            id: Uuid::new_v4(),
            user_id,
            username: username.to_string(),
            created_at: now,
            last_access_at: now,
            expires_at: now + ChronoDuration::from_std(SESSION_TTL).unwrap_or_default(),
        };
        let body = serde_json::to_string(&session)
            .map_err(|e| SessionError::Malformed(e.to_string()))?;
        self.store
            .set_ex(&key_for(session.id), &body, SESSION_TTL)
            .await?;

        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        cache.insert(
            session.id,
            CachedSession {
                session: session.clone(),
                dirty: false,
            },
        );
        Ok(session)
    }

    /// Loads the session and touches `last_access_at` in the cache.
    /// The touched timestamp reaches the store on the next flush.
    pub async fn get_session(&self, id: Uuid) -> Result<Session, SessionError> {
        let body = match self.store.get(&key_for(id)).await? {
            Some(body) => body,
            None => {
                let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
                cache.remove(&id);
                return Err(SessionError::NotFound);
            }
        };
        let mut session: Session =
            serde_json::from_str(&body).map_err(|e| SessionError::Malformed(e.to_string()))?;

        let now = Utc::now();
        session.last_access_at = now;
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        cache.insert(
            id,
            CachedSession {
                session: session.clone(),
                dirty: true,
            },
        );
        Ok(session)
    }

    /// Deletes the record; subsequent reads are `NotFound`.
    pub async fn invalidate_session(&self, id: Uuid) -> Result<(), SessionError> {
        self.store.delete(&key_for(id)).await?;
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        cache.remove(&id);
        Ok(())
    }

    /// Writes every dirty cache entry back to the store, preserving
    /// each record's remaining TTL. Returns how many were flushed.
    pub async fn flush(&self) -> Result<usize, SessionError> {
        let dirty: Vec<Session> = {
            let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
            cache
                .values_mut()
                .filter(|c| c.dirty)
                .map(|c| {
                    c.dirty = false;
                    c.session.clone()
                })
                .collect()
        };
        let now = Utc::now();
        let mut flushed = 0;
        for session in dirty {
            let remaining = (session.expires_at - now).to_std().unwrap_or_default();
            if remaining.is_zero() {
                continue;
            }
            let body = serde_json::to_string(&session)
                .map_err(|e| SessionError::Malformed(e.to_string()))?;
            self.store
                .set_ex(&key_for(session.id), &body, remaining)
                .await?;
            flushed += 1;
        }
        if flushed > 0 {
            tracing::debug!(flushed, "session cache flushed");
        }
        Ok(flushed)
    }

    /// Final flush before shutdown.
    pub async fn close(&self) -> Result<(), SessionError> {
        self.flush().await.map(|_| ())
    }
}
