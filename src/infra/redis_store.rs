//! Redis adapter for the key-value port.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use crate::ports::{KeyValueStore, StoreError};

pub struct RedisStore {
    connection: ConnectionManager,
}

fn unavailable(e: redis::RedisError) -> StoreError {
    StoreError::Unavailable(e.to_string())
}

impl RedisStore {
    /// Connects to `addr` (host:port) with automatic reconnection.
    pub async fn connect(addr: &str) -> Result<Self, StoreError> {
        let client = redis::Client::open(format!("redis://{addr}")).map_err(unavailable)?;
        let connection = client
            .get_connection_manager()
            .await
            .map_err(unavailable)?;
        tracing::info!(addr, "connected to key-value store");
        Ok(Self { connection })
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut connection = self.connection.clone();
        connection.get(key).await.map_err(unavailable)
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError> {
        let mut connection = self.connection.clone();
        connection
            .set_ex(key, value, ttl.as_secs().max(1))
            .await
            .map_err(unavailable)
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut connection = self.connection.clone();
        connection.del(key).await.map_err(unavailable)
    }

    async fn incr(&self, key: &str) -> Result<i64, StoreError> {
        let mut connection = self.connection.clone();
        connection.incr(key, 1).await.map_err(unavailable)
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<(), StoreError> {
        let mut connection = self.connection.clone();
        connection
            .expire(key, ttl.as_secs().max(1) as i64)
            .await
            .map_err(unavailable)
    }
}
