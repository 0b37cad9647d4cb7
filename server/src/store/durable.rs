use std::time::Duration;

use pizzeria_types::Player;
use redis::AsyncCommands;
use tokio::sync::Mutex;

/// Why a single durable call could not be served. Never surfaced to clients;
/// the caller recovers by switching to the in-process fallback for that call.
#[derive(Debug, thiserror::Error)]
pub enum DurableError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),
    #[error("stored record is not valid JSON: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error("durable backend timed out after {0:?}")]
    Timeout(Duration),
}

/// Durable player backend: a remote Redis keyed by `"<prefix><user_id>"`
/// holding JSON-serialized records.
///
/// The connection manager is created lazily on first use and dropped on any
/// command failure so the next call reconnects from scratch. Every network
/// round trip is bounded by `timeout`.
pub struct RedisStore {
    client: redis::Client,
    connection: Mutex<Option<redis::aio::ConnectionManager>>,
    prefix: String,
    timeout: Duration,
}

impl RedisStore {
    pub fn new(url: &str, prefix: String, timeout: Duration) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(url)?;
        Ok(Self {
            client,
            connection: Mutex::new(None),
            prefix,
            timeout,
        })
    }

    fn key(&self, user_id: &str) -> String {
        format!("{}{}", self.prefix, user_id)
    }

    async fn ensure_connection(
        &self,
    ) -> Result<tokio::sync::MutexGuard<'_, Option<redis::aio::ConnectionManager>>, DurableError>
    {
        let mut guard = self.connection.lock().await;
        if guard.is_none() {
            let connect = self.client.get_connection_manager();
            let manager = tokio::time::timeout(self.timeout, connect)
                .await
                .map_err(|_| DurableError::Timeout(self.timeout))??;
            *guard = Some(manager);
        }
        Ok(guard)
    }

    /// Select-by-key. `Ok(None)` means the durable backend is reachable and
    /// has no record for this id.
    pub async fn get(&self, user_id: &str) -> Result<Option<Player>, DurableError> {
        let mut guard = self.ensure_connection().await?;
        let conn = guard.as_mut().expect("connection established above");
        let fetch = conn.get::<_, Option<String>>(self.key(user_id));
        let raw = match tokio::time::timeout(self.timeout, fetch).await {
            Ok(Ok(raw)) => raw,
            Ok(Err(err)) => {
                *guard = None;
                return Err(err.into());
            }
            Err(_) => {
                *guard = None;
                return Err(DurableError::Timeout(self.timeout));
            }
        };
        match raw {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Insert or update-by-key (the datastore contract does not distinguish).
    pub async fn put(&self, player: &Player) -> Result<(), DurableError> {
        let raw = serde_json::to_string(player)?;
        let mut guard = self.ensure_connection().await?;
        let conn = guard.as_mut().expect("connection established above");
        let write = conn.set::<_, _, ()>(self.key(&player.user_id), raw);
        match tokio::time::timeout(self.timeout, write).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => {
                *guard = None;
                Err(err.into())
            }
            Err(_) => {
                *guard = None;
                Err(DurableError::Timeout(self.timeout))
            }
        }
    }
}
