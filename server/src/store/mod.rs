use std::sync::Arc;
use std::time::Duration;

use pizzeria_types::Player;

mod durable;
mod memory;

pub use durable::{DurableError, RedisStore};
pub use memory::MemoryStore;

use crate::metrics::StoreMetrics;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("player not found")]
    NotFound,
}

/// Two-tier player persistence: a durable remote backend (Redis) fronting an
/// in-process map.
///
/// Every operation attempts the durable backend first and falls back to the
/// memory map only when that single call fails (connection error, command
/// error, corrupt record, timeout). The fallback is per call, never a sticky
/// mode switch, so a durable backend that recovers is used again on the next
/// request. The selected backend is visible only in logs and metrics.
///
/// Accepted limitation: a record created via fallback is invisible to the
/// durable backend and vice versa, so intermittent durable availability can
/// split a player's data across backends.
pub struct PlayerStore {
    durable: Option<RedisStore>,
    fallback: MemoryStore,
    metrics: Arc<StoreMetrics>,
}

impl PlayerStore {
    /// `redis_url: None` disables the durable tier entirely (every call is
    /// served by the memory map).
    pub fn new(
        redis_url: Option<&str>,
        prefix: String,
        timeout: Duration,
        metrics: Arc<StoreMetrics>,
    ) -> Result<Self, redis::RedisError> {
        let durable = match redis_url {
            Some(url) => Some(RedisStore::new(url, prefix, timeout)?),
            None => None,
        };
        Ok(Self {
            durable,
            fallback: MemoryStore::default(),
            metrics,
        })
    }

    fn note_durable_failure(&self, op: &'static str, err: &DurableError) {
        self.metrics.inc_durable_errors();
        tracing::warn!(op, error = %err, "durable backend unavailable, using in-memory fallback");
    }

    /// `None` when neither the selected backend has a record for the id.
    /// A reachable durable backend is authoritative: a miss there does not
    /// consult the fallback map.
    pub async fn get(&self, user_id: &str) -> Option<Player> {
        if let Some(durable) = &self.durable {
            match durable.get(user_id).await {
                Ok(found) => return found,
                Err(err) => self.note_durable_failure("get", &err),
            }
        }
        self.metrics.inc_fallback_reads();
        self.fallback.get(user_id).await
    }

    /// Idempotent create: returns the existing record unchanged when one is
    /// present, otherwise persists the candidate. The boolean is true when a
    /// creation happened.
    pub async fn get_or_create(&self, candidate: Player) -> (Player, bool) {
        if let Some(durable) = &self.durable {
            match durable.get(&candidate.user_id).await {
                Ok(Some(existing)) => return (existing, false),
                Ok(None) => match durable.put(&candidate).await {
                    Ok(()) => return (candidate, true),
                    Err(err) => self.note_durable_failure("create", &err),
                },
                Err(err) => self.note_durable_failure("create", &err),
            }
        }
        self.metrics.inc_fallback_writes();
        self.fallback.get_or_insert(candidate).await
    }

    /// Replaces an existing record, failing with `NotFound` when the selected
    /// backend has no record for the id.
    pub async fn update(&self, player: &Player) -> Result<Player, StoreError> {
        if let Some(durable) = &self.durable {
            match durable.get(&player.user_id).await {
                Ok(Some(_)) => match durable.put(player).await {
                    Ok(()) => return Ok(player.clone()),
                    Err(err) => self.note_durable_failure("update", &err),
                },
                Ok(None) => return Err(StoreError::NotFound),
                Err(err) => self.note_durable_failure("update", &err),
            }
        }
        self.metrics.inc_fallback_writes();
        if self.fallback.update(player).await {
            Ok(player.clone())
        } else {
            Err(StoreError::NotFound)
        }
    }

    #[cfg(test)]
    pub(crate) async fn fallback_len(&self) -> usize {
        self.fallback.len().await
    }
}
