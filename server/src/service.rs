use std::sync::Arc;

use pizzeria_types::{apply_reward, Player, Reward};
use tokio::sync::Mutex;

use crate::config::PizzeriaConfig;
use crate::metrics::{HttpMetrics, HttpMetricsSnapshot, StoreMetrics, StoreMetricsSnapshot};
use crate::store::{PlayerStore, StoreError};

/// Application state: owns the player store and metrics, constructed once at
/// startup and handed to every handler behind an `Arc`.
pub struct Pizzeria {
    pub config: PizzeriaConfig,
    store: PlayerStore,
    http_metrics: HttpMetrics,
    store_metrics: Arc<StoreMetrics>,
    // Serializes reward read-modify-write cycles so concurrent finishes for
    // the same player cannot lose updates.
    reward_lock: Mutex<()>,
}

impl Pizzeria {
    pub fn new(config: PizzeriaConfig) -> Result<Self, redis::RedisError> {
        let store_metrics = Arc::new(StoreMetrics::default());
        let store = PlayerStore::new(
            config.redis_url.as_deref(),
            config.redis_prefix.clone(),
            config.durable_timeout,
            store_metrics.clone(),
        )?;
        Ok(Self {
            config,
            store,
            http_metrics: HttpMetrics::default(),
            store_metrics,
            reward_lock: Mutex::new(()),
        })
    }

    /// Returns the existing record for `user_id` or creates one with the
    /// starting values (balance 100, xp 0, level 1). Idempotent.
    pub async fn get_or_create_player(
        &self,
        user_id: String,
        username: String,
        email: Option<String>,
    ) -> Player {
        let candidate = Player::new(user_id, username, email);
        let (player, created) = self.store.get_or_create(candidate).await;
        if created {
            tracing::info!(user_id = %player.user_id, "player created");
        }
        player
    }

    /// Applies a session reward to the player and persists the result.
    /// Returns the updated record and whether a level-up happened.
    pub async fn finish_game(
        &self,
        user_id: &str,
        reward: Reward,
    ) -> Result<(Player, bool), StoreError> {
        let _guard = self.reward_lock.lock().await;

        let player = self.store.get(user_id).await.ok_or(StoreError::NotFound)?;
        let (updated, leveled_up) = apply_reward(&player, &reward);
        let updated = self.store.update(&updated).await?;

        if leveled_up {
            tracing::info!(
                user_id,
                level = updated.level,
                xp = updated.xp,
                "player leveled up"
            );
        }
        Ok((updated, leveled_up))
    }

    pub async fn fetch_player(&self, user_id: &str) -> Option<Player> {
        self.store.get(user_id).await
    }

    pub fn http_metrics(&self) -> &HttpMetrics {
        &self.http_metrics
    }

    pub fn http_metrics_snapshot(&self) -> HttpMetricsSnapshot {
        self.http_metrics.snapshot()
    }

    pub fn store_metrics_snapshot(&self) -> StoreMetricsSnapshot {
        self.store_metrics.snapshot()
    }
}
