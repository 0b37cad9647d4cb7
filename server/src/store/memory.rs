use std::collections::HashMap;

use pizzeria_types::Player;
use tokio::sync::Mutex;

/// In-process fallback backend: a map from `user_id` to the player record,
/// empty at startup and lost on restart. A single store-wide lock keeps each
/// mutation atomic across concurrent requests.
#[derive(Default)]
pub struct MemoryStore {
    players: Mutex<HashMap<String, Player>>,
}

impl MemoryStore {
    pub async fn get(&self, user_id: &str) -> Option<Player> {
        self.players.lock().await.get(user_id).cloned()
    }

    /// Returns the existing record untouched, or inserts the candidate.
    /// The boolean is true when an insert happened.
    pub async fn get_or_insert(&self, candidate: Player) -> (Player, bool) {
        let mut players = self.players.lock().await;
        match players.get(&candidate.user_id) {
            Some(existing) => (existing.clone(), false),
            None => {
                players.insert(candidate.user_id.clone(), candidate.clone());
                (candidate, true)
            }
        }
    }

    /// Replaces an existing record. Returns false when no record exists for
    /// the id (the caller maps this to not-found).
    pub async fn update(&self, player: &Player) -> bool {
        let mut players = self.players.lock().await;
        match players.get_mut(&player.user_id) {
            Some(slot) => {
                *slot = player.clone();
                true
            }
            None => false,
        }
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.players.lock().await.len()
    }
}
