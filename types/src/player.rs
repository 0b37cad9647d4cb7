use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

/// Coins granted to every freshly created player.
pub const STARTING_BALANCE: i64 = 100;

/// All players enter the game at level 1.
pub const STARTING_LEVEL: u32 = 1;

/// XP required to advance from level `n` to `n + 1` is `n * XP_PER_LEVEL`.
pub const XP_PER_LEVEL: i64 = 100;

#[derive(Debug, ThisError, PartialEq, Eq)]
pub enum PlayerInvariantError {
    #[error("xp out of range (got={got}, max_exclusive={max_exclusive})")]
    XpOutOfRange { got: i64, max_exclusive: i64 },
    #[error("level must be positive")]
    LevelZero,
}

/// The persisted record of one user's game progression.
///
/// Wire shape keeps the legacy field names (`saldo` for balance, `nivel` for
/// level) so existing game clients keep working unchanged.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub user_id: String,
    pub username: String,
    pub email: Option<String>,
    #[serde(rename = "saldo")]
    pub balance: i64,
    pub xp: i64,
    #[serde(rename = "nivel")]
    pub level: u32,
    pub created_at: DateTime<Utc>,
}

impl Player {
    pub fn new(user_id: String, username: String, email: Option<String>) -> Self {
        Self {
            user_id,
            username,
            email,
            balance: STARTING_BALANCE,
            xp: 0,
            level: STARTING_LEVEL,
            created_at: Utc::now(),
        }
    }

    /// Checks the stored-record invariant: `0 <= xp < level * XP_PER_LEVEL`.
    /// Holds for every record written by the progression engine; it does not
    /// hold transiently mid-computation.
    pub fn validate_invariants(&self) -> Result<(), PlayerInvariantError> {
        if self.level == 0 {
            return Err(PlayerInvariantError::LevelZero);
        }
        let max_exclusive = i64::from(self.level) * XP_PER_LEVEL;
        if self.xp < 0 || self.xp >= max_exclusive {
            return Err(PlayerInvariantError::XpOutOfRange {
                got: self.xp,
                max_exclusive,
            });
        }
        Ok(())
    }
}
