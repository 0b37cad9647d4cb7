mod player;
pub use player::{Player, PlayerInvariantError, STARTING_BALANCE, STARTING_LEVEL, XP_PER_LEVEL};

mod progression;
pub use progression::{apply_reward, xp_to_next_level, Reward};
