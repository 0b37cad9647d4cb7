use serde::Deserialize;

use crate::player::{Player, XP_PER_LEVEL};

/// The (coins, xp) pair submitted when a game session ends. Absent fields
/// default to 0. Deserializes directly from the game-finish request body,
/// where coins arrive under the legacy name `moedas`.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
pub struct Reward {
    #[serde(default, rename = "moedas")]
    pub coins: i64,
    #[serde(default)]
    pub xp: i64,
}

/// XP required to advance past the given level.
pub fn xp_to_next_level(level: u32) -> i64 {
    i64::from(level) * XP_PER_LEVEL
}

/// Applies a session reward to a snapshot of the player and returns the
/// updated snapshot plus whether the player leveled up.
///
/// Level-ups are resolved with a loop so a single large reward can cross
/// several thresholds in one call. Coins are added without clamping (a
/// negative delta may drive the balance below zero), but both additions
/// saturate at the i64 bounds so an extreme delta cannot panic the service.
/// A negative XP delta that would leave the accumulator below zero is
/// clamped to 0 so the stored record always satisfies `0 <= xp < level * 100`.
pub fn apply_reward(player: &Player, reward: &Reward) -> (Player, bool) {
    let mut updated = player.clone();
    updated.balance = updated.balance.saturating_add(reward.coins);
    updated.xp = updated.xp.saturating_add(reward.xp);

    while updated.xp >= xp_to_next_level(updated.level) {
        updated.xp -= xp_to_next_level(updated.level);
        updated.level += 1;
    }
    if updated.xp < 0 {
        updated.xp = 0;
    }

    let leveled_up = updated.level > player.level;
    (updated, leveled_up)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh_player() -> Player {
        Player::new("u1".into(), "mario".into(), None)
    }

    #[test]
    fn single_threshold_level_up() {
        let (updated, leveled_up) = apply_reward(&fresh_player(), &Reward { coins: 50, xp: 120 });
        assert_eq!(updated.balance, 150);
        assert_eq!(updated.level, 2);
        assert_eq!(updated.xp, 20);
        assert!(leveled_up);
    }

    #[test]
    fn one_reward_can_cross_multiple_thresholds() {
        // 250 XP at level 1: 100 consumed for 1->2, 100 for 2->3, 50 remains.
        // A single-step `if` would stop at level 2 with 150 xp.
        let (updated, leveled_up) = apply_reward(&fresh_player(), &Reward { coins: 0, xp: 250 });
        assert_eq!(updated.level, 3);
        assert_eq!(updated.xp, 50);
        assert!(leveled_up);
    }

    #[test]
    fn exact_threshold_rolls_over_to_zero() {
        let (updated, leveled_up) = apply_reward(&fresh_player(), &Reward { coins: 0, xp: 100 });
        assert_eq!(updated.level, 2);
        assert_eq!(updated.xp, 0);
        assert!(leveled_up);
    }

    #[test]
    fn zero_reward_is_a_noop() {
        let player = fresh_player();
        let (updated, leveled_up) = apply_reward(&player, &Reward::default());
        assert_eq!(updated, player);
        assert!(!leveled_up);
    }

    #[test]
    fn extreme_deltas_saturate_instead_of_overflowing() {
        // Overflow checks are enabled in every profile, so a plain `+` here
        // would abort the request on an i64::MAX delta from the wire.
        let (updated, _) = apply_reward(&fresh_player(), &Reward { coins: i64::MAX, xp: 0 });
        assert_eq!(updated.balance, i64::MAX);

        let mut player = fresh_player();
        player.balance = -150;
        let (updated, leveled_up) = apply_reward(&player, &Reward { coins: i64::MIN, xp: 0 });
        assert_eq!(updated.balance, i64::MIN);
        assert!(!leveled_up);
        assert_eq!(updated.validate_invariants(), Ok(()));
    }

    #[test]
    fn negative_coins_may_drive_balance_below_zero() {
        let (updated, leveled_up) = apply_reward(&fresh_player(), &Reward { coins: -250, xp: 0 });
        assert_eq!(updated.balance, -150);
        assert!(!leveled_up);
    }

    #[test]
    fn negative_xp_is_clamped_at_zero() {
        let mut player = fresh_player();
        player.xp = 30;
        let (updated, leveled_up) = apply_reward(&player, &Reward { coins: 0, xp: -80 });
        assert_eq!(updated.xp, 0);
        assert_eq!(updated.level, 1);
        assert!(!leveled_up);
        assert_eq!(updated.validate_invariants(), Ok(()));
    }

    #[test]
    fn invariant_holds_after_any_application() {
        let mut player = fresh_player();
        for xp in [0, 1, 99, 100, 101, 250, 999, 10_000] {
            let (updated, _) = apply_reward(&player, &Reward { coins: 7, xp });
            assert_eq!(updated.validate_invariants(), Ok(()), "xp delta {xp}");
            player = updated;
        }
    }

    #[test]
    fn level_never_decreases() {
        let mut player = fresh_player();
        (player, _) = apply_reward(&player, &Reward { coins: 0, xp: 350 });
        let before = player.level;
        let (updated, leveled_up) = apply_reward(&player, &Reward { coins: 0, xp: -1_000 });
        assert_eq!(updated.level, before);
        assert!(!leveled_up);
    }

    #[test]
    fn reward_fields_default_to_zero_when_absent() {
        let reward: Reward = serde_json::from_str("{}").unwrap();
        assert_eq!(reward.coins, 0);
        assert_eq!(reward.xp, 0);
    }

    #[test]
    fn reward_reads_coins_from_legacy_field() {
        let reward: Reward = serde_json::from_str(r#"{"moedas": 25, "xp": 10}"#).unwrap();
        assert_eq!(reward.coins, 25);
        assert_eq!(reward.xp, 10);
    }
}
