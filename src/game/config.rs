//! Game Configuration
//!
//! Token amounts and the reward strategy a service instance runs with.

use serde::{Deserialize, Serialize};

/// End-of-game payout strategy.
///
/// Two deliberately distinct policies; a room is configured with exactly one
/// and they are never merged.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardPolicy {
    /// Every member receives `base_reward + score / 2`.
    #[default]
    ScoreAccrual,
    /// 60% of the room's pot splits evenly across all members, the
    /// remaining 40% goes to the single top-scoring member.
    PooledSplit,
}

/// Configuration for a service instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Tokens granted to an identity on first registration.
    pub starting_grant: u64,
    /// Default entry fee when a room creator does not name one.
    pub entry_fee: u64,
    /// Flat reward component under [`RewardPolicy::ScoreAccrual`].
    pub base_reward: u64,
    /// Score awarded per round to members who voted with the majority.
    pub win_bonus: u64,
    /// Payout strategy for finished games.
    pub reward_policy: RewardPolicy,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            starting_grant: 100,
            entry_fee: 10,
            base_reward: 50,
            win_bonus: 20,
            reward_policy: RewardPolicy::ScoreAccrual,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GameConfig::default();
        assert_eq!(config.starting_grant, 100);
        assert_eq!(config.entry_fee, 10);
        assert_eq!(config.base_reward, 50);
        assert_eq!(config.win_bonus, 20);
        assert_eq!(config.reward_policy, RewardPolicy::ScoreAccrual);
    }
}
