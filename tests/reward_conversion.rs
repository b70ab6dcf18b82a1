//! Property coverage for the whole-token-to-base-units conversion
//! (spec.md glossary: "token base units = whole tokens × 10^18") and the
//! stake-admission gate built on top of it.

use ethers::types::U256;
use proptest::prelude::*;
use runnerd::domain::reward::to_base_units;
use runnerd::services::task_service::stake_covers_reward;

proptest! {
    /// Any non-negative, finite reward converts without error and never
    /// exceeds its own value scaled to 10^18 base units.
    #[test]
    fn non_negative_rewards_always_convert(reward in 0.0f64..1_000_000.0) {
        let units = to_base_units(reward).unwrap();
        let scale = U256::from(10).pow(U256::from(18));
        prop_assert!(units <= U256::from(reward.ceil() as u128 + 1) * scale);
    }

    /// Negative or non-finite rewards are always rejected, regardless of
    /// magnitude.
    #[test]
    fn negative_rewards_always_rejected(reward in -1_000_000.0f64..0.0) {
        prop_assert!(to_base_units(reward).is_err());
    }

    /// A stake that is an exact multiple of the reward always covers it;
    /// halving the reward again still covers it.
    #[test]
    fn stake_equal_to_reward_covers_it(reward in 0.01f64..10_000.0) {
        let needed = to_base_units(reward).unwrap();
        prop_assert!(stake_covers_reward(needed, reward).unwrap());
    }

    /// A stake strictly less than the base units the reward converts to
    /// never covers it.
    #[test]
    fn stake_below_reward_never_covers_it(reward in 1.0f64..10_000.0) {
        let needed = to_base_units(reward).unwrap();
        prop_assert!(!stake_covers_reward(needed - U256::one(), reward).unwrap());
    }
}
