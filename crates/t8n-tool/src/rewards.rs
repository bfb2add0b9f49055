//! Per-fork block rewards passed to the tool as `--state.reward`

use std::collections::BTreeMap;

use t8n_primitives::{hex::parse_u256, U256};

use crate::error::{ToolError, ToolResult};

/// Seal engine under which the tool must apply the block reward
pub const NO_PROOF: &str = "NoProof";

const FIVE_ETH: u128 = 5_000_000_000_000_000_000;
const THREE_ETH: u128 = 3_000_000_000_000_000_000;
const TWO_ETH: u128 = 2_000_000_000_000_000_000;

const DEFAULT_REWARDS: &[(&str, u128)] = &[
    ("Frontier", FIVE_ETH),
    ("Homestead", FIVE_ETH),
    ("EIP150", FIVE_ETH),
    ("EIP158", FIVE_ETH),
    ("Byzantium", THREE_ETH),
    ("Constantinople", TWO_ETH),
    ("ConstantinopleFix", TWO_ETH),
    ("Istanbul", TWO_ETH),
    ("Berlin", TWO_ETH),
    ("London", TWO_ETH),
    ("YOLOv1", TWO_ETH),
    ("Merge", 0),
    ("Paris", 0),
];

/// Fork name to block reward in wei
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RewardTable {
    rewards: BTreeMap<String, U256>,
}

impl Default for RewardTable {
    fn default() -> Self {
        Self {
            rewards: DEFAULT_REWARDS
                .iter()
                .map(|(fork, wei)| (fork.to_string(), U256::from(*wei)))
                .collect(),
        }
    }
}

impl RewardTable {
    /// Default table with `overrides` (fork to hex or decimal wei) applied on top
    pub fn with_overrides(overrides: &BTreeMap<String, String>) -> ToolResult<Self> {
        let mut table = Self::default();
        for (fork, value) in overrides {
            let wei = parse_u256(value).map_err(|_| ToolError::InvalidReward {
                fork: fork.clone(),
                value: value.clone(),
            })?;
            table.rewards.insert(fork.clone(), wei);
        }
        Ok(table)
    }

    /// Reward for `fork`
    pub fn reward(&self, fork: &str) -> ToolResult<U256> {
        self.rewards
            .get(fork)
            .copied()
            .ok_or_else(|| ToolError::UnknownFork(fork.to_string()))
    }

    /// Reward to pass for a regular block, `None` when the seal engine
    /// leaves rewards out of the transition
    pub fn mining_reward(&self, seal_engine: &str, fork: &str) -> ToolResult<Option<U256>> {
        if seal_engine != NO_PROOF {
            return Ok(None);
        }
        self.reward(fork).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rewards() {
        let table = RewardTable::default();
        assert_eq!(table.reward("Frontier").unwrap(), U256::from(FIVE_ETH));
        assert_eq!(table.reward("Byzantium").unwrap(), U256::from(THREE_ETH));
        assert_eq!(table.reward("Istanbul").unwrap(), U256::from(TWO_ETH));
        assert_eq!(table.reward("Paris").unwrap(), U256::zero());
    }

    #[test]
    fn test_unknown_fork() {
        let table = RewardTable::default();
        assert!(matches!(table.reward("Shanghai"), Err(ToolError::UnknownFork(f)) if f == "Shanghai"));
    }

    #[test]
    fn test_seal_engine_gates_reward() {
        let table = RewardTable::default();
        assert_eq!(table.mining_reward("Ethash", "Unknown").unwrap(), None);
        assert_eq!(
            table.mining_reward(NO_PROOF, "Berlin").unwrap(),
            Some(U256::from(TWO_ETH))
        );
        assert!(table.mining_reward(NO_PROOF, "Unknown").is_err());
    }

    #[test]
    fn test_overrides() {
        let mut overrides = BTreeMap::new();
        overrides.insert("Berlin".to_string(), "0x01".to_string());
        overrides.insert("Shanghai".to_string(), "7".to_string());
        let table = RewardTable::with_overrides(&overrides).unwrap();
        assert_eq!(table.reward("Berlin").unwrap(), U256::one());
        assert_eq!(table.reward("Shanghai").unwrap(), U256::from(7));
        assert_eq!(table.reward("Frontier").unwrap(), U256::from(FIVE_ETH));
    }

    #[test]
    fn test_bad_override() {
        let mut overrides = BTreeMap::new();
        overrides.insert("Berlin".to_string(), "lots".to_string());
        assert!(matches!(
            RewardTable::with_overrides(&overrides),
            Err(ToolError::InvalidReward { .. })
        ));
    }
}
