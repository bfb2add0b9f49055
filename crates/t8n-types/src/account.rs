//! Post-state allocation: the account map the tool reads and writes

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use t8n_primitives::{serde_hex, Address, U256};

/// Post-state of a block, ordered by address
pub type PostState = BTreeMap<Address, Account>;

/// One account in an allocation file
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Balance in wei
    #[serde(default, with = "serde_hex::quantity")]
    pub balance: U256,
    /// Account nonce
    #[serde(default, with = "serde_hex::quantity_u64")]
    pub nonce: u64,
    /// Contract code
    #[serde(default, with = "serde_hex::bytes", skip_serializing_if = "Vec::is_empty")]
    pub code: Vec<u8>,
    /// Storage slots
    #[serde(default, with = "storage", skip_serializing_if = "BTreeMap::is_empty")]
    pub storage: BTreeMap<U256, U256>,
}

impl Account {
    /// Account holding only a balance
    pub fn with_balance(balance: U256) -> Self {
        Self {
            balance,
            ..Default::default()
        }
    }
}

/// Storage maps keyed and valued by 32-byte hex words
mod storage {
    use std::collections::BTreeMap;

    use serde::{de::Error as _, ser::SerializeMap, Deserialize, Deserializer, Serializer};
    use t8n_primitives::hex::{parse_u256, to_word_hex};
    use t8n_primitives::U256;

    pub fn serialize<S: Serializer>(
        value: &BTreeMap<U256, U256>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(value.len()))?;
        for (k, v) in value {
            map.serialize_entry(&to_word_hex(*k), &to_word_hex(*v))?;
        }
        map.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<U256, U256>, D::Error> {
        let raw = BTreeMap::<String, String>::deserialize(deserializer)?;
        raw.iter()
            .map(|(k, v)| {
                let key = parse_u256(k).map_err(D::Error::custom)?;
                let value = parse_u256(v).map_err(D::Error::custom)?;
                Ok((key, value))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Allocation JSON ====================

    #[test]
    fn test_parse_tool_alloc() {
        let json = r#"{
            "0xa94f5374fce5edbc8e2a8697c15331677e6ebf0b": {
                "balance": "0x0de0b6b3a7640000",
                "nonce": "0x01"
            },
            "0x095e7baea6a6c7c4c2dfeb977efac326af552d87": {
                "balance": "0",
                "code": "0x600160015500",
                "storage": {
                    "0x01": "0x02",
                    "0x0000000000000000000000000000000000000000000000000000000000000003": "0x0004"
                }
            }
        }"#;
        let state: PostState = serde_json::from_str(json).unwrap();
        assert_eq!(state.len(), 2);

        let sender = Address::from_hex("0xa94f5374fce5edbc8e2a8697c15331677e6ebf0b").unwrap();
        assert_eq!(state[&sender].nonce, 1);
        assert_eq!(state[&sender].balance, U256::from(1_000_000_000_000_000_000u64));

        let contract = Address::from_hex("0x095e7baea6a6c7c4c2dfeb977efac326af552d87").unwrap();
        assert_eq!(state[&contract].code, vec![0x60, 0x01, 0x60, 0x01, 0x55, 0x00]);
        assert_eq!(state[&contract].storage[&U256::from(1)], U256::from(2));
        assert_eq!(state[&contract].storage[&U256::from(3)], U256::from(4));
    }

    #[test]
    fn test_addresses_enumerate_in_byte_order() {
        let mut state = PostState::new();
        state.insert(Address::from_bytes([0xcc; 20]), Account::default());
        state.insert(Address::from_bytes([0x0a; 20]), Account::default());
        let first = state.keys().next().unwrap();
        assert_eq!(*first, Address::from_bytes([0x0a; 20]));
    }

    #[test]
    fn test_serialize_skips_empty_code_and_storage() {
        let account = Account::with_balance(U256::from(16));
        let json = serde_json::to_value(&account).unwrap();
        assert_eq!(json["balance"], "0x10");
        assert_eq!(json["nonce"], "0x0");
        assert!(json.get("code").is_none());
        assert!(json.get("storage").is_none());
    }

    #[test]
    fn test_storage_words_are_padded() {
        let mut account = Account::default();
        account.storage.insert(U256::from(1), U256::from(0xff));
        let json = serde_json::to_value(&account).unwrap();
        let key = format!("0x{}1", "0".repeat(63));
        assert_eq!(json["storage"][&key], format!("0x{}ff", "0".repeat(62)));
        let back: Account = serde_json::from_value(json).unwrap();
        assert_eq!(back, account);
    }
}
