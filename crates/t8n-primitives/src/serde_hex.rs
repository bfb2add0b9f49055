//! Serde adapters for hex quantities and byte strings.
//!
//! Use with `#[serde(with = "t8n_primitives::serde_hex::quantity")]` and friends.
//! Serialization is always compact hex; deserialization accepts hex strings,
//! decimal strings and JSON integers.

use serde::de::{self, Visitor};
use std::fmt;

use crate::hex::{bytes_to_hex, parse_bytes, parse_u256, to_compact_hex};
use crate::U256;

struct QuantityVisitor;

impl<'de> Visitor<'de> for QuantityVisitor {
    type Value = U256;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a hex or decimal quantity")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<U256, E> {
        Ok(U256::from(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<U256, E> {
        parse_u256(v).map_err(E::custom)
    }
}

/// `U256` as compact hex
pub mod quantity {
    use super::{to_compact_hex, QuantityVisitor, U256};
    use serde::{Deserializer, Serializer};

    /// Serialize as compact hex
    pub fn serialize<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&to_compact_hex(*value))
    }

    /// Deserialize from hex, decimal or integer
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
        deserializer.deserialize_any(QuantityVisitor)
    }
}

/// `u64` as compact hex
pub mod quantity_u64 {
    use super::{to_compact_hex, QuantityVisitor, U256};
    use serde::{de::Error as _, Deserializer, Serializer};

    /// Serialize as compact hex
    pub fn serialize<S: Serializer>(value: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&to_compact_hex(U256::from(*value)))
    }

    /// Deserialize from hex, decimal or integer
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        let value = deserializer.deserialize_any(QuantityVisitor)?;
        if value > U256::from(u64::MAX) {
            return Err(D::Error::custom(format!("quantity {} exceeds 64 bits", value)));
        }
        Ok(value.as_u64())
    }
}

/// `U256` as even-length hex, the RPC response rendering
pub mod even {
    use super::{QuantityVisitor, U256};
    use crate::hex::to_even_hex;
    use serde::{Deserializer, Serializer};

    /// Serialize as even-length hex
    pub fn serialize<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&to_even_hex(*value))
    }

    /// Deserialize from hex, decimal or integer
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
        deserializer.deserialize_any(QuantityVisitor)
    }
}

/// `u64` as even-length hex
pub mod even_u64 {
    use crate::hex::u64_to_even_hex;
    use serde::{Deserializer, Serializer};

    /// Serialize as even-length hex
    pub fn serialize<S: Serializer>(value: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&u64_to_even_hex(*value))
    }

    /// Deserialize from hex, decimal or integer
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        super::quantity_u64::deserialize(deserializer)
    }
}

/// Byte strings as `0x`-prefixed hex
pub mod bytes {
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    use super::{bytes_to_hex, parse_bytes};

    /// Serialize as `0x`-prefixed hex
    pub fn serialize<S: Serializer, T: AsRef<[u8]>>(
        value: &T,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&bytes_to_hex(value.as_ref()))
    }

    /// Deserialize from `0x`-prefixed hex
    pub fn deserialize<'de, D: Deserializer<'de>, T: From<Vec<u8>>>(
        deserializer: D,
    ) -> Result<T, D::Error> {
        let s = String::deserialize(deserializer)?;
        parse_bytes(&s).map(T::from).map_err(D::Error::custom)
    }
}
