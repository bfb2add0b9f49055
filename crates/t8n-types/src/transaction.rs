//! Legacy signed transactions

use serde::{Deserialize, Serialize};
use t8n_crypto::{keccak256, recover_address, Signature};
use t8n_primitives::{serde_hex, Address, H256, U256};
use t8n_rlp::{Decodable, DecoderError, Encodable, Rlp, RlpStream};

/// Number of RLP items in a signed legacy transaction
const TX_FIELDS: usize = 9;

/// Signed legacy transaction.
///
/// JSON uses the test-filler field names (`data`, `gasLimit`); an empty or
/// `0x` `to` means contract creation and absent signature fields are zero.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Sender nonce
    #[serde(with = "serde_hex::quantity")]
    pub nonce: U256,
    /// Gas price in wei
    #[serde(with = "serde_hex::quantity")]
    pub gas_price: U256,
    /// Gas limit
    #[serde(with = "serde_hex::quantity")]
    pub gas_limit: U256,
    /// Recipient, `None` for contract creation
    #[serde(default, with = "opt_address")]
    pub to: Option<Address>,
    /// Value in wei
    #[serde(default, with = "serde_hex::quantity")]
    pub value: U256,
    /// Call data or init code
    #[serde(default, with = "serde_hex::bytes")]
    pub data: Vec<u8>,
    /// Signature v
    #[serde(default, with = "serde_hex::quantity")]
    pub v: U256,
    /// Signature r
    #[serde(default, with = "serde_hex::quantity")]
    pub r: U256,
    /// Signature s
    #[serde(default, with = "serde_hex::quantity")]
    pub s: U256,
}

impl Transaction {
    /// keccak256 of the RLP-encoded signed transaction
    pub fn hash(&self) -> H256 {
        keccak256(&t8n_rlp::encode(self))
    }

    /// Chain id folded into `v` by EIP-155, if any
    pub fn chain_id(&self) -> Option<u64> {
        if self.v >= U256::from(35) && self.v <= U256::from(u64::MAX) {
            Some((self.v.as_u64() - 35) / 2)
        } else {
            None
        }
    }

    /// Hash the sender signed
    pub fn signing_hash(&self) -> H256 {
        let chain_id = self.chain_id();
        let mut s = RlpStream::new_list(if chain_id.is_some() { 9 } else { 6 });
        self.append_unsigned(&mut s);
        if let Some(id) = chain_id {
            s.append(&id);
            s.append(&0u8);
            s.append(&0u8);
        }
        keccak256(&s.out())
    }

    /// Recover the sender. Unsigned or unrecoverable transactions report the zero address.
    pub fn sender(&self) -> Address {
        let parity = if self.v == U256::from(27) || self.v == U256::from(28) {
            self.v.low_u64() - 27
        } else if let Some(id) = self.chain_id() {
            self.v.as_u64() - 35 - id * 2
        } else {
            return Address::ZERO;
        };

        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        self.r.to_big_endian(&mut r);
        self.s.to_big_endian(&mut s);

        recover_address(&self.signing_hash(), &Signature::new(r, s, parity as u8))
            .unwrap_or(Address::ZERO)
    }

    fn append_unsigned(&self, s: &mut RlpStream) {
        s.append(&self.nonce);
        s.append(&self.gas_price);
        s.append(&self.gas_limit);
        match &self.to {
            Some(to) => s.append(to),
            None => s.append_empty_data(),
        };
        s.append(&self.value);
        s.append(&self.data);
    }
}

impl Encodable for Transaction {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(TX_FIELDS);
        self.append_unsigned(s);
        s.append(&self.v);
        s.append(&self.r);
        s.append(&self.s);
    }
}

impl Decodable for Transaction {
    fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
        if rlp.item_count()? != TX_FIELDS {
            return Err(DecoderError::RlpIncorrectListLen);
        }
        let to_rlp = rlp.at(3)?;
        let to = if to_rlp.is_empty() {
            None
        } else {
            Some(to_rlp.as_val()?)
        };
        Ok(Transaction {
            nonce: rlp.val_at(0)?,
            gas_price: rlp.val_at(1)?,
            gas_limit: rlp.val_at(2)?,
            to,
            value: rlp.val_at(4)?,
            data: rlp.val_at(5)?,
            v: rlp.val_at(6)?,
            r: rlp.val_at(7)?,
            s: rlp.val_at(8)?,
        })
    }
}

/// `Option<Address>` where `""` and `"0x"` mean `None`
pub(crate) mod opt_address {
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};
    use t8n_primitives::Address;

    pub fn serialize<S: Serializer>(
        value: &Option<Address>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(addr) => serializer.serialize_str(&addr.to_hex()),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Address>, D::Error> {
        let s: Option<String> = Option::deserialize(deserializer)?;
        match s.as_deref() {
            None | Some("") | Some("0x") => Ok(None),
            Some(s) => Address::from_hex(s).map(Some).map_err(D::Error::custom),
        }
    }
}
