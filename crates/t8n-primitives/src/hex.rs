//! Hex renderings and lenient quantity parsing.
//!
//! Two renderings of a quantity are used across the engine:
//! - compact: no leading zeros, `0x0` for zero (`0x4`, `0x5208`)
//! - even: compact, then left-padded to an even digit count (`0x04`, `0x00`)
//!
//! Parsers accept `0x`-prefixed hex (any case, any number of leading zeros,
//! `0x` alone meaning zero) or plain decimal digits.

use crate::U256;
use thiserror::Error;

/// Quantity parsing error
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuantityError {
    /// Not a hex quantity
    #[error("invalid hex quantity: {0}")]
    InvalidHex(String),
    /// Not a decimal quantity
    #[error("invalid decimal quantity: {0}")]
    InvalidDecimal(String),
    /// Does not fit the requested width
    #[error("quantity out of range: {0}")]
    Overflow(String),
}

fn hex_digits(value: U256) -> String {
    if value.is_zero() {
        "0".to_string()
    } else {
        format!("{:x}", value)
    }
}

/// Render a quantity without leading zeros (`0x0` for zero).
pub fn to_compact_hex(value: U256) -> String {
    format!("0x{}", hex_digits(value))
}

/// Render a quantity with an even number of hex digits (`0x00` for zero).
pub fn to_even_hex(value: U256) -> String {
    let digits = hex_digits(value);
    if digits.len() % 2 == 1 {
        format!("0x0{}", digits)
    } else {
        format!("0x{}", digits)
    }
}

/// Even-length rendering of a `u64`.
pub fn u64_to_even_hex(value: u64) -> String {
    to_even_hex(U256::from(value))
}

/// Render raw bytes as `0x`-prefixed lowercase hex (`0x` for empty).
pub fn bytes_to_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Render a quantity as a full 32-byte word (`0x` plus 64 digits).
pub fn to_word_hex(value: U256) -> String {
    let mut word = [0u8; 32];
    value.to_big_endian(&mut word);
    bytes_to_hex(&word)
}

/// Parse a hex (`0x`-prefixed) or decimal quantity.
pub fn parse_u256(s: &str) -> Result<U256, QuantityError> {
    let s = s.trim();
    if let Some(digits) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        if digits.is_empty() {
            return Ok(U256::zero());
        }
        let digits = digits.trim_start_matches('0');
        if digits.is_empty() {
            return Ok(U256::zero());
        }
        if digits.len() > 64 {
            return Err(QuantityError::Overflow(s.to_string()));
        }
        return U256::from_str_radix(digits, 16)
            .map_err(|_| QuantityError::InvalidHex(s.to_string()));
    }
    if s.is_empty() {
        return Ok(U256::zero());
    }
    U256::from_dec_str(s).map_err(|_| QuantityError::InvalidDecimal(s.to_string()))
}

/// Parse a quantity that must fit in 64 bits.
pub fn parse_u64(s: &str) -> Result<u64, QuantityError> {
    let value = parse_u256(s)?;
    if value > U256::from(u64::MAX) {
        return Err(QuantityError::Overflow(s.to_string()));
    }
    Ok(value.as_u64())
}

/// Parse `0x`-prefixed hex bytes. `0x` and the empty string decode to no bytes.
pub fn parse_bytes(s: &str) -> Result<Vec<u8>, QuantityError> {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    hex::decode(digits).map_err(|e| QuantityError::InvalidHex(format!("{}: {}", s, e)))
}

/// Whether `s` is syntactically a 32-byte hash (`0x` plus 64 hex digits).
pub fn is_hash32(s: &str) -> bool {
    match s.strip_prefix("0x") {
        Some(digits) => digits.len() == 64 && digits.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

/// Re-render a hex quantity string in even form (`0x0004` -> `0x04`).
pub fn normalize_even(s: &str) -> Result<String, QuantityError> {
    parse_u256(s).map(to_even_hex)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // ==================== Rendering ====================

    #[test]
    fn test_compact_hex() {
        assert_eq!(to_compact_hex(U256::zero()), "0x0");
        assert_eq!(to_compact_hex(U256::from(4)), "0x4");
        assert_eq!(to_compact_hex(U256::from(0x5208)), "0x5208");
    }

    #[test]
    fn test_even_hex() {
        assert_eq!(to_even_hex(U256::zero()), "0x00");
        assert_eq!(to_even_hex(U256::from(1)), "0x01");
        assert_eq!(to_even_hex(U256::from(0x100)), "0x0100");
        assert_eq!(u64_to_even_hex(10), "0x0a");
    }

    #[test]
    fn test_word_hex() {
        assert_eq!(to_word_hex(U256::from(1)), format!("0x{}1", "0".repeat(63)));
        assert_eq!(to_word_hex(U256::zero()).len(), 66);
    }

    #[test]
    fn test_bytes_to_hex() {
        assert_eq!(bytes_to_hex(&[]), "0x");
        assert_eq!(bytes_to_hex(&[0xAB, 0x01]), "0xab01");
    }

    // ==================== Parsing ====================

    #[test]
    fn test_parse_hex_with_leading_zeros() {
        assert_eq!(parse_u256("0x0004").unwrap(), U256::from(4));
        assert_eq!(parse_u256("0x00").unwrap(), U256::zero());
        assert_eq!(parse_u256("0x").unwrap(), U256::zero());
        assert_eq!(parse_u256("0X2FEFD8").unwrap(), U256::from(0x2fefd8));
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!(
            parse_u256("5000000000000000000").unwrap(),
            U256::from(5_000_000_000_000_000_000u128)
        );
        assert!(matches!(parse_u256("12ab"), Err(QuantityError::InvalidDecimal(_))));
    }

    #[test]
    fn test_parse_u64_overflow() {
        assert_eq!(parse_u64("0xffffffffffffffff").unwrap(), u64::MAX);
        assert!(matches!(
            parse_u64("0x010000000000000000"),
            Err(QuantityError::Overflow(_))
        ));
    }

    #[test]
    fn test_parse_u256_too_wide() {
        let too_wide = format!("0x1{}", "0".repeat(64));
        assert!(matches!(parse_u256(&too_wide), Err(QuantityError::Overflow(_))));
    }

    #[test]
    fn test_parse_bytes() {
        assert_eq!(parse_bytes("0x").unwrap(), Vec::<u8>::new());
        assert_eq!(parse_bytes("0x6001").unwrap(), vec![0x60, 0x01]);
        assert!(parse_bytes("0x601").is_err());
    }

    #[test]
    fn test_is_hash32() {
        assert!(is_hash32(
            "0x56e81f171bcc55a6ff8345e692c0f86e5b48e01b996cadc001622fb5e363b421"
        ));
        assert!(!is_hash32(
            "56e81f171bcc55a6ff8345e692c0f86e5b48e01b996cadc001622fb5e363b421"
        ));
        assert!(!is_hash32("0x56e81f"));
        assert!(!is_hash32(
            "0xzze81f171bcc55a6ff8345e692c0f86e5b48e01b996cadc001622fb5e363b421"
        ));
    }

    #[test]
    fn test_normalize_even() {
        assert_eq!(normalize_even("0x0004").unwrap(), "0x04");
        assert_eq!(normalize_even("0x123").unwrap(), "0x0123");
        assert_eq!(normalize_even("0x").unwrap(), "0x00");
    }

    proptest! {
        #[test]
        fn prop_even_hex_has_even_digits(v in any::<u64>()) {
            let s = u64_to_even_hex(v);
            prop_assert!(s.starts_with("0x"));
            prop_assert_eq!((s.len() - 2) % 2, 0);
            prop_assert_eq!(parse_u64(&s).unwrap(), v);
        }

        #[test]
        fn prop_compact_hex_has_no_leading_zero(v in 1u64..) {
            let s = to_compact_hex(U256::from(v));
            prop_assert!(!s.starts_with("0x0"));
            prop_assert_eq!(parse_u64(&s).unwrap(), v);
        }
    }
}
