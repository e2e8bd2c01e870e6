// src/miner/target.rs
//! Proof-of-work target
//!
//! A digest meets the target when it is strictly below it. The target is
//! kept as both its 64-character hex text and its 32 big-endian bytes;
//! comparing the bytes lexicographically is the same as comparing the
//! zero-padded hex strings, and the same as comparing the 256-bit integers.

use crate::utils::error::MinerError;
use hex_literal::hex;
use std::fmt;
use std::str::FromStr;

/// Digest size of the proof-of-work hash, in bytes
pub const DIGEST_LEN: usize = 32;

/// Network target blocks are mined against
pub const DEFAULT_TARGET: [u8; DIGEST_LEN] =
    hex!("00000000abc00000000000000000000000000000000000000000000000000000");

/// Fixed threshold a solution's digest must fall below
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target {
    bytes: [u8; DIGEST_LEN],
}

impl Target {
    /// Wraps raw big-endian threshold bytes
    pub const fn new(bytes: [u8; DIGEST_LEN]) -> Self {
        Self { bytes }
    }

    /// Parses a target from exactly 64 lower-case hex characters
    ///
    /// # Errors
    /// Returns `MinerError::InputError` for any other length or alphabet.
    pub fn from_hex(text: &str) -> Result<Self, MinerError> {
        if text.len() != 2 * DIGEST_LEN {
            return Err(MinerError::InputError(format!(
                "Target must be {} hex characters, got {}",
                2 * DIGEST_LEN,
                text.len()
            )));
        }
        if text.bytes().any(|b| b.is_ascii_uppercase()) {
            return Err(MinerError::InputError(format!(
                "Target must be lower-case hex: {}",
                text
            )));
        }

        let mut bytes = [0u8; DIGEST_LEN];
        hex::decode_to_slice(text, &mut bytes)?;
        Ok(Self { bytes })
    }

    /// Whether `digest` satisfies this target (`digest < target`)
    #[inline]
    pub fn is_met_by(&self, digest: &[u8; DIGEST_LEN]) -> bool {
        digest < &self.bytes
    }

    /// Big-endian threshold bytes
    pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.bytes
    }
}

impl Default for Target {
    fn default() -> Self {
        Self::new(DEFAULT_TARGET)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.bytes))
    }
}

impl FromStr for Target {
    type Err = MinerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

/// Zero-padded lower-case hex of a digest, always 64 characters
pub fn digest_hex(digest: &[u8; DIGEST_LEN]) -> String {
    hex::encode(digest)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn digest_from(text: &str) -> [u8; DIGEST_LEN] {
        let mut out = [0u8; DIGEST_LEN];
        hex::decode_to_slice(text, &mut out).unwrap();
        out
    }

    #[test]
    fn test_default_target_text() {
        assert_eq!(
            Target::default().to_string(),
            "00000000abc00000000000000000000000000000000000000000000000000000"
        );
    }

    #[test]
    fn test_strictly_less_than() {
        let target = Target::default();
        let equal = *target.as_bytes();
        assert!(!target.is_met_by(&equal));

        let mut below = equal;
        below[5] -= 1;
        assert!(target.is_met_by(&below));

        let mut above = equal;
        above[31] = 1;
        assert!(!target.is_met_by(&above));
    }

    #[test]
    fn test_byte_order_agrees_with_hex_string_order() {
        // leading zero bytes are where a non-padded encoding would go wrong
        let samples = [
            "0000000052a0e645eca917ae1c196e0d0a4fb756747f29ef52594d68484bb5e2",
            "00000000abc00000000000000000000000000000000000000000000000000000",
            "00000000abbfffffffffffffffffffffffffffffffffffffffffffffffffffff",
            "000000000000000000000000000000000000000000000000000000000000000f",
            "0f00000000000000000000000000000000000000000000000000000000000000",
            "f000000000000000000000000000000000000000000000000000000000000000",
            "ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff",
        ];
        for a in samples {
            for b in samples {
                let (da, db) = (digest_from(a), digest_from(b));
                assert_eq!(da < db, a < b, "{a} vs {b}");
                assert_eq!(Target::from_hex(b).unwrap().is_met_by(&da), a < b);
                assert_eq!(digest_hex(&da), a);
            }
        }
    }

    #[test]
    fn test_from_hex_rejects_bad_input() {
        assert!(Target::from_hex("00ff").is_err());
        assert!(Target::from_hex(&"G".repeat(64)).is_err());
        assert!(Target::from_hex(&"A".repeat(64)).is_err());
        assert!("0fffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff"
            .parse::<Target>()
            .is_ok());
    }

    #[test]
    fn test_zero_target_is_never_met() {
        let zero = Target::new([0u8; DIGEST_LEN]);
        assert!(!zero.is_met_by(&[0u8; DIGEST_LEN]));
    }
}
