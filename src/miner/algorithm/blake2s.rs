// src/miner/algorithm/blake2s.rs
//! Blake2s-256 proof-of-work hash
//!
//! Block ids on the network are the unkeyed Blake2s-256 digest of the
//! block's canonical JSON encoding.

use crate::miner::algorithm::Algorithm;
use crate::miner::target::DIGEST_LEN;
use blake2::{Blake2s256, Digest};

/// Unkeyed Blake2s with a 256-bit output
#[derive(Debug, Clone, Copy, Default)]
pub struct Blake2s;

impl Blake2s {
    /// Creates the hasher. It is stateless; every call starts fresh.
    pub fn new() -> Self {
        Self
    }
}

impl Algorithm for Blake2s {
    fn digest(&self, input: &[u8]) -> [u8; DIGEST_LEN] {
        Blake2s256::digest(input).into()
    }

    fn name(&self) -> &'static str {
        "blake2s-256"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::miner::target::{Target, digest_hex};
    use crate::types::Block;
    use hex_literal::hex;

    #[test]
    fn test_empty_input_vector() {
        // RFC 7693 Blake2s-256 of the empty string
        assert_eq!(
            Blake2s::new().digest(b""),
            hex!("69217a3079908094e11121d042354a7c1f55b6482ca1a51e1b250dfd1ed0eef9")
        );
    }

    #[test]
    fn test_genesis_block_id() {
        let encoded = Block::genesis().encode().unwrap();
        let digest = Blake2s::new().digest(&encoded);
        assert_eq!(
            digest_hex(&digest),
            "0000000052a0e645eca917ae1c196e0d0a4fb756747f29ef52594d68484bb5e2"
        );
        assert!(Target::default().is_met_by(&digest));
    }

    #[test]
    fn test_digest_is_deterministic() {
        let algo = Blake2s::new();
        let input = Block::genesis().encode().unwrap();
        assert_eq!(algo.digest(&input), algo.digest(&input));
        assert_ne!(algo.digest(&input), algo.digest(b"other"));
    }
}
