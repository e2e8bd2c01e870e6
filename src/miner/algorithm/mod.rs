// src/miner/algorithm/mod.rs
//! Proof-of-work hash functions
//!
//! The miner only needs a fixed-size digest of the serialized block; the
//! network uses Blake2s-256.

/// Blake2s-256 implementation
pub mod blake2s;

pub use self::blake2s::Blake2s;

use crate::miner::target::DIGEST_LEN;

/// Common interface for proof-of-work hash functions
///
/// Implementations must be pure: the same input always yields the same
/// digest.
pub trait Algorithm: Send + Sync {
    /// Hash the canonical encoding of a candidate block
    ///
    /// # Arguments
    /// * `input` - Serialized block bytes, nonce included
    ///
    /// # Returns
    /// Big-endian 32-byte digest
    fn digest(&self, input: &[u8]) -> [u8; DIGEST_LEN];

    /// Short name used in logs
    fn name(&self) -> &'static str;
}
