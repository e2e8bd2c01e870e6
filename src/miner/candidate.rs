// src/miner/candidate.rs
//! The block currently being searched
//!
//! The template is serialized once when it is adopted. Each new counter
//! value is then written straight into the counter digits of that buffer,
//! which yields the same bytes a fresh serialization would.

use crate::miner::nonce::{self, COUNTER_WIDTH, PREFIX_LEN};
use crate::types::Block;
use crate::utils::error::MinerError;

const NONCE_KEY: &[u8] = b"\"nonce\":\"";

/// Search state for one adopted template
#[derive(Debug, Clone)]
pub struct Candidate {
    /// The adopted template; its `nonce` field is the adoption-time value
    template: Block,
    /// Fixed nonce prefix, snapshotted from the template
    prefix: String,
    /// Current counter value
    counter: u64,
    /// Canonical encoding with the current nonce spliced in
    encoded: Vec<u8>,
    /// Offset of the counter digits inside `encoded`
    counter_at: usize,
}

impl Candidate {
    /// Adopts a template and positions the counter at its embedded start
    ///
    /// # Errors
    /// - `MinerError::DecodeError` if the template's nonce is malformed
    /// - `MinerError::InputError` if the nonce cannot be located in the encoding
    pub fn new(template: Block) -> Result<Self, MinerError> {
        let (prefix, counter) = nonce::split(&template.nonce)?;
        let prefix = prefix.to_string();
        let encoded = template.encode()?;

        // String values escape their quotes, so the key pattern only
        // matches the real top-level field.
        let key_at = encoded
            .windows(NONCE_KEY.len())
            .position(|w| w == NONCE_KEY)
            .ok_or_else(|| {
                MinerError::InputError("Nonce field missing from block encoding".into())
            })?;
        let counter_at = key_at + NONCE_KEY.len() + PREFIX_LEN;

        Ok(Candidate {
            template,
            prefix,
            counter,
            encoded,
            counter_at,
        })
    }

    /// Bytes to hash (and to submit) for the current counter
    pub fn bytes(&self) -> &[u8] {
        &self.encoded
    }

    /// Current counter value
    pub fn counter(&self) -> u64 {
        self.counter
    }

    /// Fixed nonce prefix of this template
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Full nonce for the current counter
    pub fn nonce(&self) -> &str {
        let start = self.counter_at - PREFIX_LEN;
        // only ASCII hex digits are ever written into this range
        std::str::from_utf8(&self.encoded[start..self.counter_at + COUNTER_WIDTH])
            .unwrap_or_default()
    }

    /// The template as adopted, before any counter change
    pub fn template(&self) -> &Block {
        &self.template
    }

    /// Moves to the next counter value
    ///
    /// # Errors
    /// Returns `MinerError::CounterExhausted` once the counter would leave
    /// its `COUNTER_WIDTH`-digit range; the candidate is left unchanged.
    pub fn advance(&mut self) -> Result<(), MinerError> {
        let next = self.counter.checked_add(1).unwrap_or(u64::MAX);
        self.set_counter(next)
    }

    /// Jumps to an arbitrary counter value
    pub fn set_counter(&mut self, counter: u64) -> Result<(), MinerError> {
        let digits = nonce::encode_counter(counter, &self.prefix)?;
        self.encoded[self.counter_at..self.counter_at + COUNTER_WIDTH].copy_from_slice(&digits);
        self.counter = counter;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::miner::nonce::COUNTER_MAX;

    fn template_with_nonce(nonce: &str) -> Block {
        Block {
            nonce: nonce.to_string(),
            note: Some(r#"tricky "nonce":"ffff" note"#.into()),
            studentids: Some(vec!["a".into()]),
            ..Block::genesis()
        }
    }

    #[test]
    fn test_adoption_uses_embedded_counter() {
        let candidate = Candidate::new(Block::genesis()).unwrap();
        assert_eq!(candidate.counter(), 0x21bea03ed);
        assert_eq!(candidate.prefix(), "0".repeat(PREFIX_LEN));
        assert_eq!(candidate.nonce(), Block::genesis().nonce);
        assert_eq!(candidate.bytes(), Block::genesis().encode().unwrap());
    }

    #[test]
    fn test_splice_matches_fresh_encoding() {
        let prefix = format!("abc{}", "0".repeat(PREFIX_LEN - 3));
        let start = format!("{}{}", prefix, "0".repeat(COUNTER_WIDTH));
        let mut candidate = Candidate::new(template_with_nonce(&start)).unwrap();

        for _ in 0..300 {
            candidate.advance().unwrap();
            let mut expected = candidate.template().clone();
            expected.nonce = nonce::compose(&prefix, candidate.counter()).unwrap();
            assert_eq!(candidate.bytes(), expected.encode().unwrap());
            assert_eq!(candidate.nonce(), expected.nonce);
        }
        assert_eq!(candidate.counter(), 300);
    }

    #[test]
    fn test_prefix_never_changes() {
        let prefix = "1234567890abcdef1234567890abcdef1234567890abcdef1";
        let start = format!("{}{}", prefix, "00000000000fff0");
        let mut candidate = Candidate::new(template_with_nonce(&start)).unwrap();
        for _ in 0..64 {
            candidate.advance().unwrap();
            assert!(candidate.nonce().starts_with(prefix));
        }
        assert!(candidate.nonce().ends_with("000000000010030"));
    }

    #[test]
    fn test_advance_past_max_is_exhausted() {
        let start = format!("{}{}", "0".repeat(PREFIX_LEN), "ffffffffffffffe");
        let mut candidate = Candidate::new(template_with_nonce(&start)).unwrap();
        candidate.advance().unwrap();
        assert_eq!(candidate.counter(), COUNTER_MAX);

        let before = candidate.bytes().to_vec();
        assert!(matches!(
            candidate.advance(),
            Err(MinerError::CounterExhausted { .. })
        ));
        assert_eq!(candidate.counter(), COUNTER_MAX);
        assert_eq!(candidate.bytes(), before.as_slice());
    }
}
