// src/miner/nonce.rs
//! Nonce layout
//!
//! A nonce is 64 lower-case hex characters. The leading
//! `NONCE_LEN - COUNTER_WIDTH` characters are a prefix chosen by the node and
//! fixed for one template; the trailing `COUNTER_WIDTH` characters are a
//! zero-padded hex counter the miner increments.

use crate::utils::error::MinerError;

/// Total nonce length in hex characters
pub const NONCE_LEN: usize = 64;

/// Width of the counter suffix in hex characters
pub const COUNTER_WIDTH: usize = 15;

/// Width of the fixed prefix in hex characters
pub const PREFIX_LEN: usize = NONCE_LEN - COUNTER_WIDTH;

/// Largest counter value that still fits in `COUNTER_WIDTH` hex digits
pub const COUNTER_MAX: u64 = (1 << (4 * COUNTER_WIDTH)) - 1;

/// Splits a nonce into its fixed prefix and starting counter value
///
/// # Errors
/// Returns `MinerError::DecodeError` unless the nonce is exactly
/// `NONCE_LEN` lower-case hex characters.
pub fn split(nonce: &str) -> Result<(&str, u64), MinerError> {
    if nonce.len() != NONCE_LEN {
        return Err(MinerError::DecodeError(format!(
            "Nonce must be {} hex characters, got {}",
            NONCE_LEN,
            nonce.len()
        )));
    }
    if !nonce.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')) {
        return Err(MinerError::DecodeError(format!(
            "Nonce is not lower-case hex: {}",
            nonce
        )));
    }

    let (prefix, suffix) = nonce.split_at(PREFIX_LEN);
    Ok((prefix, decode_counter(suffix)?))
}

/// Encodes a counter as `COUNTER_WIDTH` zero-padded lower-case hex digits
///
/// # Errors
/// Returns `MinerError::CounterExhausted` if the value does not fit; the
/// counter never wraps or truncates.
pub fn encode_counter(counter: u64, prefix: &str) -> Result<[u8; COUNTER_WIDTH], MinerError> {
    if counter > COUNTER_MAX {
        return Err(MinerError::CounterExhausted {
            prefix: prefix.to_string(),
        });
    }

    let mut full = [0u8; 16];
    hex::encode_to_slice(counter.to_be_bytes(), &mut full)?;
    let mut digits = [0u8; COUNTER_WIDTH];
    // counter <= COUNTER_MAX, so the dropped leading digit is always '0'
    digits.copy_from_slice(&full[16 - COUNTER_WIDTH..]);
    Ok(digits)
}

/// Parses a `COUNTER_WIDTH`-digit hex counter suffix
pub fn decode_counter(digits: &str) -> Result<u64, MinerError> {
    if digits.len() != COUNTER_WIDTH {
        return Err(MinerError::DecodeError(format!(
            "Counter must be {} hex digits, got {}",
            COUNTER_WIDTH,
            digits.len()
        )));
    }
    u64::from_str_radix(digits, 16)
        .map_err(|e| MinerError::DecodeError(format!("Invalid counter '{}': {}", digits, e)))
}

/// Joins a prefix and a counter into a full nonce string
pub fn compose(prefix: &str, counter: u64) -> Result<String, MinerError> {
    let digits = encode_counter(counter, prefix)?;
    let mut nonce = String::with_capacity(NONCE_LEN);
    nonce.push_str(prefix);
    // hex output is always ASCII
    nonce.extend(digits.iter().map(|&b| b as char));
    Ok(nonce)
}
