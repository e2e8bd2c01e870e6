// src/network/framing.rs
//! Newline-delimited message reassembly
//!
//! A single socket read may carry several templates, or only part of one.
//! The [`Framer`] stitches reads together and hands back only the freshest
//! complete message; older ones in the same batch are stale by definition.

use crate::utils::error::MinerError;

/// Upper bound on an unterminated message
pub const MAX_PENDING: usize = 1024 * 1024;

/// Buffers partial messages between reads
#[derive(Debug, Default)]
pub struct Framer {
    pending: Vec<u8>,
}

impl Framer {
    /// Creates an empty framer
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one read's worth of bytes
    ///
    /// # Returns
    /// The last complete message made available by this read, if any. Empty
    /// and whitespace-only lines are skipped. An unterminated tail is kept
    /// for the next read unless it already parses as a whole JSON value,
    /// since some nodes send templates without a trailing newline.
    ///
    /// # Errors
    /// Returns `MinerError::DecodeError` if the unterminated tail grows past
    /// [`MAX_PENDING`]; the buffer is cleared.
    pub fn feed(&mut self, chunk: &[u8]) -> Result<Option<Vec<u8>>, MinerError> {
        self.pending.extend_from_slice(chunk);
        let mut latest = None;

        if let Some(last_newline) = self.pending.iter().rposition(|&b| b == b'\n') {
            let tail = self.pending.split_off(last_newline + 1);
            let complete = std::mem::replace(&mut self.pending, tail);
            latest = complete
                .split(|&b| b == b'\n')
                .map(|line| line.trim_ascii())
                .filter(|line| !line.is_empty())
                .last()
                .map(<[u8]>::to_vec);
        }

        let tail = self.pending.trim_ascii();
        if !tail.is_empty() && serde_json::from_slice::<serde::de::IgnoredAny>(tail).is_ok() {
            latest = Some(tail.to_vec());
            self.pending.clear();
        } else if self.pending.len() > MAX_PENDING {
            let size = self.pending.len();
            self.pending.clear();
            return Err(MinerError::DecodeError(format!(
                "Unterminated message exceeds {} bytes ({})",
                MAX_PENDING, size
            )));
        }

        Ok(latest)
    }

    /// Bytes buffered from an incomplete message
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}
