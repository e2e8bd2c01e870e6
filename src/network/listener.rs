// src/network/listener.rs
//! Both directions of one worker pair's connection
//!
//! The [`Listener`] owns the read half: it reassembles inbound messages,
//! decodes the freshest template and publishes it to the Miner's handoff.
//! [`submit_loop`] owns the write half and forwards solved blocks.

use crate::miner::handoff::Handoff;
use crate::network::framing::Framer;
use crate::types::{Block, DecodePolicy};
use crate::utils::error::MinerError;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc::UnboundedReceiver;

/// Size of a single socket read
const READ_BUFFER: usize = 4096;

/// Template receiver for one worker pair
pub struct Listener<R> {
    id: usize,
    reader: R,
    handoff: Arc<Handoff<Block>>,
    framer: Framer,
    on_decode_error: DecodePolicy,
    idle_timeout: Option<Duration>,
}

impl<R: AsyncRead + Unpin> Listener<R> {
    /// Creates a Listener over the read half of a connection
    ///
    /// # Arguments
    /// * `id` - Worker index, used in logs
    /// * `reader` - Inbound byte stream from the node
    /// * `handoff` - Slot shared with the paired Miner
    pub fn new(id: usize, reader: R, handoff: Arc<Handoff<Block>>) -> Self {
        Listener {
            id,
            reader,
            handoff,
            framer: Framer::new(),
            on_decode_error: DecodePolicy::default(),
            idle_timeout: None,
        }
    }

    /// Sets how malformed messages are handled
    pub fn with_decode_policy(mut self, policy: DecodePolicy) -> Self {
        self.on_decode_error = policy;
        self
    }

    /// Fails the connection if nothing arrives for `timeout`
    pub fn with_idle_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Reads and dispatches templates until the connection fails
    ///
    /// Never returns `Ok`: a closed stream is reported as a
    /// `ConnectionError` like any other transport failure.
    ///
    /// # Errors
    /// - `MinerError::ConnectionError` on read failure, EOF or idle timeout
    /// - `MinerError::DecodeError` for a malformed message under
    ///   [`DecodePolicy::Fatal`]
    pub async fn receive_loop(mut self) -> Result<(), MinerError> {
        let mut buf = vec![0u8; READ_BUFFER];

        loop {
            let n = self.read(&mut buf).await?;
            if n == 0 {
                return Err(MinerError::ConnectionError(format!(
                    "Worker {}: node closed the connection",
                    self.id
                )));
            }

            match self.framer.feed(&buf[..n]) {
                Ok(Some(message)) => self.dispatch(&message)?,
                Ok(None) => {}
                Err(e) => self.reject(e)?,
            }
        }
    }

    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, MinerError> {
        let read = self.reader.read(buf);
        let result = match self.idle_timeout {
            Some(limit) => tokio::time::timeout(limit, read).await.map_err(|_| {
                MinerError::ConnectionError(format!(
                    "Worker {}: no data from node for {:?}",
                    self.id, limit
                ))
            })?,
            None => read.await,
        };

        result.map_err(|e| MinerError::ConnectionError(format!("Worker {}: read failed: {}", self.id, e)))
    }

    fn dispatch(&mut self, message: &[u8]) -> Result<(), MinerError> {
        match Block::decode(message) {
            Ok(block) => {
                log::info!("Worker {}: received template with nonce {}", self.id, block.nonce);
                if self.handoff.publish(block) {
                    log::debug!("Worker {}: replaced an undelivered template", self.id);
                }
                Ok(())
            }
            Err(e) => self.reject(e),
        }
    }

    fn reject(&self, error: MinerError) -> Result<(), MinerError> {
        match self.on_decode_error {
            DecodePolicy::Skip => {
                log::warn!("Worker {}: skipping malformed message: {}", self.id, error);
                Ok(())
            }
            DecodePolicy::Fatal => Err(error),
        }
    }
}

/// Writes solved blocks to the node as they arrive
///
/// Returns `Ok` once the Miner drops its sender.
///
/// # Errors
/// Returns `MinerError::ConnectionError` if a write fails; nothing is retried.
pub async fn submit_loop<W: AsyncWrite + Unpin>(
    mut writer: W,
    mut submissions: UnboundedReceiver<Vec<u8>>,
) -> Result<(), MinerError> {
    while let Some(frame) = submissions.recv().await {
        writer
            .write_all(&frame)
            .await
            .map_err(|e| MinerError::ConnectionError(format!("Submission failed: {}", e)))?;
        writer
            .flush()
            .await
            .map_err(|e| MinerError::ConnectionError(format!("Submission failed: {}", e)))?;
    }
    Ok(())
}
