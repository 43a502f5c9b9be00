//! Order-preserving byte link between the game and the terminal.

use std::collections::VecDeque;

use crate::TerminalError;

/// Reliable byte transport consumed by the encoder and the input loop.
///
/// Implementations own their buffers exclusively; callers only enqueue
/// outgoing bytes and drain incoming ones.
pub trait ByteChannel {
    /// Queues `bytes` for transmission in order.
    fn send(&mut self, bytes: &[u8]) -> Result<(), TerminalError>;

    /// Moves received bytes into `buffer` and returns how many were copied.
    /// Never blocks; returns zero when nothing is pending.
    fn receive(&mut self, buffer: &mut [u8]) -> Result<usize, TerminalError>;

    /// Pushes queued output to the peer.
    fn flush(&mut self) -> Result<(), TerminalError> {
        Ok(())
    }
}

/// In-memory loopback channel used by tests and headless sessions.
#[derive(Clone, Debug, Default)]
pub struct MemoryChannel {
    sent: Vec<u8>,
    inbound: VecDeque<u8>,
}

impl MemoryChannel {
    /// Creates an empty channel.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `bytes` available to [`ByteChannel::receive`].
    pub fn inject(&mut self, bytes: &[u8]) {
        self.inbound.extend(bytes);
    }

    /// Returns and forgets everything sent so far.
    pub fn take_sent(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.sent)
    }
}

impl ByteChannel for MemoryChannel {
    fn send(&mut self, bytes: &[u8]) -> Result<(), TerminalError> {
        self.sent.extend_from_slice(bytes);
        Ok(())
    }

    fn receive(&mut self, buffer: &mut [u8]) -> Result<usize, TerminalError> {
        let count = buffer.len().min(self.inbound.len());
        for (slot, byte) in buffer.iter_mut().zip(self.inbound.drain(..count)) {
            *slot = byte;
        }
        Ok(count)
    }
}
